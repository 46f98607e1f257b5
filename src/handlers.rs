use crate::{
    error::ApiError,
    images,
    models::{AppState, SearchParams, SearchResponse},
};
use axum::{
    body::Body,
    extract::{Query, Request},
    http::{header::CONTENT_TYPE, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use http_body_util::BodyExt;
use tracing::{debug, error};

pub const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Reply with the request body, byte for byte.
pub async fn echo_handler(request: Request<Body>) -> Result<Response, ApiError> {
    let body = request
        .into_body()
        .collect()
        .await
        .map_err(|e| {
            error!("[POST /echo] Failed to read request body: {}", e);
            ApiError::Internal
        })?
        .to_bytes();

    debug!("[POST /echo] Echoing {} bytes", body.len());
    Ok(([(CONTENT_TYPE, "text/plain")], body).into_response())
}

pub async fn ping_handler() -> StatusCode {
    StatusCode::OK
}

pub async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// `GET /api/v1/movie/<id>`; the id is path segment 4, undecoded.
pub fn movie_handler(state: &AppState, path: &str) -> Result<Response, ApiError> {
    let id = path.split('/').nth(4).unwrap_or_default();

    let film = state.catalog.find_by_id(id).ok_or_else(|| {
        debug!("[GET /api/v1/movie] No film with id {:?}", id);
        ApiError::FilmNotFound
    })?;

    let body = serde_json::to_vec(film).map_err(|e| {
        error!("[GET /api/v1/movie] Error handling movie request: {}", e);
        ApiError::Internal
    })?;

    Ok((StatusCode::OK, [(CONTENT_TYPE, JSON_UTF8)], body).into_response())
}

/// `GET /api/v1/search?title=..&page=..`
pub fn search_handler(state: &AppState, uri: &Uri) -> Result<Response, ApiError> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri).map_err(|e| {
        error!("[GET /api/v1/search] Error handling search request: {}", e);
        ApiError::Search
    })?;
    let params = SearchParams::from_pairs(pairs);

    let title = params.title.filter(|t| !t.is_empty()).ok_or_else(|| {
        error!("[GET /api/v1/search] Error handling search request: title parameter is required");
        ApiError::Search
    })?;
    let page = parse_page(params.page.as_deref());

    let search_result = state.catalog.search(&title, page);
    debug!(
        "[GET /api/v1/search] {:?} page {} -> {} results",
        title,
        page,
        search_result.len()
    );

    Ok(Json(SearchResponse { search_result }).into_response())
}

/// `GET /static/images/<filename>`
pub async fn image_handler(state: &AppState, path: &str) -> Result<Response, ApiError> {
    let filename = images::requested_filename(path);
    let image = images::read_image(
        &state.config.images_dir,
        filename,
        state.config.strict_image_paths,
    )
    .await?;

    Ok(([(CONTENT_TYPE, "image/jpeg")], image).into_response())
}

/// Lenient integer parse of the `page` parameter.
///
/// Reads optional leading whitespace, an optional sign and the leading
/// digits; anything unparseable, and zero, means page 1.
pub fn parse_page(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return 1;
    };
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return 1;
    }

    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    match if negative { -magnitude } else { magnitude } {
        0 => 1,
        page => page,
    }
}
