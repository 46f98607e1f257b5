use crate::{
    handlers::{
        echo_handler, image_handler, movie_handler, not_found_handler, ping_handler,
        search_handler, JSON_UTF8,
    },
    models::AppState,
};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    middleware::{from_fn, Next},
    response::{IntoResponse, Response},
    routing::{any, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub const MOVIE_PREFIX: &str = "/api/v1/movie/";
pub const SEARCH_PREFIX: &str = "/api/v1/search";
pub const IMAGES_PREFIX: &str = "/static/images/";

/// Build the service router.
///
/// Dispatch order: `POST /echo`, `/ping` (any method), then the `GET`
/// prefixes for movie lookup, search and images. Everything else is a
/// bodyless 404.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = state.config.enable_cors;

    let router = Router::new()
        .route("/echo", post(echo_handler).fallback(not_found_handler))
        .route("/ping", any(ping_handler))
        .fallback(dispatch_prefixed)
        .layer(DefaultBodyLimit::disable())
        .layer(from_fn(default_content_type))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Prefix-matched `GET` routes.
async fn dispatch_prefixed(State(state): State<Arc<AppState>>, request: Request) -> Response {
    if request.method() != Method::GET {
        return not_found_handler().await.into_response();
    }

    let uri = request.uri();
    let path = uri.path();

    if path.starts_with(MOVIE_PREFIX) {
        movie_handler(&state, path).into_response()
    } else if path.starts_with(SEARCH_PREFIX) {
        search_handler(&state, uri).into_response()
    } else if path.starts_with(IMAGES_PREFIX) {
        image_handler(&state, path).await.into_response()
    } else {
        not_found_handler().await.into_response()
    }
}

/// Responses that did not pick a content type are labelled as UTF-8 JSON.
async fn default_content_type(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .entry(CONTENT_TYPE)
        .or_insert(HeaderValue::from_static(JSON_UTF8));
    response
}
