#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, Response};
use axum::Router;
use base64::Engine;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use movie_catalog::{build_router, loader, AppState, Config};

/// Bytes of a tiny JPEG-looking payload; only identity matters.
pub const IMAGE_BYTES: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00test-image\xff\xd9";

pub fn backup_line(id: &str, title: &str) -> String {
    serde_json::json!({
        "id": id,
        "title": title,
        "description": format!("About {title}"),
        "genre": "Sci-Fi",
        "release_year": 1999,
        "rating": 8.7,
        "img": base64::engine::general_purpose::STANDARD.encode(IMAGE_BYTES),
    })
    .to_string()
}

pub fn test_config(root: &Path) -> Config {
    Config {
        backup_file_path: root.join("backup.txt"),
        images_dir: root.join("images"),
        load_concurrency: 2,
        ..Config::default()
    }
}

/// Write `lines` as the backup file, run the loader and build the router.
pub async fn build_test_app(lines: &[String]) -> (Router, TempDir) {
    build_test_app_with(lines, |_| {}).await
}

pub async fn build_test_app_with(
    lines: &[String],
    customize: impl FnOnce(&mut Config),
) -> (Router, TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = test_config(tmp.path());
    customize(&mut config);

    std::fs::write(&config.backup_file_path, lines.join("\n")).unwrap();
    std::fs::create_dir_all(&config.images_dir).unwrap();

    let (catalog, _report) = loader::load_catalog(
        &config.backup_file_path,
        &config.images_dir,
        config.load_concurrency,
    )
    .await
    .unwrap();

    let state = Arc::new(AppState {
        catalog: Arc::new(catalog),
        config,
    });
    (build_router(state), tmp)
}

pub async fn send(app: Router, method: Method, uri: &str, body: Body) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body)
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Body::empty()).await
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn content_type(response: &Response<Body>) -> &str {
    response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
