use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::PathBuf;

/// Errors raised while preparing the image directory and loading the backup.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open backup file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read backup file: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to prepare image directory {path:?}: {source}")]
    ImageDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid record: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid image payload for {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("failed to write image {path:?}: {source}")]
    WriteImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced to HTTP clients as a status and a fixed plain message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Film not found")]
    FilmNotFound,

    #[error("Image not found")]
    ImageNotFound,

    #[error("Server error")]
    Internal,

    /// Search failures, including a missing `title`, which clients receive as 500.
    #[error("Server error")]
    Search,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::FilmNotFound | ApiError::ImageNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal | ApiError::Search => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `None` keeps the router's default content type.
    fn content_type(&self) -> Option<&'static str> {
        match self {
            ApiError::FilmNotFound | ApiError::Internal => None,
            ApiError::ImageNotFound | ApiError::Search => Some("text/plain"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status_code(), Body::from(self.to_string())).into_response();
        if let Some(content_type) = self.content_type() {
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        response
    }
}
