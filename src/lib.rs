//! Read-only movie catalog service.
//!
//! A backup file of JSON lines is loaded once at startup: images are decoded
//! to disk and movie metadata is kept in memory. The HTTP API then serves
//! lookups, title search and the stored images.

pub mod catalog;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod handlers;
pub mod images;
pub mod loader;
pub mod models;
pub mod router;
pub mod system_info;

pub use catalog::Catalog;
pub use config::Config;
pub use models::{AppState, MovieRecord};
pub use router::build_router;
