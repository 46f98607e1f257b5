use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::catalog::Catalog;

/// Movie metadata kept in memory. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub genre: String,
    /// Passed through as found in the backup (number, string, ...).
    pub release_year: serde_json::Value,
}

/// One line of the backup file. Fields other than these are ignored.
#[derive(Deserialize)]
pub struct BackupLine {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub release_year: serde_json::Value,
    #[serde(default)]
    pub img: Option<String>,
}

impl BackupLine {
    pub fn into_parts(self) -> (MovieRecord, Option<String>) {
        let record = MovieRecord {
            id: self.id,
            title: self.title,
            description: self.description,
            genre: self.genre,
            release_year: self.release_year,
        };
        (record, self.img)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub config: crate::config::Config,
}

/// Search query values. A repeated key keeps its first value.
#[derive(Debug, Default, PartialEq)]
pub struct SearchParams {
    pub title: Option<String>,
    pub page: Option<String>,
}

impl SearchParams {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "title" if params.title.is_none() => params.title = Some(value),
                "page" if params.page.is_none() => params.page = Some(value),
                _ => {}
            }
        }
        params
    }
}

#[derive(Serialize)]
pub struct SearchResponse<'a> {
    pub search_result: Vec<&'a MovieRecord>,
}
