//! HTTP handlers for the community domain

pub mod friends;
pub mod groups;
pub mod profile;

use serde::{Deserialize, Serialize};

/// `{"items": [...]}` envelope for unpaged lists
#[derive(Debug, Serialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for Items<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

/// `{"status": "..."}` acknowledgement
#[derive(Debug, Serialize)]
pub struct StatusResponse<S: Serialize> {
    pub status: S,
}

/// `?q=...&limit=...` for directory searches
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}
