use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An image together with the labels attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageWithTags {
    pub id: i32,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

/// One page of images. `number` is the zero-based page index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePage {
    pub content: Vec<ImageWithTags>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u64,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}
