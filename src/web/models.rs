use serde::Deserialize;

use crate::db::models::SortDirection;

#[derive(Deserialize, Debug)]
pub struct RegisterImageRequest {
    pub url: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct ListImagesQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub sort: Option<SortDirection>,
}

#[derive(Deserialize, Debug)]
pub struct TagSearchQuery {
    pub tag: String,
}
