use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use std::sync::Arc;
use tracing::info;

use super::parse_image_url;
use crate::db::models::{ImagePage, ImageWithTags};
use crate::db::services::{self, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::services::classification_service;
use crate::web::models::{ListImagesQuery, RegisterImageRequest, TagSearchQuery};
use crate::web::{AppError, AppState};

async fn list_images_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ListImagesQuery>,
) -> Result<Json<ImagePage>, AppError> {
    let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&size) {
        return Err(AppError::InvalidInput(format!(
            "Page size must be between 1 and {MAX_PAGE_SIZE}."
        )));
    }
    let page_index = query.page.unwrap_or(0);
    // The row offset has to fit a signed 64-bit SQL OFFSET.
    if page_index
        .checked_mul(size)
        .is_none_or(|offset| offset > i64::MAX as u64)
    {
        return Err(AppError::InvalidInput("Page index is out of range.".to_string()));
    }
    let page = services::list_images(
        &app_state.db_pool,
        page_index,
        size,
        query.sort.unwrap_or_default(),
    )
    .await?;
    Ok(Json(page))
}

async fn list_all_images_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<ImageWithTags>>, AppError> {
    Ok(Json(services::list_all_images(&app_state.db_pool).await?))
}

async fn search_images_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<TagSearchQuery>,
) -> Result<Json<Vec<ImageWithTags>>, AppError> {
    let images = services::find_images_by_tag(&app_state.db_pool, &query.tag).await?;
    Ok(Json(images))
}

async fn get_image_handler(
    State(app_state): State<Arc<AppState>>,
    Path(image_id): Path<i32>,
) -> Result<Json<ImageWithTags>, AppError> {
    services::find_image(&app_state.db_pool, image_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Image {image_id} not found")))
}

async fn register_image_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<RegisterImageRequest>,
) -> Result<(StatusCode, Json<ImageWithTags>), AppError> {
    let image_url = parse_image_url(&payload.url)?;
    let image = classification_service::classify_and_store(
        &app_state.db_pool,
        app_state.classifier.as_ref(),
        image_url,
        app_state.config.min_confidence,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(image)))
}

async fn delete_image_tags_handler(
    State(app_state): State<Arc<AppState>>,
    Path(image_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let removed = services::delete_all_by_image_id(&app_state.db_pool, image_id).await?;
    info!(image_id, removed, "Deleted image tags.");
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_images_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_images_handler).post(register_image_handler))
        .route("/all", get(list_all_images_handler))
        .route("/search", get(search_images_handler))
        .route("/{image_id}", get(get_image_handler))
        .route("/{image_id}/tags", delete(delete_image_tags_handler))
}
