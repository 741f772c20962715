use axum::{Json, Router, extract::State, routing::get};
use std::sync::Arc;

use crate::db::services;
use crate::web::{AppError, AppState};

async fn get_unique_tags_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, AppError> {
    let tags = services::find_all_unique_tags(&app_state.db_pool).await?;
    Ok(Json(tags))
}

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_unique_tags_handler))
}
