use axum::{Router, extract::State, routing::post};
use std::sync::Arc;
use tracing::{info, warn};

use super::parse_image_url;
use crate::web::{AppError, AppState};

/// Checks that the trimmed body is an absolute http(s) URL (400 otherwise), then passes it to
/// the classifier and answers with the provider payload unchanged. Nothing is stored.
async fn classify_handler(
    State(app_state): State<Arc<AppState>>,
    body: String,
) -> Result<String, AppError> {
    let image_url = parse_image_url(&body)?;
    info!(image_url, "Classifying image.");

    app_state
        .classifier
        .classify_image(image_url)
        .await
        .map_err(|e| {
            warn!(image_url, error = %e, "Classification failed.");
            AppError::from(e)
        })
}

pub fn create_classify_router() -> Router<Arc<AppState>> {
    Router::new().route("/classify", post(classify_handler))
}
