pub mod classify_routes;
pub mod image_routes;
pub mod tag_routes;

use crate::web::error::AppError;

/// Trims the raw input and checks that it is an absolute http(s) URL.
pub(crate) fn parse_image_url(raw: &str) -> Result<&str, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput("Image URL must not be empty.".to_string()));
    }
    let url = reqwest::Url::parse(trimmed)
        .map_err(|e| AppError::InvalidInput(format!("Invalid image URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::InvalidInput(format!(
            "Unsupported URL scheme: {}",
            url.scheme()
        )));
    }
    Ok(trimmed)
}
