use async_trait::async_trait;
use thiserror::Error;

pub mod imagga;

pub use imagga::{ClassifiedTag, ImaggaGateway, parse_tags};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Classification provider did not answer in time")]
    Timeout,
    #[error("Classification provider returned {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(reqwest::Error),
    #[error("Invalid classification payload: {0}")]
    InvalidPayload(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Network(err)
        }
    }
}

/// Issues classification requests to an external image-tagging provider.
#[async_trait]
pub trait ClassificationGateway: Send + Sync {
    /// Classifies the image at `image_url`.
    ///
    /// Returns the provider's response body unmodified. Nothing is persisted.
    async fn classify_image(&self, image_url: &str) -> Result<String, GatewayError>;
}
