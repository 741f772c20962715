use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

use super::{ClassificationGateway, GatewayError};

/// Gateway to the Imagga v2 tagging endpoint.
pub struct ImaggaGateway {
    client: Client,
    api_url: String,
    api_key: String,
    api_secret: String,
}

impl ImaggaGateway {
    pub fn new(
        api_url: &str,
        api_key: &str,
        api_secret: &str,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        })
    }
}

#[async_trait]
impl ClassificationGateway for ImaggaGateway {
    async fn classify_image(&self, image_url: &str) -> Result<String, GatewayError> {
        let endpoint = format!("{}/tags", self.api_url);
        debug!(image_url, "Requesting tags from Imagga.");

        let response = self
            .client
            .get(&endpoint)
            .query(&[("image_url", image_url)])
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(image_url, status = status.as_u16(), "Imagga rejected the request.");
            return Err(GatewayError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

/// A label reported by the provider and its confidence (0-100).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedTag {
    pub label: String,
    pub confidence: f32,
}

#[derive(Deserialize)]
struct TagsResponse {
    result: Option<TagsResult>,
    status: Option<ResponseStatus>,
}

#[derive(Deserialize)]
struct TagsResult {
    #[serde(default)]
    tags: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    confidence: f32,
    tag: LocalizedTag,
}

#[derive(Deserialize)]
struct LocalizedTag {
    en: Option<String>,
}

#[derive(Deserialize)]
struct ResponseStatus {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Extracts the English labels scoring at least `min_confidence` from an Imagga `/tags` payload.
/// Keeps provider order and drops repeated labels.
pub fn parse_tags(payload: &str, min_confidence: f32) -> Result<Vec<ClassifiedTag>, GatewayError> {
    let response: TagsResponse =
        serde_json::from_str(payload).map_err(|e| GatewayError::InvalidPayload(e.to_string()))?;

    if let Some(status) = &response.status {
        if status.kind == "error" {
            return Err(GatewayError::InvalidPayload(status.text.clone()));
        }
    }

    let entries = response
        .result
        .ok_or_else(|| GatewayError::InvalidPayload("missing `result` field".to_string()))?
        .tags;

    let mut seen = HashSet::new();
    Ok(entries
        .into_iter()
        .filter(|entry| entry.confidence >= min_confidence)
        .filter_map(|entry| {
            let label = entry.tag.en?.trim().to_string();
            if label.is_empty() || !seen.insert(label.clone()) {
                return None;
            }
            Some(ClassifiedTag {
                label,
                confidence: entry.confidence,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        extract::Query,
        http::{HeaderMap, StatusCode, header},
        routing::get,
    };
    use std::collections::HashMap;

    const SAMPLE: &str = r#"{
        "result": {
            "tags": [
                {"confidence": 92.5, "tag": {"en": "cat"}},
                {"confidence": 61.0, "tag": {"en": "pet"}},
                {"confidence": 45.2, "tag": {"en": "cat"}},
                {"confidence": 12.3, "tag": {"en": "furniture"}}
            ]
        },
        "status": {"text": "", "type": "success"}
    }"#;

    /// Starts a fake Imagga API on a random local port and returns its base URL.
    async fn spawn_provider(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v2")
    }

    #[test]
    fn test_parse_tags_filters_and_dedups() {
        let tags = parse_tags(SAMPLE, 30.0).unwrap();
        let labels: Vec<&str> = tags.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["cat", "pet"]);
        assert_eq!(tags[0].confidence, 92.5);

        assert_eq!(parse_tags(SAMPLE, 0.0).unwrap().len(), 3);
        assert!(parse_tags(SAMPLE, 99.0).unwrap().is_empty());
    }

    #[test]
    fn test_parse_tags_rejects_error_status() {
        let payload = r#"{"status": {"text": "Invalid image URL", "type": "error"}}"#;
        match parse_tags(payload, 0.0) {
            Err(GatewayError::InvalidPayload(msg)) => assert_eq!(msg, "Invalid image URL"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            parse_tags("not json", 0.0),
            Err(GatewayError::InvalidPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_classify_returns_body_verbatim() {
        let router = Router::new().route(
            "/v2/tags",
            get(
                |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
                    let authorized = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .is_some_and(|v| v.starts_with("Basic "));
                    if !authorized || params.get("image_url").map(String::as_str) != Some("https://img.example/cat.jpg") {
                        return (StatusCode::BAD_REQUEST, "bad request".to_string());
                    }
                    (StatusCode::OK, SAMPLE.to_string())
                },
            ),
        );
        let base_url = spawn_provider(router).await;
        let gateway = ImaggaGateway::new(&base_url, "key", "secret", Duration::from_secs(5)).unwrap();

        let body = gateway.classify_image("https://img.example/cat.jpg").await.unwrap();
        assert_eq!(body, SAMPLE);
    }

    #[tokio::test]
    async fn test_classify_maps_provider_error() {
        let router = Router::new().route(
            "/v2/tags",
            get(|| async { (StatusCode::UNAUTHORIZED, "invalid credentials") }),
        );
        let base_url = spawn_provider(router).await;
        let gateway = ImaggaGateway::new(&base_url, "key", "wrong", Duration::from_secs(5)).unwrap();

        match gateway.classify_image("https://img.example/cat.jpg").await {
            Err(GatewayError::Provider { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid credentials");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_classify_times_out() {
        let router = Router::new().route(
            "/v2/tags",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        );
        let base_url = spawn_provider(router).await;
        let gateway =
            ImaggaGateway::new(&base_url, "key", "secret", Duration::from_millis(100)).unwrap();

        let result = gateway.classify_image("https://img.example/cat.jpg").await;
        assert!(matches!(result, Err(GatewayError::Timeout)));
    }
}
