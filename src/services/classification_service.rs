use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;

use crate::classification::{ClassificationGateway, parse_tags};
use crate::db::models::ImageWithTags;
use crate::db::services::{image_service, tag_service};
use crate::web::error::AppError;

/// Registers the image, classifies it and replaces its stored tags with the provider's labels.
///
/// The tag replacement runs in one transaction. When the provider call fails the image row
/// stays registered and its previous tags are kept.
pub async fn classify_and_store(
    db: &DatabaseConnection,
    gateway: &dyn ClassificationGateway,
    image_url: &str,
    min_confidence: f32,
) -> Result<ImageWithTags, AppError> {
    let image = image_service::register_image(db, image_url).await?;

    let payload = gateway.classify_image(image_url).await?;
    let labels: Vec<String> = parse_tags(&payload, min_confidence)?
        .into_iter()
        .map(|t| t.label)
        .collect();

    let txn = db.begin().await?;
    let replaced = tag_service::delete_all_by_image_id(&txn, image.id).await?;
    tag_service::save_tags(&txn, image.id, &labels).await?;
    txn.commit().await?;

    info!(
        image_id = image.id,
        tag_count = labels.len(),
        replaced,
        "Stored classification tags."
    );

    Ok(ImageWithTags {
        id: image.id,
        url: image.url,
        created_at: image.created_at,
        tags: labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::GatewayError;
    use crate::db::test_support::memory_db;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays canned payloads, one per call.
    struct ScriptedGateway {
        responses: Mutex<Vec<Result<String, GatewayError>>>,
    }

    impl ScriptedGateway {
        fn new(mut responses: Vec<Result<String, GatewayError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl ClassificationGateway for ScriptedGateway {
        async fn classify_image(&self, _image_url: &str) -> Result<String, GatewayError> {
            self.responses.lock().unwrap().pop().expect("no scripted response left")
        }
    }

    fn payload(tags: &[(&str, f32)]) -> String {
        let entries: Vec<serde_json::Value> = tags
            .iter()
            .map(|(label, confidence)| serde_json::json!({"confidence": confidence, "tag": {"en": label}}))
            .collect();
        serde_json::json!({"result": {"tags": entries}, "status": {"text": "", "type": "success"}})
            .to_string()
    }

    #[tokio::test]
    async fn test_classify_and_store_persists_confident_tags() {
        let db = memory_db().await;
        let gateway = ScriptedGateway::new(vec![Ok(payload(&[("cat", 90.0), ("pet", 50.0), ("sofa", 10.0)]))]);

        let stored = classify_and_store(&db, &gateway, "https://img.example/cat.jpg", 30.0)
            .await
            .unwrap();
        assert_eq!(stored.tags, vec!["cat", "pet"]);

        let tags: Vec<String> = tag_service::find_by_image_id(&db, stored.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.tag)
            .collect();
        assert_eq!(tags, vec!["cat", "pet"]);
    }

    #[tokio::test]
    async fn test_reclassification_replaces_tags() {
        let db = memory_db().await;
        let gateway = ScriptedGateway::new(vec![
            Ok(payload(&[("cat", 90.0)])),
            Ok(payload(&[("dog", 80.0)])),
        ]);
        let url = "https://img.example/pet.jpg";

        let first = classify_and_store(&db, &gateway, url, 30.0).await.unwrap();
        let second = classify_and_store(&db, &gateway, url, 30.0).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(tag_service::find_all_unique_tags(&db).await.unwrap(), vec!["dog"]);
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_previous_tags() {
        let db = memory_db().await;
        let gateway = ScriptedGateway::new(vec![
            Ok(payload(&[("cat", 90.0)])),
            Err(GatewayError::Timeout),
        ]);
        let url = "https://img.example/cat.jpg";

        let stored = classify_and_store(&db, &gateway, url, 30.0).await.unwrap();
        let err = classify_and_store(&db, &gateway, url, 30.0).await.unwrap_err();

        assert!(matches!(err, AppError::UpstreamTimeout(_)));
        let tags = tag_service::find_by_image_id(&db, stored.id).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].tag, "cat");
    }
}
