use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::db::entities::tag;

/// Retrieves all tags of an image in insertion order.
pub async fn find_by_image_id<C: ConnectionTrait>(
    db: &C,
    image_id: i32,
) -> Result<Vec<tag::Model>, DbErr> {
    tag::Entity::find()
        .filter(tag::Column::ImageId.eq(image_id))
        .order_by_asc(tag::Column::Id)
        .all(db)
        .await
}

/// Deletes every tag of an image. Returns the number of removed rows, 0 when the image had none.
pub async fn delete_all_by_image_id<C: ConnectionTrait>(db: &C, image_id: i32) -> Result<u64, DbErr> {
    let result = tag::Entity::delete_many()
        .filter(tag::Column::ImageId.eq(image_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Ids of the images carrying `tag_name` (exact match), ascending and without duplicates.
pub async fn find_image_ids_by_tag_name<C: ConnectionTrait>(
    db: &C,
    tag_name: &str,
) -> Result<Vec<i32>, DbErr> {
    tag::Entity::find()
        .select_only()
        .column(tag::Column::ImageId)
        .filter(tag::Column::Tag.eq(tag_name))
        .distinct()
        .order_by_asc(tag::Column::ImageId)
        .into_tuple::<i32>()
        .all(db)
        .await
}

/// Distinct tag labels across all images, sorted.
pub async fn find_all_unique_tags<C: ConnectionTrait>(db: &C) -> Result<Vec<String>, DbErr> {
    tag::Entity::find()
        .select_only()
        .column(tag::Column::Tag)
        .distinct()
        .order_by_asc(tag::Column::Tag)
        .into_tuple::<String>()
        .all(db)
        .await
}

/// Inserts one tag row per label for the given image, keeping the label order.
pub async fn save_tags<C: ConnectionTrait>(
    db: &C,
    image_id: i32,
    labels: &[String],
) -> Result<Vec<tag::Model>, DbErr> {
    let mut saved = Vec::with_capacity(labels.len());
    for label in labels {
        let model = tag::ActiveModel {
            tag: Set(label.clone()),
            image_id: Set(image_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
        saved.push(model);
    }
    Ok(saved)
}
