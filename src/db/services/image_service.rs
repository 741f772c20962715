use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, sea_query::OnConflict,
};
use std::collections::HashMap;

use crate::db::entities::{image, tag};
use crate::db::models::{ImagePage, ImageWithTags, SortDirection};
use crate::db::services::tag_service;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Returns the image stored under `url`, inserting it first if it is unknown.
/// Concurrent calls for the same URL all resolve to the same row.
pub async fn register_image<C: ConnectionTrait>(db: &C, url: &str) -> Result<image::Model, DbErr> {
    if let Some(existing) = find_image_by_url(db, url).await? {
        return Ok(existing);
    }

    let new_image = image::ActiveModel {
        url: Set(url.to_owned()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    // Another request may have stored the URL since the lookup above.
    image::Entity::insert(new_image)
        .on_conflict(
            OnConflict::column(image::Column::Url)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    find_image_by_url(db, url)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("image with url {url}")))
}

async fn find_image_by_url<C: ConnectionTrait>(
    db: &C,
    url: &str,
) -> Result<Option<image::Model>, DbErr> {
    image::Entity::find()
        .filter(image::Column::Url.eq(url))
        .one(db)
        .await
}

pub async fn find_image<C: ConnectionTrait>(
    db: &C,
    image_id: i32,
) -> Result<Option<ImageWithTags>, DbErr> {
    let Some(model) = image::Entity::find_by_id(image_id).one(db).await? else {
        return Ok(None);
    };
    Ok(attach_tags(db, vec![model]).await?.pop())
}

/// One page of images ordered by creation time, ties broken by id.
/// `page` is zero-based; `size` must be at least 1. Pages past the end come back empty.
pub async fn list_images<C: ConnectionTrait>(
    db: &C,
    page: u64,
    size: u64,
    direction: SortDirection,
) -> Result<ImagePage, DbErr> {
    let order = match direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    };
    let paginator = image::Entity::find()
        .order_by(image::Column::CreatedAt, order.clone())
        .order_by(image::Column::Id, order)
        .paginate(db, size);

    let totals = paginator.num_items_and_pages().await?;
    let models = match page.checked_mul(size) {
        Some(offset) if offset < totals.number_of_items => paginator.fetch_page(page).await?,
        _ => Vec::new(),
    };

    Ok(ImagePage {
        content: attach_tags(db, models).await?,
        total_elements: totals.number_of_items,
        total_pages: totals.number_of_pages,
        number: page,
        size,
    })
}

pub async fn list_all_images<C: ConnectionTrait>(db: &C) -> Result<Vec<ImageWithTags>, DbErr> {
    let models = image::Entity::find()
        .order_by_asc(image::Column::Id)
        .all(db)
        .await?;
    attach_tags(db, models).await
}

/// Images carrying at least one tag equal to `tag_name`.
pub async fn find_images_by_tag<C: ConnectionTrait>(
    db: &C,
    tag_name: &str,
) -> Result<Vec<ImageWithTags>, DbErr> {
    let image_ids = tag_service::find_image_ids_by_tag_name(db, tag_name).await?;
    if image_ids.is_empty() {
        return Ok(Vec::new());
    }

    let models = image::Entity::find()
        .filter(image::Column::Id.is_in(image_ids))
        .order_by_asc(image::Column::Id)
        .all(db)
        .await?;
    attach_tags(db, models).await
}

/// Loads the labels of all given images with a single query.
async fn attach_tags<C: ConnectionTrait>(
    db: &C,
    images: Vec<image::Model>,
) -> Result<Vec<ImageWithTags>, DbErr> {
    if images.is_empty() {
        return Ok(Vec::new());
    }

    let image_ids: Vec<i32> = images.iter().map(|i| i.id).collect();
    let rows: Vec<(i32, String)> = tag::Entity::find()
        .select_only()
        .column(tag::Column::ImageId)
        .column(tag::Column::Tag)
        .filter(tag::Column::ImageId.is_in(image_ids))
        .order_by_asc(tag::Column::Id)
        .into_tuple()
        .all(db)
        .await?;

    let mut labels_by_image: HashMap<i32, Vec<String>> = HashMap::new();
    for (image_id, label) in rows {
        labels_by_image.entry(image_id).or_default().push(label);
    }

    Ok(images
        .into_iter()
        .map(|model| ImageWithTags {
            tags: labels_by_image.remove(&model.id).unwrap_or_default(),
            id: model.id,
            url: model.url,
            created_at: model.created_at,
        })
        .collect())
}
