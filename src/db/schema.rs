use sea_orm::{ConnectionTrait, DbErr, Schema};
use tracing::info;

use crate::db::entities::{image, tag};

/// Creates the `images` and `tags` tables, and the tag index, when they do not exist yet.
pub async fn ensure_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut images_table = schema.create_table_from_entity(image::Entity);
    images_table.if_not_exists();
    db.execute(backend.build(&images_table)).await?;

    let mut tags_table = schema.create_table_from_entity(tag::Entity);
    tags_table.if_not_exists();
    db.execute(backend.build(&tags_table)).await?;

    for mut index in schema.create_index_from_entity(tag::Entity) {
        index.if_not_exists();
        db.execute(backend.build(&index)).await?;
    }

    info!(backend = ?backend, "Database schema is in place.");
    Ok(())
}
