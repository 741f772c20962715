//! SeaORM entities mapping the `images` and `tags` tables.

pub mod image;
pub mod tag;

// Prelude module for easy importing of all entities and their related types
pub mod prelude {
    pub use super::image::Entity as Image;
    pub use super::image::Model as ImageModel;
    pub use super::image::ActiveModel as ImageActiveModel;
    pub use super::image::Column as ImageColumn;

    pub use super::tag::Entity as Tag;
    pub use super::tag::Model as TagModel;
    pub use super::tag::ActiveModel as TagActiveModel;
    pub use super::tag::Column as TagColumn;
}
