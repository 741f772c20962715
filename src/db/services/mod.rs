//! Data access for images and their tags.
//!
//! Every function takes any SeaORM `ConnectionTrait`, so callers can pass either the
//! pooled `DatabaseConnection` or an open transaction.

pub mod image_service;
pub mod tag_service;

pub use image_service::*;
pub use tag_service::*;
