//! Domain types shared by the storage layer and the front ends.

pub mod image;
pub mod models;

pub use image::ImagePreview;
pub use models::{Account, ItemStatus, ItemUpdate, ItemWithPoster, NewItem, ParseError, Role};
