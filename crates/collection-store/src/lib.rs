//! Photo collection model and persistence for photosift
//!
//! A collection is a self-contained directory: normalized JPEGs under
//! `images/{id}/` plus a `collection.json` manifest describing every photo.
//! Images are normalized on import (EXIF orientation applied to pixels) so
//! consumers never need to interpret orientation tags themselves.

pub mod collection;
pub mod normalize;
pub mod photo;

pub use collection::Collection;
pub use normalize::normalize_jpeg;
pub use photo::{ImageSlot, Photo, PhotoImages, Rotation};
