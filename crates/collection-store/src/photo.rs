//! In-memory photo model
//!
//! A photo carries the image bytes for its front scan plus optional back,
//! enhanced front and thumbnail variants. Bytes are expected to be
//! normalized (EXIF orientation already applied to pixels) before they enter
//! a `Photo`; the `Rotation` fields record user-requested display rotation
//! on top of that.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Display rotation in degrees clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(format!("Invalid rotation: {} (expected 0/90/180/270)", other)),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> u16 {
        match rotation {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// The image variants a photo can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Front,
    Back,
    EnhancedFront,
}

/// Image bytes and per-variant display rotation for one photo.
#[derive(Debug, Clone, Default)]
pub struct PhotoImages {
    pub front: Vec<u8>,
    pub back: Option<Vec<u8>>,
    pub enhanced_front: Option<Vec<u8>>,
    pub thumbnail: Option<Vec<u8>>,
    pub front_rotation: Rotation,
    pub back_rotation: Rotation,
    pub enhanced_front_rotation: Rotation,
}

/// One photo in a collection.
#[derive(Debug, Clone)]
pub struct Photo {
    id: String,
    images: PhotoImages,
    source_filenames: Vec<String>,
}

impl Photo {
    /// Bounding box for generated thumbnails.
    pub const THUMBNAIL_SIZE: u32 = 200;

    pub fn new(id: String, images: PhotoImages, source_filenames: Vec<String>) -> Self {
        Self {
            id,
            images,
            source_filenames,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn images(&self) -> &PhotoImages {
        &self.images
    }

    pub fn source_filenames(&self) -> &[String] {
        &self.source_filenames
    }

    /// Generate the thumbnail from the enhanced front when present, falling
    /// back to the raw front scan.
    pub fn add_thumbnail(&mut self) -> Result<()> {
        let source = self
            .images
            .enhanced_front
            .as_deref()
            .unwrap_or(&self.images.front);

        let img = image::load_from_memory(source)
            .with_context(|| format!("Failed to decode image for thumbnail of photo {}", self.id))?;
        let thumb = img.thumbnail(Self::THUMBNAIL_SIZE, Self::THUMBNAIL_SIZE);

        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new(Cursor::new(&mut buffer));
        thumb
            .write_with_encoder(encoder)
            .context("Failed to encode thumbnail JPEG")?;

        self.images.thumbnail = Some(buffer);
        Ok(())
    }

    /// Set the display rotation of one image variant.
    pub fn set_rotation(&mut self, slot: ImageSlot, rotation: Rotation) {
        match slot {
            ImageSlot::Front => self.images.front_rotation = rotation,
            ImageSlot::Back => self.images.back_rotation = rotation,
            ImageSlot::EnhancedFront => self.images.enhanced_front_rotation = rotation,
        }
    }
}
