//! Collection building and manifest persistence
//!
//! A collection directory looks like:
//!
//! ```text
//! collection.json
//! images/{photo-id}/front.jpg
//! images/{photo-id}/back.jpg            (optional)
//! images/{photo-id}/enhanced_front.jpg  (optional)
//! images/{photo-id}/thumbnail.jpg       (optional)
//! ```
//!
//! Manifest paths are relative to the collection root so the directory can
//! be moved or synced as a unit.

use crate::normalize::normalize_jpeg;
use crate::photo::{Photo, PhotoImages, Rotation};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use import_pipeline::scan_fast_foto;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

const MANIFEST_FILE: &str = "collection.json";
const IMAGES_DIR: &str = "images";

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    photos: Vec<PhotoEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PhotoEntry {
    id: String,
    images: ImagePaths,
    source_filenames: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ImagePaths {
    front: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    back: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enhanced_front: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thumbnail: Option<String>,
    #[serde(default)]
    front_orientation: Rotation,
    #[serde(default)]
    back_orientation: Rotation,
    #[serde(default)]
    enhanced_front_orientation: Rotation,
}

/// A named set of photos.
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    photos: Vec<Photo>,
}

impl Collection {
    pub fn new(name: String, photos: Vec<Photo>) -> Self {
        Self { name, photos }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Build a collection directly from a FastFoto output tree.
    ///
    /// Every image is normalized (EXIF orientation applied to pixels) and
    /// each photo gets a fresh id and a thumbnail. Groups without a front
    /// scan are skipped with a warning.
    pub fn from_fast_foto_tree(fast_foto_dir: &Path, name: &str) -> Result<Self> {
        let groups = scan_fast_foto(fast_foto_dir)?;
        let mut photos = Vec::new();

        for group in groups {
            let front = match &group.front {
                Some(front) => front,
                None => {
                    log::warn!("Skipping incomplete photo group {} (no front scan)", group.name);
                    continue;
                }
            };

            let source_filenames = group
                .source_files()
                .iter()
                .map(|p| p.display().to_string())
                .collect();

            let images = PhotoImages {
                front: normalize_file(front)?,
                enhanced_front: group
                    .enhanced_front
                    .as_deref()
                    .map(normalize_file)
                    .transpose()?,
                back: group.back.as_deref().map(normalize_file).transpose()?,
                ..Default::default()
            };

            let mut photo = Photo::new(new_photo_id(), images, source_filenames);
            photo.add_thumbnail()?;
            photos.push(photo);
        }

        Ok(Self::new(name.to_string(), photos))
    }

    /// Write the collection directory, images plus manifest.
    pub fn write(&self, path: &Path) -> Result<()> {
        let images_root = path.join(IMAGES_DIR);
        fs::create_dir_all(&images_root)
            .with_context(|| format!("Failed to create {}", images_root.display()))?;

        let mut entries = Vec::with_capacity(self.photos.len());
        for photo in &self.photos {
            let photo_dir = images_root.join(photo.id());
            fs::create_dir_all(&photo_dir)
                .with_context(|| format!("Failed to create {}", photo_dir.display()))?;

            let images = photo.images();
            let front = write_variant(path, photo.id(), "front", Some(&images.front))?
                .expect("front is always present");
            let back = write_variant(path, photo.id(), "back", images.back.as_deref())?;
            let enhanced_front =
                write_variant(path, photo.id(), "enhanced_front", images.enhanced_front.as_deref())?;
            let thumbnail =
                write_variant(path, photo.id(), "thumbnail", images.thumbnail.as_deref())?;

            entries.push(PhotoEntry {
                id: photo.id().to_string(),
                images: ImagePaths {
                    front,
                    back,
                    enhanced_front,
                    thumbnail,
                    front_orientation: images.front_rotation,
                    back_orientation: images.back_rotation,
                    enhanced_front_orientation: images.enhanced_front_rotation,
                },
                source_filenames: photo.source_filenames().to_vec(),
            });
        }

        let manifest = Manifest {
            name: self.name.clone(),
            created_at: Some(Utc::now()),
            photos: entries,
        };
        let json = serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        let manifest_path = path.join(MANIFEST_FILE);
        fs::write(&manifest_path, json)
            .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

        log::info!(
            "Wrote collection '{}' with {} photos to {}",
            self.name,
            self.photos.len(),
            path.display()
        );
        Ok(())
    }

    /// Load a collection previously written with [`Collection::write`].
    pub fn read(path: &Path) -> Result<Self> {
        let manifest_path = path.join(MANIFEST_FILE);
        let json = fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        let manifest: Manifest = serde_json::from_str(&json)
            .with_context(|| format!("Malformed manifest {}", manifest_path.display()))?;

        let mut photos = Vec::with_capacity(manifest.photos.len());
        for entry in manifest.photos {
            let images = PhotoImages {
                front: read_relative(path, &entry.images.front)?,
                back: entry
                    .images
                    .back
                    .as_deref()
                    .map(|p| read_relative(path, p))
                    .transpose()?,
                enhanced_front: entry
                    .images
                    .enhanced_front
                    .as_deref()
                    .map(|p| read_relative(path, p))
                    .transpose()?,
                thumbnail: entry
                    .images
                    .thumbnail
                    .as_deref()
                    .map(|p| read_relative(path, p))
                    .transpose()?,
                front_rotation: entry.images.front_orientation,
                back_rotation: entry.images.back_orientation,
                enhanced_front_rotation: entry.images.enhanced_front_orientation,
            };
            photos.push(Photo::new(entry.id, images, entry.source_filenames));
        }

        Ok(Self::new(manifest.name, photos))
    }
}

/// 16-hex-character photo id.
fn new_photo_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(16);
    id
}

fn normalize_file(path: &Path) -> Result<Vec<u8>> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    normalize_jpeg(&bytes).with_context(|| format!("Failed to normalize {}", path.display()))
}

/// Write one image variant and return its manifest-relative path.
fn write_variant(
    root: &Path,
    photo_id: &str,
    variant: &str,
    bytes: Option<&[u8]>,
) -> Result<Option<String>> {
    let bytes = match bytes {
        Some(bytes) => bytes,
        None => return Ok(None),
    };
    let relative = format!("{}/{}/{}.jpg", IMAGES_DIR, photo_id, variant);
    let target = root.join(&relative);
    fs::write(&target, bytes).with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(Some(relative))
}

fn read_relative(root: &Path, relative: &str) -> Result<Vec<u8>> {
    let path = root.join(relative);
    fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))
}
