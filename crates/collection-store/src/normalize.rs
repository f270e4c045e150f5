//! EXIF orientation normalization
//!
//! Scanner output frequently encodes rotation as an EXIF tag instead of in
//! the pixel data. Normalization reads the Orientation tag, applies the
//! equivalent pixel transform, and re-encodes a clean JPEG so everything
//! downstream can ignore EXIF entirely.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use rexif::{ExifTag, TagValue};
use std::io::Cursor;

/// JPEG quality for re-encoded images. High because normalization already
/// costs one generation loss.
const JPEG_QUALITY: u8 = 95;

/// Apply the EXIF orientation of `bytes` to its pixels and return a clean
/// JPEG with no orientation dependence.
pub fn normalize_jpeg(bytes: &[u8]) -> Result<Vec<u8>> {
    let orientation = read_orientation(bytes);
    let img = image::load_from_memory(bytes).context("Failed to decode image")?;
    let upright = apply_orientation(img, orientation);

    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buffer), JPEG_QUALITY);
    upright
        .write_with_encoder(encoder)
        .context("Failed to encode normalized JPEG")?;
    Ok(buffer)
}

/// EXIF Orientation tag value (1-8), defaulting to 1 (upright) when the
/// image has no parseable EXIF block.
fn read_orientation(bytes: &[u8]) -> u16 {
    let exif = match rexif::parse_buffer(bytes) {
        Ok(exif) => exif,
        Err(error) => {
            log::debug!("No EXIF data, assuming upright: {}", error);
            return 1;
        }
    };

    for entry in &exif.entries {
        if entry.tag == ExifTag::Orientation {
            if let TagValue::U16(values) = &entry.value {
                if let Some(&value) = values.first() {
                    return value;
                }
            }
        }
    }
    1
}

/// Pixel transform for each EXIF orientation code.
fn apply_orientation(img: DynamicImage, orientation: u16) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate90().flipv(),
        8 => img.rotate270(),
        // 1 is upright; anything else is out of spec and left untouched.
        _ => img,
    }
}
