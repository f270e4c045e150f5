//! Average-hash fingerprint extraction
//!
//! Fingerprints are 64-bit average hashes: the image is downsampled to an
//! 8x8 grayscale grid and each bit records whether the cell is above or below
//! the mean intensity. Two fingerprints are compared by Hamming distance.

use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader};
use image_hasher::{HashAlg, Hasher, HasherConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A 64-bit perceptual fingerprint of an image.
///
/// Created once per candidate and never mutated. Equality is bit-exact;
/// similarity is measured with [`Fingerprint::distance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Number of bits in a fingerprint (8x8 hash grid).
    pub const BITS: u32 = 64;

    /// Build a fingerprint from raw bits. Mainly useful in tests.
    pub fn from_bits(bits: u64) -> Self {
        Fingerprint(bits)
    }

    /// Raw bit representation.
    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Hamming distance: the number of bit positions that differ.
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Computes average-hash fingerprints for images and image files.
pub struct FingerprintExtractor;

impl FingerprintExtractor {
    pub fn new() -> Self {
        Self
    }

    // 8x8 Mean hash gives a 64-bit fingerprint; the hasher itself is cheap
    // to construct, so batch workers build their own.
    fn hasher() -> Hasher {
        HasherConfig::new()
            .hash_size(8, 8)
            .hash_alg(HashAlg::Mean)
            .to_hasher()
    }

    /// Fingerprint an already-decoded image.
    pub fn hash_image(&self, image: &DynamicImage) -> Fingerprint {
        let hash = Self::hasher().hash_image(image);
        let mut bits = [0u8; 8];
        let bytes = hash.as_bytes();
        bits[..bytes.len().min(8)].copy_from_slice(&bytes[..bytes.len().min(8)]);
        Fingerprint(u64::from_le_bytes(bits))
    }

    /// Fingerprint an image file. Decode failures are returned as errors so
    /// the caller can drop the candidate and continue with the rest.
    pub fn hash_file(&self, path: &Path) -> Result<Fingerprint> {
        let image = ImageReader::open(path)
            .with_context(|| format!("Failed to open image {}", path.display()))?
            .with_guessed_format()
            .with_context(|| format!("Failed to probe image format of {}", path.display()))?
            .decode()
            .with_context(|| format!("Failed to decode image {}", path.display()))?;

        Ok(self.hash_image(&image))
    }

    /// Fingerprint a batch of files in parallel.
    ///
    /// The output is in the same order as the input; each entry carries its
    /// own `Result` so a single unreadable file does not fail the batch.
    pub fn hash_files(&self, paths: &[PathBuf]) -> Vec<(PathBuf, Result<Fingerprint>)> {
        paths
            .par_iter()
            .map(|path| (path.clone(), self.hash_file(path)))
            .collect()
    }
}

impl Default for FingerprintExtractor {
    fn default() -> Self {
        Self::new()
    }
}
