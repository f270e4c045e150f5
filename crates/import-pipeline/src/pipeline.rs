//! End-to-end deduplication pass over a reorganized tree
//!
//! Enumerates the front scans, fingerprints them in a batch, partitions the
//! fingerprinted set, and materializes the result. Unreadable images are
//! logged and dropped from the candidate set; they count toward the total
//! but appear in neither role.

use crate::materialize::materialize_partition;
use crate::reorganize::FRONTS_DIR;
use anyhow::{bail, Context, Result};
use dedup_detection::{DedupStats, DuplicateGrouper, FingerprintExtractor};
use std::fs;
use std::path::{Path, PathBuf};

/// Run the full dedup pass.
///
/// `threshold` is the inclusive Hamming-distance cutoff; 0 keeps only
/// bit-exact matches together, 5-10 is a typical perceptual tolerance.
pub fn run_dedup(
    reorganized_dir: &Path,
    output_dir: &Path,
    duplicates_dir: &Path,
    threshold: u32,
) -> Result<DedupStats> {
    let fronts = list_fronts(reorganized_dir)?;
    log::info!(
        "Computing fingerprints for {} images (threshold {})",
        fronts.len(),
        threshold
    );

    let extractor = FingerprintExtractor::new();
    let mut candidates = Vec::with_capacity(fronts.len());
    for (path, result) in extractor.hash_files(&fronts) {
        match result {
            Ok(fingerprint) => candidates.push((path, fingerprint)),
            // Unreadable image: excluded from the candidate set entirely.
            Err(error) => log::warn!("Skipping {}: {:#}", path.display(), error),
        }
    }

    let partition = DuplicateGrouper::new(threshold).partition(candidates);
    for (duplicate, original) in &partition.duplicates {
        log::info!(
            "Duplicate: {} matches {}",
            duplicate.display(),
            original.display()
        );
    }

    materialize_partition(&partition, reorganized_dir, output_dir, duplicates_dir)?;

    // Total counts every enumerated front, including the unreadable ones.
    Ok(DedupStats {
        total: fronts.len(),
        kept: partition.representatives.len(),
        duplicates: partition.duplicates.len(),
    })
}

/// Front scans of a reorganized tree, in sorted order.
fn list_fronts(reorganized_dir: &Path) -> Result<Vec<PathBuf>> {
    let fronts_dir = reorganized_dir.join(FRONTS_DIR);
    if !fronts_dir.is_dir() {
        bail!(
            "{} does not look like a reorganized tree (missing {}/)",
            reorganized_dir.display(),
            FRONTS_DIR
        );
    }

    let mut fronts = Vec::new();
    for entry in fs::read_dir(&fronts_dir)
        .with_context(|| format!("Failed to read {}", fronts_dir.display()))?
    {
        let path = entry?.path();
        let is_jpg = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("jpg"))
            .unwrap_or(false);
        if path.is_file() && is_jpg {
            fronts.push(path);
        }
    }

    fronts.sort();
    Ok(fronts)
}
