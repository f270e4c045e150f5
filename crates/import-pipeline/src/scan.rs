//! FastFoto output scanning and grouping
//!
//! Epson FastFoto writes up to three files per physical photo: `name.jpg`
//! (the raw front scan), `name_a.jpg` (software-enhanced front) and
//! `name_b.jpg` (the back of the print). This module walks a FastFoto output
//! tree and reassembles those files into per-photo groups.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One physical photo reassembled from scanner output files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoGroup {
    /// Collision-free basename used for all output files of this photo.
    pub name: String,
    pub front: Option<PathBuf>,
    pub enhanced_front: Option<PathBuf>,
    pub back: Option<PathBuf>,
}

impl PhotoGroup {
    /// A group is only usable downstream if the front scan exists.
    pub fn has_front(&self) -> bool {
        self.front.is_some()
    }

    /// Source files in front, enhanced, back order.
    pub fn source_files(&self) -> Vec<&PathBuf> {
        [&self.front, &self.enhanced_front, &self.back]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[derive(Default)]
struct GroupSlots {
    front: Option<PathBuf>,
    enhanced_front: Option<PathBuf>,
    back: Option<PathBuf>,
}

/// Scan a FastFoto output tree and group its files into photos.
///
/// Files are grouped by parent directory plus basename, so the same basename
/// appearing in two directories yields two groups. Basename collisions
/// across directories are resolved by appending a counter (`name_0`,
/// `name_1`, ...). Spaces in basenames are replaced with underscores.
pub fn scan_fast_foto(fast_foto_dir: &Path) -> Result<Vec<PhotoGroup>> {
    if !fast_foto_dir.is_dir() {
        bail!("Not a directory: {}", fast_foto_dir.display());
    }

    // Keyed by (parent dir, basename) so identically-named photos from
    // different scan sessions never merge into one group.
    let mut groups: BTreeMap<(PathBuf, String), GroupSlots> = BTreeMap::new();

    for entry in WalkDir::new(fast_foto_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_jpg = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("jpg"))
            .unwrap_or(false);
        if !is_jpg {
            continue;
        }

        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem,
            None => {
                log::warn!("Skipping file with non-UTF-8 name: {}", path.display());
                continue;
            }
        };

        let (base_name, slot) = classify_stem(stem);
        let base_name = base_name.replace(' ', "_");
        let parent = path.parent().unwrap_or(fast_foto_dir).to_path_buf();

        let slots = groups.entry((parent, base_name)).or_default();
        let target = match slot {
            Slot::Front => &mut slots.front,
            Slot::EnhancedFront => &mut slots.enhanced_front,
            Slot::Back => &mut slots.back,
        };
        if let Some(previous) = target.replace(path.to_path_buf()) {
            log::warn!(
                "Duplicate scan file for the same photo slot, replacing {} with {}",
                previous.display(),
                path.display()
            );
        }
    }

    // Count basename occurrences across directories so collisions get a
    // numeric suffix; unique basenames keep their original name.
    let mut name_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, name) in groups.keys() {
        *name_counts.entry(name.as_str()).or_insert(0) += 1;
    }

    let mut counters: BTreeMap<String, usize> = BTreeMap::new();
    let mut result = Vec::with_capacity(groups.len());

    for ((_, base_name), slots) in &groups {
        let name = if name_counts[base_name.as_str()] > 1 {
            let counter = counters.entry(base_name.clone()).or_insert(0);
            let unique = format!("{}_{}", base_name, counter);
            *counter += 1;
            unique
        } else {
            base_name.clone()
        };

        result.push(PhotoGroup {
            name,
            front: slots.front.clone(),
            enhanced_front: slots.enhanced_front.clone(),
            back: slots.back.clone(),
        });
    }

    Ok(result)
}

enum Slot {
    Front,
    EnhancedFront,
    Back,
}

/// Split a file stem into its photo basename and the slot the file fills.
fn classify_stem(stem: &str) -> (&str, Slot) {
    if let Some(base) = stem.strip_suffix("_a") {
        (base, Slot::EnhancedFront)
    } else if let Some(base) = stem.strip_suffix("_b") {
        (base, Slot::Back)
    } else {
        (stem, Slot::Front)
    }
}
