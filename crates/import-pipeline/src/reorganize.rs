//! Reorganization of FastFoto output into the structured tree
//!
//! Copies scanner files into `fronts/`, `enhanced_fronts/` and `backs/`
//! subdirectories, one file per photo slot, all named after the group's
//! collision-free basename.

use crate::scan::{scan_fast_foto, PhotoGroup};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const FRONTS_DIR: &str = "fronts";
pub const ENHANCED_FRONTS_DIR: &str = "enhanced_fronts";
pub const BACKS_DIR: &str = "backs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorganizeStats {
    /// Photo groups found in the scanner output.
    pub photos: usize,
    /// Individual files copied into the structured tree.
    pub files_copied: usize,
}

/// Reorganize a FastFoto output tree into `output_dir`.
///
/// The target subdirectories must be empty (or absent); partially-filled
/// outputs are rejected up front rather than merged into.
pub fn reorganize_fast_foto(fast_foto_dir: &Path, output_dir: &Path) -> Result<ReorganizeStats> {
    let fronts_dir = output_dir.join(FRONTS_DIR);
    let enhanced_dir = output_dir.join(ENHANCED_FRONTS_DIR);
    let backs_dir = output_dir.join(BACKS_DIR);

    for dir in [&fronts_dir, &enhanced_dir, &backs_dir] {
        ensure_absent_or_empty(dir)?;
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let groups = scan_fast_foto(fast_foto_dir)?;
    log::info!(
        "Reorganizing {} photo groups from {}",
        groups.len(),
        fast_foto_dir.display()
    );

    let mut files_copied = 0;
    for group in &groups {
        files_copied += copy_group(group, &fronts_dir, &enhanced_dir, &backs_dir)?;
    }

    Ok(ReorganizeStats {
        photos: groups.len(),
        files_copied,
    })
}

fn copy_group(
    group: &PhotoGroup,
    fronts_dir: &Path,
    enhanced_dir: &Path,
    backs_dir: &Path,
) -> Result<usize> {
    let file_name = format!("{}.jpg", group.name);
    let mut copied = 0;

    let slots: [(&Option<PathBuf>, &Path); 3] = [
        (&group.front, fronts_dir),
        (&group.enhanced_front, enhanced_dir),
        (&group.back, backs_dir),
    ];

    for (source, target_dir) in slots {
        if let Some(source) = source {
            let target = target_dir.join(&file_name);
            fs::copy(source, &target).with_context(|| {
                format!("Failed to copy {} to {}", source.display(), target.display())
            })?;
            copied += 1;
        }
    }

    log::debug!("Copied {} files for photo {}", copied, group.name);
    Ok(copied)
}

fn ensure_absent_or_empty(dir: &Path) -> Result<()> {
    if dir.exists() {
        let mut entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read {}", dir.display()))?;
        if entries.next().is_some() {
            bail!(
                "Output directory {} exists and is not empty, refusing to overwrite",
                dir.display()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path, contents: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn copies_each_slot_into_its_subdirectory() {
        let source = tempdir().unwrap();
        let output = tempdir().unwrap();
        touch(&source.path().join("IMG_1.jpg"), b"front");
        touch(&source.path().join("IMG_1_a.jpg"), b"enhanced");
        touch(&source.path().join("IMG_1_b.jpg"), b"back");

        let stats = reorganize_fast_foto(source.path(), output.path()).unwrap();

        assert_eq!(stats.photos, 1);
        assert_eq!(stats.files_copied, 3);
        assert_eq!(
            fs::read(output.path().join("fronts/IMG_1.jpg")).unwrap(),
            b"front"
        );
        assert_eq!(
            fs::read(output.path().join("enhanced_fronts/IMG_1.jpg")).unwrap(),
            b"enhanced"
        );
        assert_eq!(
            fs::read(output.path().join("backs/IMG_1.jpg")).unwrap(),
            b"back"
        );
    }

    #[test]
    fn missing_slots_are_simply_absent() {
        let source = tempdir().unwrap();
        let output = tempdir().unwrap();
        touch(&source.path().join("only_front.jpg"), b"front");

        let stats = reorganize_fast_foto(source.path(), output.path()).unwrap();

        assert_eq!(stats.files_copied, 1);
        assert!(output.path().join("fronts/only_front.jpg").exists());
        assert!(!output.path().join("enhanced_fronts/only_front.jpg").exists());
        assert!(!output.path().join("backs/only_front.jpg").exists());
    }

    #[test]
    fn collision_counters_carry_into_output_names() {
        let source = tempdir().unwrap();
        let output = tempdir().unwrap();
        touch(&source.path().join("roll1/scan.jpg"), b"one");
        touch(&source.path().join("roll2/scan.jpg"), b"two");

        let stats = reorganize_fast_foto(source.path(), output.path()).unwrap();

        assert_eq!(stats.photos, 2);
        assert!(output.path().join("fronts/scan_0.jpg").exists());
        assert!(output.path().join("fronts/scan_1.jpg").exists());
    }

    #[test]
    fn refuses_non_empty_output() {
        let source = tempdir().unwrap();
        let output = tempdir().unwrap();
        touch(&source.path().join("a.jpg"), b"front");
        touch(&output.path().join("fronts/existing.jpg"), b"old");

        assert!(reorganize_fast_foto(source.path(), output.path()).is_err());
    }

    #[test]
    fn empty_existing_output_directories_are_fine() {
        let source = tempdir().unwrap();
        let output = tempdir().unwrap();
        touch(&source.path().join("a.jpg"), b"front");
        fs::create_dir_all(output.path().join("fronts")).unwrap();

        let stats = reorganize_fast_foto(source.path(), output.path()).unwrap();
        assert_eq!(stats.photos, 1);
    }
}
