//! Materialization of a dedup partition back onto disk
//!
//! Kept photos are copied into a fresh structured tree; duplicate pairs are
//! copied side by side into a review directory with names that sort
//! together: `{representative}_KEPT.jpg` next to
//! `{representative}_EXCLUDED_{duplicate}.jpg`.

use crate::reorganize::{BACKS_DIR, ENHANCED_FRONTS_DIR, FRONTS_DIR};
use anyhow::{bail, Context, Result};
use dedup_detection::DedupPartition;
use std::fs;
use std::path::{Path, PathBuf};

/// Copy the kept and duplicate sets of `partition` out of `reorganized_dir`.
///
/// Identifiers in the partition are paths to front scans inside
/// `reorganized_dir/fronts/`. Side files (enhanced fronts and backs) travel
/// with their front by basename.
pub fn materialize_partition(
    partition: &DedupPartition<PathBuf>,
    reorganized_dir: &Path,
    output_dir: &Path,
    duplicates_dir: &Path,
) -> Result<()> {
    let input_enhanced = reorganized_dir.join(ENHANCED_FRONTS_DIR);
    let input_backs = reorganized_dir.join(BACKS_DIR);

    let output_fronts = output_dir.join(FRONTS_DIR);
    let output_enhanced = output_dir.join(ENHANCED_FRONTS_DIR);
    let output_backs = output_dir.join(BACKS_DIR);

    for dir in [
        output_fronts.as_path(),
        output_enhanced.as_path(),
        output_backs.as_path(),
        duplicates_dir,
    ] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    log::info!(
        "Copying {} kept photos and {} duplicate pairs",
        partition.representatives.len(),
        partition.duplicates.len()
    );

    for front in &partition.representatives {
        let name = stem_of(front)?;
        let file_name = format!("{}.jpg", name);

        fs::copy(front, output_fronts.join(&file_name))
            .with_context(|| format!("Failed to copy kept front {}", front.display()))?;

        copy_if_exists(&input_enhanced.join(&file_name), &output_enhanced.join(&file_name))?;
        copy_if_exists(&input_backs.join(&file_name), &output_backs.join(&file_name))?;
    }

    for (duplicate, original) in &partition.duplicates {
        let dup_name = stem_of(duplicate)?;
        let orig_name = stem_of(original)?;

        // The kept original first, so the pair sorts together in a listing.
        fs::copy(original, duplicates_dir.join(format!("{}_KEPT.jpg", orig_name)))
            .with_context(|| format!("Failed to copy original {}", original.display()))?;
        fs::copy(
            duplicate,
            duplicates_dir.join(format!("{}_EXCLUDED_{}.jpg", orig_name, dup_name)),
        )
        .with_context(|| format!("Failed to copy duplicate {}", duplicate.display()))?;

        let side_file = format!("{}.jpg", dup_name);
        copy_if_exists(
            &input_enhanced.join(&side_file),
            &duplicates_dir.join(format!("{}_EXCLUDED_{}_enhanced.jpg", orig_name, dup_name)),
        )?;
        copy_if_exists(
            &input_backs.join(&side_file),
            &duplicates_dir.join(format!("{}_EXCLUDED_{}_back.jpg", orig_name, dup_name)),
        )?;

        let orig_side_file = format!("{}.jpg", orig_name);
        copy_if_exists(
            &input_enhanced.join(&orig_side_file),
            &duplicates_dir.join(format!("{}_KEPT_enhanced.jpg", orig_name)),
        )?;
        copy_if_exists(
            &input_backs.join(&orig_side_file),
            &duplicates_dir.join(format!("{}_KEPT_back.jpg", orig_name)),
        )?;
    }

    Ok(())
}

fn copy_if_exists(source: &Path, target: &Path) -> Result<()> {
    if source.exists() {
        fs::copy(source, target).with_context(|| {
            format!("Failed to copy {} to {}", source.display(), target.display())
        })?;
    }
    Ok(())
}

fn stem_of(path: &Path) -> Result<&str> {
    match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => Ok(stem),
        None => bail!("Cannot derive a basename from {}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn touch(path: &Path, contents: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn partition(
        representatives: &[&Path],
        duplicates: &[(&Path, &Path)],
    ) -> DedupPartition<PathBuf> {
        DedupPartition {
            representatives: representatives.iter().map(|p| p.to_path_buf()).collect(),
            duplicates: duplicates
                .iter()
                .map(|(d, o)| (d.to_path_buf(), o.to_path_buf()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn kept_fronts_travel_with_their_side_files() {
        let reorganized = tempdir().unwrap();
        let output = tempdir().unwrap();
        let review = tempdir().unwrap();

        let front = reorganized.path().join("fronts/pic.jpg");
        touch(&front, b"front");
        touch(&reorganized.path().join("enhanced_fronts/pic.jpg"), b"enh");
        touch(&reorganized.path().join("backs/pic.jpg"), b"back");

        materialize_partition(
            &partition(&[&front], &[]),
            reorganized.path(),
            output.path(),
            review.path(),
        )
        .unwrap();

        assert_eq!(fs::read(output.path().join("fronts/pic.jpg")).unwrap(), b"front");
        assert_eq!(
            fs::read(output.path().join("enhanced_fronts/pic.jpg")).unwrap(),
            b"enh"
        );
        assert_eq!(fs::read(output.path().join("backs/pic.jpg")).unwrap(), b"back");
    }

    #[test]
    fn duplicate_pairs_use_review_naming_scheme() {
        let reorganized = tempdir().unwrap();
        let output = tempdir().unwrap();
        let review = tempdir().unwrap();

        let orig = reorganized.path().join("fronts/orig.jpg");
        let dup = reorganized.path().join("fronts/dup.jpg");
        touch(&orig, b"orig");
        touch(&dup, b"dup");
        touch(&reorganized.path().join("enhanced_fronts/dup.jpg"), b"dup enh");
        touch(&reorganized.path().join("backs/orig.jpg"), b"orig back");

        materialize_partition(
            &partition(&[&orig], &[(&dup, &orig)]),
            reorganized.path(),
            output.path(),
            review.path(),
        )
        .unwrap();

        assert_eq!(fs::read(review.path().join("orig_KEPT.jpg")).unwrap(), b"orig");
        assert_eq!(
            fs::read(review.path().join("orig_EXCLUDED_dup.jpg")).unwrap(),
            b"dup"
        );
        assert_eq!(
            fs::read(review.path().join("orig_EXCLUDED_dup_enhanced.jpg")).unwrap(),
            b"dup enh"
        );
        assert_eq!(
            fs::read(review.path().join("orig_KEPT_back.jpg")).unwrap(),
            b"orig back"
        );
        // Side files that never existed are not invented.
        assert!(!review.path().join("orig_EXCLUDED_dup_back.jpg").exists());
        assert!(!review.path().join("orig_KEPT_enhanced.jpg").exists());
        // The duplicate front does not leak into the kept tree.
        assert!(!output.path().join("fronts/dup.jpg").exists());
    }
}
