use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use collection_store::Collection;
use import_pipeline::{reorganize_fast_foto, run_dedup};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photosift")]
#[command(version, about = "Personal photo-collection organizer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reorganize FastFoto scanner output into fronts/, enhanced_fronts/ and backs/
    Reorganize {
        /// Directory containing FastFoto output files
        #[arg(long)]
        fast_foto_dir: PathBuf,

        /// Directory where the structured tree will be written
        #[arg(long)]
        output_dir: PathBuf,
    },

    /// Remove near-duplicate images using perceptual hashing
    Dedup {
        /// Reorganized tree (must contain a fronts/ subdirectory)
        #[arg(long)]
        reorganized_dir: PathBuf,

        /// Directory where the deduplicated tree will be written
        #[arg(long)]
        output_dir: PathBuf,

        /// Directory where duplicate/original pairs are copied for review
        #[arg(long)]
        duplicates_dir: PathBuf,

        /// Maximum Hamming distance to treat two images as duplicates
        /// (0 = exact matches only; 5-10 is a typical perceptual tolerance)
        #[arg(long, default_value = "5")]
        threshold: u32,

        /// Write run statistics to a JSON file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Build a self-contained collection directory from FastFoto output
    Collect {
        /// Directory containing FastFoto output files
        #[arg(long)]
        fast_foto_dir: PathBuf,

        /// Collection name
        #[arg(long)]
        name: String,

        /// Directory the collection will be written into
        #[arg(long)]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Commands::Reorganize {
            fast_foto_dir,
            output_dir,
        } => reorganize(fast_foto_dir, output_dir),
        Commands::Dedup {
            reorganized_dir,
            output_dir,
            duplicates_dir,
            threshold,
            report,
        } => dedup(reorganized_dir, output_dir, duplicates_dir, threshold, report),
        Commands::Collect {
            fast_foto_dir,
            name,
            output_dir,
        } => collect(fast_foto_dir, name, output_dir),
    }
}

fn reorganize(fast_foto_dir: PathBuf, output_dir: PathBuf) -> Result<()> {
    println!("Reorganizing {}", fast_foto_dir.display());
    let stats = reorganize_fast_foto(&fast_foto_dir, &output_dir)?;

    println!("Reorganization complete");
    println!("  Photos found: {}", stats.photos);
    println!("  Files copied: {}", stats.files_copied);
    println!("  Output: {}", output_dir.display());
    Ok(())
}

fn dedup(
    reorganized_dir: PathBuf,
    output_dir: PathBuf,
    duplicates_dir: PathBuf,
    threshold: u32,
    report: Option<PathBuf>,
) -> Result<()> {
    println!(
        "Deduplicating {} (threshold {})",
        reorganized_dir.display(),
        threshold
    );
    let stats = run_dedup(&reorganized_dir, &output_dir, &duplicates_dir, threshold)?;

    println!("Deduplication complete");
    println!("  Total images processed: {}", stats.total);
    println!("  Unique images kept: {}", stats.kept);
    println!("  Duplicates removed: {}", stats.duplicates);
    println!("  Review copies: {}", duplicates_dir.display());

    if let Some(report_path) = report {
        let json = serde_json::to_string_pretty(&stats)
            .context("Failed to serialize dedup report")?;
        std::fs::write(&report_path, json)
            .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
        println!("  Report: {}", report_path.display());
    }
    Ok(())
}

fn collect(fast_foto_dir: PathBuf, name: String, output_dir: PathBuf) -> Result<()> {
    println!(
        "Building collection '{}' from {}",
        name,
        fast_foto_dir.display()
    );
    let collection = Collection::from_fast_foto_tree(&fast_foto_dir, &name)?;
    if collection.is_empty() {
        log::warn!("No usable photo groups found in {}", fast_foto_dir.display());
    }
    collection.write(&output_dir)?;

    println!("Collection complete");
    println!("  Photos: {}", collection.len());
    println!("  Output: {}", output_dir.display());
    Ok(())
}
