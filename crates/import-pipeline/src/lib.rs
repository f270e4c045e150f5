//! FastFoto import pipeline for photosift
//!
//! This crate turns raw FastFoto scanner output into the structured layout
//! the rest of the toolkit works with, and materializes deduplication
//! results back to disk:
//!
//! - **scan**: group scanner files into photos (front / enhanced front / back)
//! - **reorganize**: copy groups into `fronts/`, `enhanced_fronts/`, `backs/`
//! - **pipeline**: fingerprint fronts, partition them, and copy the kept and
//!   duplicate sets out for review

pub mod materialize;
pub mod pipeline;
pub mod reorganize;
pub mod scan;

pub use materialize::materialize_partition;
pub use pipeline::run_dedup;
pub use reorganize::{reorganize_fast_foto, ReorganizeStats};
pub use scan::{scan_fast_foto, PhotoGroup};
