//! Perceptual fingerprinting and duplicate grouping library for photosift
//!
//! This crate computes 64-bit average-hash fingerprints for images and
//! partitions a batch of fingerprinted candidates into kept representatives
//! and duplicate mappings using Hamming-distance comparison.

pub mod fingerprint;
pub mod group;

pub use fingerprint::{Fingerprint, FingerprintExtractor};
pub use group::{DedupPartition, DedupStats, DuplicateGrouper};
