//! Greedy duplicate grouping over fingerprinted candidates
//!
//! The grouper partitions a batch of (identifier, fingerprint) pairs into
//! kept representatives and a duplicate -> representative mapping. It is a
//! single-linkage greedy pass: candidates are visited in sorted identifier
//! order, the first unclaimed candidate becomes a representative, and every
//! later unclaimed candidate within the Hamming threshold is claimed by it.
//!
//! Chains of similarity are deliberately NOT merged transitively: a candidate
//! joins a group only by direct comparison against the running
//! representative. This matches the upstream behavior and callers depend on
//! it being stable.

use crate::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary counts for one grouping pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupStats {
    /// Candidates that entered the pass.
    pub total: usize,
    /// Representatives kept.
    pub kept: usize,
    /// Candidates claimed as duplicates.
    pub duplicates: usize,
}

/// Result of partitioning a candidate set.
///
/// Invariant: every input identifier appears in exactly one role, either in
/// `representatives` or as a key in `duplicates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupPartition<I: Ord> {
    /// Kept identifiers, in sorted order.
    pub representatives: Vec<I>,
    /// Each claimed duplicate mapped to the representative it duplicates.
    pub duplicates: BTreeMap<I, I>,
}

impl<I: Ord> DedupPartition<I> {
    /// Total number of candidates that entered the pass.
    pub fn total(&self) -> usize {
        self.representatives.len() + self.duplicates.len()
    }

    pub fn stats(&self) -> DedupStats {
        DedupStats {
            total: self.total(),
            kept: self.representatives.len(),
            duplicates: self.duplicates.len(),
        }
    }
}

/// Partitions fingerprinted candidates into representatives and duplicates.
pub struct DuplicateGrouper {
    threshold: u32,
}

impl DuplicateGrouper {
    /// `threshold` is the maximum Hamming distance (inclusive) at which two
    /// fingerprints count as duplicates. 0 means bit-exact matches only.
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Partition the candidate set.
    ///
    /// Candidates are first sorted by identifier so the result is independent
    /// of enumeration order. The pass is pure: no I/O, and the full candidate
    /// set must already be materialized because any candidate may be compared
    /// against any earlier representative.
    pub fn partition<I: Ord + Clone>(&self, mut candidates: Vec<(I, Fingerprint)>) -> DedupPartition<I> {
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let mut processed = vec![false; candidates.len()];
        let mut representatives = Vec::new();
        let mut duplicates = BTreeMap::new();

        for i in 0..candidates.len() {
            if processed[i] {
                continue;
            }

            // First unclaimed candidate in sort order wins as representative.
            processed[i] = true;
            representatives.push(candidates[i].0.clone());
            let rep_fingerprint = candidates[i].1;

            for j in (i + 1)..candidates.len() {
                if processed[j] {
                    continue;
                }
                if rep_fingerprint.distance(&candidates[j].1) <= self.threshold {
                    duplicates.insert(candidates[j].0.clone(), candidates[i].0.clone());
                    processed[j] = true;
                }
            }
        }

        DedupPartition {
            representatives,
            duplicates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(pairs: &[(&str, u64)]) -> Vec<(String, Fingerprint)> {
        pairs
            .iter()
            .map(|(id, bits)| (id.to_string(), Fingerprint::from_bits(*bits)))
            .collect()
    }

    #[test]
    fn near_duplicates_group_under_threshold_one() {
        // A(0000) and B(0001) differ by one bit; C(1111) is distance 4 from A.
        let input = candidates(&[("A", 0b0000), ("B", 0b0001), ("C", 0b1111)]);

        let partition = DuplicateGrouper::new(1).partition(input);

        assert_eq!(partition.representatives, vec!["A", "C"]);
        assert_eq!(partition.duplicates.len(), 1);
        assert_eq!(partition.duplicates["B"], "A");
    }

    #[test]
    fn threshold_zero_requires_exact_equality() {
        let input = candidates(&[("A", 0b0000), ("B", 0b0001), ("C", 0b1111)]);

        let partition = DuplicateGrouper::new(0).partition(input);

        assert_eq!(partition.representatives, vec!["A", "B", "C"]);
        assert!(partition.duplicates.is_empty());
    }

    #[test]
    fn threshold_zero_groups_bit_identical_fingerprints() {
        let input = candidates(&[("A", 0xabcd), ("B", 0xabcd), ("C", 0xabce)]);

        let partition = DuplicateGrouper::new(0).partition(input);

        assert_eq!(partition.representatives, vec!["A", "C"]);
        assert_eq!(partition.duplicates["B"], "A");
    }

    #[test]
    fn first_in_sort_order_wins_as_representative() {
        // Input deliberately out of order; "B" sorts before "Z" and claims it.
        let input = candidates(&[("Z", 0b0001), ("B", 0b0000)]);

        let partition = DuplicateGrouper::new(1).partition(input);

        assert_eq!(partition.representatives, vec!["B"]);
        assert_eq!(partition.duplicates["Z"], "B");
    }

    #[test]
    fn chain_does_not_merge_transitively() {
        // d(A,B)=2, d(B,C)=1, d(A,C)=3. With threshold 2, B is claimed by A
        // and never becomes a representative, so C (too far from A) stands
        // alone even though it is within threshold of B. Single-linkage
        // greedy grouping: preserved, not a bug.
        let input = candidates(&[("A", 0b000), ("B", 0b011), ("C", 0b111)]);

        let partition = DuplicateGrouper::new(2).partition(input);

        assert_eq!(partition.representatives, vec!["A", "C"]);
        assert_eq!(partition.duplicates["B"], "A");
    }

    #[test]
    fn every_candidate_lands_in_exactly_one_role() {
        let input = candidates(&[
            ("a", 0b0000),
            ("b", 0b0001),
            ("c", 0b0011),
            ("d", 0b1111),
            ("e", 0b1110),
            ("f", 0b1000),
        ]);
        let ids: Vec<String> = input.iter().map(|(id, _)| id.clone()).collect();

        let partition = DuplicateGrouper::new(1).partition(input);

        assert_eq!(partition.total(), ids.len());
        for id in &ids {
            let as_rep = partition.representatives.contains(id);
            let as_dup = partition.duplicates.contains_key(id);
            assert!(as_rep ^ as_dup, "{} must appear in exactly one role", id);
        }
        // No duplicate may point at another duplicate.
        for rep in partition.duplicates.values() {
            assert!(partition.representatives.contains(rep));
        }
    }

    #[test]
    fn result_is_independent_of_input_order() {
        let forward = candidates(&[("a", 0b0000), ("b", 0b0001), ("c", 0b1111), ("d", 0b1110)]);
        let mut reversed = forward.clone();
        reversed.reverse();
        let mut rotated = forward.clone();
        rotated.rotate_left(2);

        let grouper = DuplicateGrouper::new(1);
        let p1 = grouper.partition(forward);
        let p2 = grouper.partition(reversed);
        let p3 = grouper.partition(rotated);

        assert_eq!(p1.representatives, p2.representatives);
        assert_eq!(p1.duplicates, p2.duplicates);
        assert_eq!(p1.representatives, p3.representatives);
        assert_eq!(p1.duplicates, p3.duplicates);
    }

    #[test]
    fn raising_threshold_never_finds_fewer_duplicates() {
        let input = candidates(&[
            ("a", 0b0000),
            ("b", 0b0001),
            ("c", 0b0111),
            ("d", 0b1111),
            ("e", 0b1010),
        ]);

        let mut previous = 0;
        for threshold in 0..=4 {
            let partition = DuplicateGrouper::new(threshold).partition(input.clone());
            let found = partition.duplicates.len();
            assert!(
                found >= previous,
                "threshold {} found {} duplicates, fewer than {}",
                threshold,
                found,
                previous
            );
            previous = found;
        }
    }

    #[test]
    fn empty_input_yields_empty_partition() {
        let partition = DuplicateGrouper::new(5).partition(Vec::<(String, Fingerprint)>::new());
        assert!(partition.representatives.is_empty());
        assert!(partition.duplicates.is_empty());
        assert_eq!(partition.stats().total, 0);
    }

    #[test]
    fn single_candidate_is_its_own_representative() {
        let partition = DuplicateGrouper::new(5).partition(candidates(&[("only", 0xffff)]));
        assert_eq!(partition.representatives, vec!["only"]);
        assert!(partition.duplicates.is_empty());
    }

    #[test]
    fn stats_reflect_partition_sizes() {
        let input = candidates(&[("a", 0b0000), ("b", 0b0001), ("c", 0b1111)]);
        let stats = DuplicateGrouper::new(1).partition(input).stats();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.kept, 2);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.kept + stats.duplicates, stats.total);
    }
}
