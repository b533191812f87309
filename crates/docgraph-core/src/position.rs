//! Deterministic ordering and deduplication of artifacts by source offset

use std::collections::HashSet;

use crate::artifact::Artifact;

/// Return a new ordering of `artifacts`, ascending by `start` with ties
/// broken by `end`. The sort is stable: artifacts equal on both keys keep
/// their original relative order. The input is left untouched.
pub fn sort_artifacts(artifacts: &[Artifact]) -> Vec<Artifact> {
    let mut sorted = artifacts.to_vec();
    sorted.sort_by_key(|a| (a.start, a.end));
    sorted
}

/// Drop duplicate artifacts, keyed by `kind:start:end`.
///
/// The first artifact seen for a key (in input order) wins; later duplicates
/// are dropped silently. Runs before sorting in the pipeline, so "first" is
/// input order.
pub fn remove_duplicates(artifacts: Vec<Artifact>) -> Vec<Artifact> {
    let mut seen = HashSet::new();
    artifacts
        .into_iter()
        .filter(|a| seen.insert(a.identity_key()))
        .collect()
}
