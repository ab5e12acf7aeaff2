// src/cluster.rs
//! Title-similarity clustering: groups sources whose titles share enough
//! vocabulary, as a proxy for "discussing the same topic".
//!
//! Greedy single pass over retrieval order: each unassigned source opens a
//! cluster and absorbs every later unassigned source whose title overlap
//! exceeds the threshold. The result is a partition, not a similarity
//! graph; it is order-dependent and deliberately NOT transitively closed —
//! changing that would change corroboration scores downstream.

use std::collections::HashSet;

/// Lowercased alphanumeric runs as a word set.
pub fn tokenize_title(title: &str) -> HashSet<String> {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Jaccard overlap of two word sets. An empty union counts as no match,
/// never a division by zero.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f32 / union as f32
}

/// Partition `titles` (in retrieval order) into clusters of indices.
/// Every index lands in exactly one cluster; singletons stay as
/// single-element clusters.
pub fn cluster_titles<S: AsRef<str>>(titles: &[S], threshold: f32) -> Vec<Vec<usize>> {
    let token_sets: Vec<HashSet<String>> =
        titles.iter().map(|t| tokenize_title(t.as_ref())).collect();

    let mut assigned = vec![false; titles.len()];
    let mut clusters = Vec::new();

    for i in 0..titles.len() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let mut cluster = vec![i];

        for j in (i + 1)..titles.len() {
            if assigned[j] {
                continue;
            }
            if jaccard(&token_sets[i], &token_sets[j]) > threshold {
                assigned[j] = true;
                cluster.push(j);
            }
        }
        clusters.push(cluster);
    }

    clusters
}
