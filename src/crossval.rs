// src/crossval.rs
//! Cross-validation: turns title clusters into corroboration records and
//! rewrites the corroboration dimension, then recomputes each composite
//! score so the classification stays consistent with the dimensions.

use crate::aggregate::classify;
use crate::cluster::cluster_titles;
use crate::evaluation::{Corroboration, CrossValidation, Evaluation};
use crate::heuristics::HeuristicTables;

/// Corroborated members: 0.5 + 0.15 per extra cluster member, capped at 1.0.
const CORROBORATED_BASE: f32 = 0.5;
const CORROBORATION_STEP: f32 = 0.15;
/// An unconfirmed singleton is penalized below neutral.
const UNCORROBORATED: f32 = 0.3;
/// Topic labels are truncated titles.
const TOPIC_LABEL_MAX: usize = 60;

/// Cluster the evaluations by title, emit corroboration groups, and update
/// every evaluation's corroboration score + composite in place.
pub fn cross_validate(evaluations: &mut [Evaluation], tables: &HeuristicTables) -> CrossValidation {
    let titles: Vec<&str> = evaluations.iter().map(|e| e.source.title.as_str()).collect();
    let clusters = cluster_titles(&titles, tables.clustering.jaccard_threshold);

    let mut corroborations = Vec::new();
    let mut cluster_size = vec![1usize; evaluations.len()];

    for cluster in &clusters {
        for &idx in cluster {
            cluster_size[idx] = cluster.len();
        }
        if cluster.len() >= 2 {
            corroborations.push(Corroboration {
                sources: cluster
                    .iter()
                    .map(|&idx| evaluations[idx].citation_key.clone())
                    .collect(),
                count: cluster.len(),
                topic: evaluations[cluster[0]]
                    .source
                    .title
                    .chars()
                    .take(TOPIC_LABEL_MAX)
                    .collect(),
            });
        }
    }

    for (idx, eval) in evaluations.iter_mut().enumerate() {
        eval.dimensions.corroboration = corroboration_score(cluster_size[idx]);
        // The corroboration weight is 0.25 of the composite; the level must
        // track the recomputed score.
        let (score, level) = classify(&eval.dimensions, &tables.weights);
        eval.composite_score = score;
        eval.level = level;
    }

    let cross_reference_count = corroborations.len();
    CrossValidation {
        corroborations,
        // Declared placeholder: shape always present, no detection logic yet.
        contradictions: Vec::new(),
        cross_reference_count,
    }
}

/// Score for a member of a cluster of the given size.
pub fn corroboration_score(cluster_size: usize) -> f32 {
    if cluster_size > 1 {
        (CORROBORATED_BASE + (cluster_size - 1) as f32 * CORROBORATION_STEP).min(1.0)
    } else {
        UNCORROBORATED
    }
}
