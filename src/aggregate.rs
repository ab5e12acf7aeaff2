// src/aggregate.rs
//! Composite scoring and corpus rollup.
//!
//! Composite = weighted sum of the five dimensions (weights from the
//! heuristic tables, validated to sum to 1.0). The rollup is a read-only
//! reduction over the finished evaluation set; an empty corpus yields
//! neutral, well-defined values rather than NaN.

use crate::dimensions::{round3, DimensionScores};
use crate::evaluation::{AggregateMetrics, CredibilityLevel, DimensionAverages, Evaluation};
use crate::heuristics::CompositeWeights;

/// Neutral value reported for averages over an empty corpus.
const EMPTY_CORPUS_AVERAGE: f32 = 0.5;

/// Weighted composite in [0,1], rounded to 3 decimals.
pub fn composite(d: &DimensionScores, w: &CompositeWeights) -> f32 {
    let raw = d.authority * w.authority
        + d.recency * w.recency
        + d.corroboration * w.corroboration
        + d.bias * w.bias
        + d.methodology * w.methodology;
    round3(raw.clamp(0.0, 1.0))
}

/// Composite plus its level in one step.
pub fn classify(d: &DimensionScores, w: &CompositeWeights) -> (f32, CredibilityLevel) {
    let score = composite(d, w);
    (score, CredibilityLevel::from_score(score))
}

/// Full corpus rollup.
pub fn rollup(evaluations: &[Evaluation]) -> AggregateMetrics {
    if evaluations.is_empty() {
        return AggregateMetrics {
            average_composite: EMPTY_CORPUS_AVERAGE,
            dimension_averages: DimensionAverages {
                authority: EMPTY_CORPUS_AVERAGE,
                recency: EMPTY_CORPUS_AVERAGE,
                corroboration: EMPTY_CORPUS_AVERAGE,
                bias: EMPTY_CORPUS_AVERAGE,
                methodology: EMPTY_CORPUS_AVERAGE,
            },
            high_credibility_count: 0,
            medium_credibility_count: 0,
            low_credibility_count: 0,
            total_sources: 0,
        };
    }

    let n = evaluations.len() as f32;
    let mut sums = DimensionScores {
        authority: 0.0,
        recency: 0.0,
        corroboration: 0.0,
        bias: 0.0,
        methodology: 0.0,
    };
    let mut composite_sum = 0.0f32;
    let mut high = 0usize;
    let mut medium = 0usize;
    let mut low = 0usize;

    for e in evaluations {
        sums.authority += e.dimensions.authority;
        sums.recency += e.dimensions.recency;
        sums.corroboration += e.dimensions.corroboration;
        sums.bias += e.dimensions.bias;
        sums.methodology += e.dimensions.methodology;
        composite_sum += e.composite_score;

        match e.level {
            CredibilityLevel::High => high += 1,
            CredibilityLevel::Medium => medium += 1,
            _ => low += 1,
        }
    }

    AggregateMetrics {
        average_composite: round3(composite_sum / n),
        dimension_averages: DimensionAverages {
            authority: round3(sums.authority / n),
            recency: round3(sums.recency / n),
            corroboration: round3(sums.corroboration / n),
            bias: round3(sums.bias / n),
            methodology: round3(sums.methodology / n),
        },
        high_credibility_count: high,
        medium_credibility_count: medium,
        low_credibility_count: low,
        total_sources: evaluations.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::HeuristicTables;
    use crate::provenance;
    use crate::source::{Source, SourceKind};

    fn weights() -> CompositeWeights {
        HeuristicTables::default_tables().weights
    }

    fn eval_with(dimensions: DimensionScores) -> Evaluation {
        let source = Source::new(SourceKind::Web, "t", "https://example.com");
        let (composite_score, level) = classify(&dimensions, &weights());
        Evaluation {
            provenance: provenance::track(&source),
            citation_key: provenance::citation_key(&source),
            source,
            dimensions,
            composite_score,
            level,
        }
    }

    fn flat(v: f32) -> DimensionScores {
        DimensionScores {
            authority: v,
            recency: v,
            corroboration: v,
            bias: v,
            methodology: v,
        }
    }

    #[test]
    fn composite_is_weighted_sum() {
        let d = DimensionScores {
            authority: 1.0,
            recency: 0.0,
            corroboration: 0.0,
            bias: 0.0,
            methodology: 0.0,
        };
        assert!((composite(&d, &weights()) - 0.30).abs() < 1e-6);
        assert!((composite(&flat(1.0), &weights()) - 1.0).abs() < 1e-6);
        assert!((composite(&flat(0.0), &weights())).abs() < 1e-6);
    }

    #[test]
    fn classify_matches_thresholds() {
        let (s, level) = classify(&flat(0.85), &weights());
        assert!((s - 0.85).abs() < 1e-6);
        assert_eq!(level, CredibilityLevel::High);
        let (_, level) = classify(&flat(0.5), &weights());
        assert_eq!(level, CredibilityLevel::Low);
    }

    #[test]
    fn empty_corpus_is_neutral_not_nan() {
        let m = rollup(&[]);
        assert_eq!(m.total_sources, 0);
        assert_eq!(m.high_credibility_count, 0);
        assert_eq!(m.medium_credibility_count, 0);
        assert_eq!(m.low_credibility_count, 0);
        assert!((m.average_composite - 0.5).abs() < 1e-6);
        assert!((m.dimension_averages.authority - 0.5).abs() < 1e-6);
        assert!(m.average_composite.is_finite());
    }

    #[test]
    fn rollup_counts_merge_low_and_very_low() {
        let evals = vec![
            eval_with(flat(0.9)),  // High
            eval_with(flat(0.7)),  // Medium
            eval_with(flat(0.45)), // Low
            eval_with(flat(0.1)),  // Very Low
        ];
        let m = rollup(&evals);
        assert_eq!(m.total_sources, 4);
        assert_eq!(m.high_credibility_count, 1);
        assert_eq!(m.medium_credibility_count, 1);
        assert_eq!(m.low_credibility_count, 2);
        assert!((m.average_composite - round3((0.9 + 0.7 + 0.45 + 0.1) / 4.0)).abs() < 1e-6);
    }

    #[test]
    fn rollup_dimension_averages() {
        let evals = vec![eval_with(flat(0.2)), eval_with(flat(0.8))];
        let m = rollup(&evals);
        assert!((m.dimension_averages.recency - 0.5).abs() < 1e-6);
        assert!((m.dimension_averages.methodology - 0.5).abs() < 1e-6);
    }
}
