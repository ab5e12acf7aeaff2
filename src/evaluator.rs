// src/evaluator.rs
//! Multi-dimensional evaluation pipeline: dimension scoring per source,
//! title clustering, cross-validation, and corpus rollup, producing the
//! report consumed by the reporting collaborator.
//!
//! Pure computation over in-memory records; no I/O. Partial input (missing
//! kinds, zero sources) flows through without special-casing.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::aggregate;
use crate::crossval;
use crate::dimensions;
use crate::evaluation::{Evaluation, EvaluationReport, ReportMetadata};
use crate::heuristics::{HeuristicTables, TablesHandle};
use crate::provenance;
use crate::source::SourceBatch;

/// Evaluation entry point bound to a (hot-reloadable) table handle.
#[derive(Clone)]
pub struct CredibilityEvaluator {
    tables: TablesHandle,
}

impl CredibilityEvaluator {
    pub fn new(tables: TablesHandle) -> Self {
        Self { tables }
    }

    pub fn with_default_tables() -> Self {
        Self::new(TablesHandle::new(HeuristicTables::default_tables()))
    }

    /// Run one full evaluation pass over the batch.
    pub fn evaluate(&self, batch: &SourceBatch) -> EvaluationReport {
        let tables = self.tables.current();
        evaluate_with_tables(batch, &tables)
    }
}

/// Pipeline with explicit tables (the evaluator's worker; public for tests
/// and offline evaluation).
pub fn evaluate_with_tables(batch: &SourceBatch, tables: &HeuristicTables) -> EvaluationReport {
    evaluate_with_tables_at(batch, tables, Utc::now())
}

/// Like [`evaluate_with_tables`] with an injectable "now" so recency and
/// timestamps are deterministic under test.
pub fn evaluate_with_tables_at(
    batch: &SourceBatch,
    tables: &HeuristicTables,
    now: DateTime<Utc>,
) -> EvaluationReport {
    let sources = batch.flatten();
    info!(total = sources.len(), query = %batch.query, "credibility: starting evaluation");

    // 1) Independent dimension scoring + initial classification per source.
    let mut evaluations: Vec<Evaluation> = sources
        .into_iter()
        .map(|source| {
            let dimensions = dimensions::score_all_at(&source, tables, now);
            let (composite_score, level) = aggregate::classify(&dimensions, &tables.weights);
            Evaluation {
                provenance: provenance::track(&source),
                citation_key: provenance::citation_key(&source),
                source,
                dimensions,
                composite_score,
                level,
            }
        })
        .collect();

    // 2) Batch stages: clustering + corroboration (updates composites).
    let cross_validation = crossval::cross_validate(&mut evaluations, tables);

    // 3) Corpus rollup.
    let aggregate_metrics = aggregate::rollup(&evaluations);

    info!(
        total = evaluations.len(),
        corroborated_groups = cross_validation.cross_reference_count,
        average_composite = aggregate_metrics.average_composite,
        "credibility: evaluation finished"
    );

    let total_sources = evaluations.len();
    EvaluationReport {
        sources: evaluations,
        cross_validation,
        aggregate_metrics,
        metadata: ReportMetadata::new(now.to_rfc3339(), total_sources),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::CredibilityLevel;
    use crate::source::{Source, SourceKind};

    fn batch() -> SourceBatch {
        SourceBatch {
            query: "gpt-5".into(),
            web: vec![
                Source::new(SourceKind::Web, "OpenAI releases GPT-5 model", "https://example.com/a"),
                Source::new(SourceKind::Web, "Gardening in winter", "https://example.blogspot.com"),
            ],
            papers: vec![Source::new(
                SourceKind::Paper,
                "GPT-5 model released by OpenAI",
                "https://arxiv.org/abs/2501.0001",
            )
            .with_authors("Researcher, Ada")
            .with_snippet("A peer-reviewed study with data.")],
            news: vec![],
        }
    }

    #[test]
    fn full_pipeline_produces_complete_report() {
        let tables = HeuristicTables::default_tables();
        let report = evaluate_with_tables(&batch(), &tables);

        assert_eq!(report.sources.len(), 3);
        assert_eq!(report.metadata.total_sources, 3);
        assert_eq!(report.metadata.dimensions.len(), 5);
        assert_eq!(report.aggregate_metrics.total_sources, 3);

        // Web[0] and the paper share the title topic; the gardening post
        // stays alone.
        assert_eq!(report.cross_validation.cross_reference_count, 1);
        assert_eq!(report.cross_validation.corroborations[0].count, 2);

        for e in &report.sources {
            assert!((0.0..=1.0).contains(&e.composite_score));
            assert_eq!(e.level, CredibilityLevel::from_score(e.composite_score));
            assert!(!e.citation_key.is_empty());
        }
    }

    #[test]
    fn empty_batch_yields_neutral_report() {
        let tables = HeuristicTables::default_tables();
        let report = evaluate_with_tables(&SourceBatch::default(), &tables);
        assert!(report.sources.is_empty());
        assert_eq!(report.aggregate_metrics.total_sources, 0);
        assert!((report.aggregate_metrics.average_composite - 0.5).abs() < 1e-6);
        assert!(report.cross_validation.corroborations.is_empty());
        assert_eq!(report.metadata.total_sources, 0);
    }

    #[test]
    fn single_kind_batch_is_not_special_cased() {
        let tables = HeuristicTables::default_tables();
        let only_news = SourceBatch {
            query: "q".into(),
            news: vec![Source::new(SourceKind::News, "Just one story", "https://bbc.com/x")],
            ..Default::default()
        };
        let report = evaluate_with_tables(&only_news, &tables);
        assert_eq!(report.sources.len(), 1);
        // Uncorroborated singleton.
        assert!((report.sources[0].dimensions.corroboration - 0.3).abs() < 1e-6);
    }

    #[test]
    fn evaluator_handle_runs_pipeline() {
        let evaluator = CredibilityEvaluator::with_default_tables();
        let report = evaluator.evaluate(&batch());
        assert_eq!(report.sources.len(), 3);
    }
}
