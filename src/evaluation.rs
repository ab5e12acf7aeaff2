// src/evaluation.rs
//! Output shapes for one evaluation run: per-source evaluations, the
//! cross-validation summary, corpus rollup, and run metadata. This is the
//! result object the reporting collaborator consumes.

use serde::{Deserialize, Serialize};

use crate::dimensions::{DimensionScores, DIMENSION_NAMES};
use crate::provenance::Provenance;
use crate::source::Source;

/// Four-way credibility classification by composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredibilityLevel {
    High,
    Medium,
    Low,
    #[serde(rename = "Very Low")]
    VeryLow,
}

impl CredibilityLevel {
    /// High ≥0.8, Medium ≥0.6, Low ≥0.4, else Very Low.
    pub fn from_score(score: f32) -> Self {
        if score >= 0.8 {
            CredibilityLevel::High
        } else if score >= 0.6 {
            CredibilityLevel::Medium
        } else if score >= 0.4 {
            CredibilityLevel::Low
        } else {
            CredibilityLevel::VeryLow
        }
    }

    /// Low and Very Low share one bucket in corpus counts.
    pub fn is_low_bucket(&self) -> bool {
        matches!(self, CredibilityLevel::Low | CredibilityLevel::VeryLow)
    }
}

/// One source with its derived credibility data. Created once per
/// evaluation pass and discarded on the next query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub source: Source,
    pub dimensions: DimensionScores,
    pub composite_score: f32,
    pub level: CredibilityLevel,
    pub provenance: Provenance,
    pub citation_key: String,
}

/// Sources that appear to discuss the same topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corroboration {
    /// Citation keys of the cluster members.
    pub sources: Vec<String>,
    pub count: usize,
    /// Representative label: truncated title of the first member.
    pub topic: String,
}

/// Cross-validation summary. `contradictions` is a declared placeholder:
/// always present, currently always empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValidation {
    pub corroborations: Vec<Corroboration>,
    pub contradictions: Vec<serde_json::Value>,
    pub cross_reference_count: usize,
}

/// Per-dimension arithmetic means across the corpus.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DimensionAverages {
    pub authority: f32,
    pub recency: f32,
    pub corroboration: f32,
    pub bias: f32,
    pub methodology: f32,
}

/// Corpus-wide rollup, recomputed fully each run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub average_composite: f32,
    pub dimension_averages: DimensionAverages,
    pub high_credibility_count: usize,
    pub medium_credibility_count: usize,
    /// Low and Very Low merged.
    pub low_credibility_count: usize,
    pub total_sources: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub evaluation_timestamp: String,
    pub total_sources: usize,
    pub dimensions: Vec<String>,
}

impl ReportMetadata {
    pub fn new(timestamp: String, total_sources: usize) -> Self {
        Self {
            evaluation_timestamp: timestamp,
            total_sources,
            dimensions: DIMENSION_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Everything one evaluation run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub sources: Vec<Evaluation>,
    pub cross_validation: CrossValidation,
    pub aggregate_metrics: AggregateMetrics,
    pub metadata: ReportMetadata,
}
