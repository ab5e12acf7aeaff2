// src/assess.rs
//! Credibility strategies: a quick additive heuristic (optionally blended
//! with a model-derived score) and the multi-dimensional pipeline, behind
//! one output shape so callers can swap them freely.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::ai_adapter::DynScoreClient;
use crate::evaluation::CredibilityLevel;
use crate::evaluator::CredibilityEvaluator;
use crate::source::{Source, SourceBatch, SourceKind};

/// Heuristic/model blend for the quick strategy.
const HEURISTIC_WEIGHT: f32 = 0.4;
const MODEL_WEIGHT: f32 = 0.6;

/// Additive URL adjustments for the quick heuristic. Checked in order,
/// first match applies.
const QUICK_ACADEMIC: [&str; 5] = [".edu", ".ac.", "arxiv.org", "pubmed", "scholar"];
const QUICK_REPUTABLE: [&str; 5] = [".gov", "reuters", "bbc", "ap.org", "npr.org"];
const QUICK_BLOGS: [&str; 3] = [".blogspot", ".wordpress", "medium.com"];
const QUICK_SOCIAL: [&str; 3] = ["twitter.com", "facebook.com", "reddit.com"];

/// Per-source result shared by both strategies: score, level, and a
/// per-factor breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceAssessment {
    pub source: Source,
    pub score: f32,
    pub level: CredibilityLevel,
    pub factors: BTreeMap<String, f32>,
    pub reasoning: String,
}

/// Alternative credibility strategies share this surface.
#[async_trait]
pub trait CredibilityStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    async fn assess(&self, batch: &SourceBatch) -> Vec<SourceAssessment>;
}

/* ----------------------------
Quick strategy (heuristic ⊕ model)
---------------------------- */

/// Single-score heuristic, blended 0.4/0.6 with a model-derived score when
/// one is available. Model failures degrade to heuristic-only.
pub struct QuickStrategy {
    model: DynScoreClient,
}

impl QuickStrategy {
    pub fn new(model: DynScoreClient) -> Self {
        Self { model }
    }

    pub fn heuristic_only() -> Self {
        Self {
            model: std::sync::Arc::new(crate::ai_adapter::DisabledClient),
        }
    }

    async fn assess_one(&self, source: &Source) -> SourceAssessment {
        let heuristic = heuristic_score(source);

        let model_score = if self.model.provider_name() == "disabled" {
            None
        } else {
            let info = source_info(source);
            let got = self.model.score(&info).await;
            if got.is_none() {
                warn!(title = %source.title, "model score unavailable, using heuristic only");
            }
            got
        };

        let mut factors = BTreeMap::new();
        factors.insert("heuristic".to_string(), heuristic);

        let score = match model_score {
            Some(m) => {
                factors.insert("model".to_string(), m);
                round2(heuristic * HEURISTIC_WEIGHT + m * MODEL_WEIGHT)
            }
            None => round2(heuristic),
        };

        SourceAssessment {
            source: source.clone(),
            score,
            level: CredibilityLevel::from_score(score),
            factors,
            reasoning: reasoning(source, score),
        }
    }
}

#[async_trait]
impl CredibilityStrategy for QuickStrategy {
    fn name(&self) -> &'static str {
        "quick"
    }

    async fn assess(&self, batch: &SourceBatch) -> Vec<SourceAssessment> {
        let mut out = Vec::with_capacity(batch.total());
        for source in batch.flatten() {
            out.push(self.assess_one(&source).await);
        }
        out
    }
}

/// Additive heuristic: URL tier, source kind, title quality, authors.
pub fn heuristic_score(source: &Source) -> f32 {
    let mut score = 0.5f32;
    let url = source.url.to_lowercase();

    if !url.is_empty() {
        if QUICK_ACADEMIC.iter().any(|d| url.contains(d)) {
            score += 0.3;
        } else if QUICK_REPUTABLE.iter().any(|d| url.contains(d)) {
            score += 0.2;
        } else if QUICK_BLOGS.iter().any(|d| url.contains(d)) {
            score -= 0.1;
        } else if QUICK_SOCIAL.iter().any(|d| url.contains(d)) {
            score -= 0.2;
        }
    }

    match source.kind {
        SourceKind::Paper => score += 0.2,
        SourceKind::News => score += 0.1,
        SourceKind::Web => {}
    }

    if source.title.len() > 10 {
        score += 0.05;
    }
    if source.authors.as_deref().is_some_and(|a| !a.is_empty()) {
        score += 0.1;
    }

    score.clamp(0.0, 1.0)
}

/// Compact source description sent to the model.
fn source_info(source: &Source) -> String {
    let mut info = format!(
        "Source Type: {}\nTitle: {}\nURL: {}\n",
        source.kind.as_str(),
        source.title,
        if source.url.is_empty() { "N/A" } else { &source.url },
    );
    if let Some(authors) = source.authors.as_deref() {
        info.push_str(&format!("Authors: {authors}\n"));
    }
    if !source.snippet.is_empty() {
        let snippet: String = source.snippet.chars().take(500).collect();
        info.push_str(&format!("Content: {snippet}\n"));
    }
    info
}

/// Human-readable justification, mirrored on the URL/type/score signals.
fn reasoning(source: &Source, score: f32) -> String {
    let url = source.url.to_lowercase();
    let mut parts: Vec<&str> = Vec::new();

    if !url.is_empty() {
        if url.contains(".edu") || url.contains(".ac.") {
            parts.push("Academic domain (.edu/.ac)");
        } else if url.contains(".gov") {
            parts.push("Government domain (.gov)");
        } else if url.contains("arxiv.org") || url.contains("pubmed") || url.contains("scholar") {
            parts.push("Academic database");
        } else if url.contains("reuters") || url.contains("bbc") || url.contains("ap.org") {
            parts.push("Reputable news source");
        } else if QUICK_BLOGS.iter().any(|d| url.contains(d)) {
            parts.push("Blog/self-published content");
        }
    }

    match source.kind {
        SourceKind::Paper => parts.push("Peer-reviewed research paper"),
        SourceKind::News => parts.push("News article"),
        SourceKind::Web => parts.push("Web article"),
    }

    if score >= 0.8 {
        parts.push("High credibility indicators");
    } else if score >= 0.6 {
        parts.push("Moderate credibility");
    } else if score < 0.4 {
        parts.push("Low credibility indicators");
    }

    parts.join("; ")
}

fn round2(x: f32) -> f32 {
    (x * 100.0).round() / 100.0
}

/* ----------------------------
Multi-dimensional strategy
---------------------------- */

/// Wraps the full pipeline; factors are the five dimensions.
pub struct MultiDimensionalStrategy {
    evaluator: CredibilityEvaluator,
}

impl MultiDimensionalStrategy {
    pub fn new(evaluator: CredibilityEvaluator) -> Self {
        Self { evaluator }
    }
}

#[async_trait]
impl CredibilityStrategy for MultiDimensionalStrategy {
    fn name(&self) -> &'static str {
        "multi_dimensional"
    }

    async fn assess(&self, batch: &SourceBatch) -> Vec<SourceAssessment> {
        let report = self.evaluator.evaluate(batch);
        report
            .sources
            .into_iter()
            .map(|e| {
                let mut factors = BTreeMap::new();
                factors.insert("authority".to_string(), e.dimensions.authority);
                factors.insert("recency".to_string(), e.dimensions.recency);
                factors.insert("corroboration".to_string(), e.dimensions.corroboration);
                factors.insert("bias".to_string(), e.dimensions.bias);
                factors.insert("methodology".to_string(), e.dimensions.methodology);
                SourceAssessment {
                    source: e.source,
                    score: e.composite_score,
                    level: e.level,
                    factors,
                    reasoning: format!(
                        "Composite of 5 dimensions; corroboration {:.2}",
                        e.dimensions.corroboration
                    ),
                }
            })
            .collect()
    }
}
