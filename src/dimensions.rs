// src/dimensions.rs
//! The five credibility dimensions and their scorers.
//!
//! Every scorer is a total function `&Source -> [0,1]`: malformed input
//! degrades to the documented neutral value for that dimension only and
//! never aborts the evaluation. Scorers are independent of other sources
//! and safe to run concurrently.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::heuristics::HeuristicTables;
use crate::source::{Source, SourceKind};

/// Placeholder until cross-validation assigns the real corroboration score.
pub const NEUTRAL_CORROBORATION: f32 = 0.5;

/// Names in the fixed order used by report metadata and rollups.
pub const DIMENSION_NAMES: [&str; 5] =
    ["authority", "recency", "corroboration", "bias", "methodology"];

/// Exactly five named values in [0,1]. `corroboration` is the only one
/// mutated after initial scoring (by the cross-validator).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub authority: f32,
    pub recency: f32,
    pub corroboration: f32,
    pub bias: f32,
    pub methodology: f32,
}

impl DimensionScores {
    pub fn get(&self, name: &str) -> Option<f32> {
        match name {
            "authority" => Some(self.authority),
            "recency" => Some(self.recency),
            "corroboration" => Some(self.corroboration),
            "bias" => Some(self.bias),
            "methodology" => Some(self.methodology),
            _ => None,
        }
    }
}

/// Score all five dimensions for one source.
pub fn score_all(source: &Source, tables: &HeuristicTables) -> DimensionScores {
    score_all_at(source, tables, Utc::now())
}

/// Like [`score_all`] with an injectable "now" for deterministic tests.
pub fn score_all_at(source: &Source, tables: &HeuristicTables, now: DateTime<Utc>) -> DimensionScores {
    DimensionScores {
        authority: score_authority(source, tables),
        recency: score_recency_at(source, tables, now),
        corroboration: NEUTRAL_CORROBORATION,
        bias: score_bias(source, tables),
        methodology: score_methodology(source, tables),
    }
}

/// Domain-tier authority with an author-credential bonus.
/// Tiers are checked in table order; the first domain match wins, so an
/// `.edu` URL that also looks like a blog still scores as academic.
pub fn score_authority(source: &Source, tables: &HeuristicTables) -> f32 {
    let t = &tables.authority;
    let url = source.url.to_lowercase();

    let mut score = t.base;
    if !url.is_empty() {
        for tier in &t.tiers {
            if tier.domains.iter().any(|d| url.contains(d.as_str())) {
                score = tier.score;
                break;
            }
        }
    }

    if source.authors.as_deref().is_some_and(|a| a.len() > 5) {
        score = (score + t.author_bonus).min(1.0);
    }

    round3(score)
}

/// Bucketed age score. Absent or unparseable dates are neutral, never an
/// error.
pub fn score_recency_at(source: &Source, tables: &HeuristicTables, now: DateTime<Utc>) -> f32 {
    let t = &tables.recency;

    let raw = match source.published_date.as_deref() {
        Some(s) if !s.trim().is_empty() => s.trim(),
        _ => return t.unknown,
    };

    let Some(date) = parse_date(raw) else {
        tracing::debug!(date = raw, "unparseable publish date, scoring neutral");
        return t.unknown;
    };

    let age_days = (now - date).num_days();
    for bucket in &t.buckets {
        if age_days < bucket.max_days {
            return bucket.score;
        }
    }
    t.fallback
}

/// Neutrality score (higher = more neutral). The neutral-domain check runs
/// after the paper-kind check, so paper + reuters ends at the domain score.
pub fn score_bias(source: &Source, tables: &HeuristicTables) -> f32 {
    let t = &tables.bias;
    let url = source.url.to_lowercase();
    let title = source.title.to_lowercase();

    let mut score = t.base;

    if source.kind == SourceKind::Paper {
        score = t.paper_base;
    }
    if t.neutral_domains.iter().any(|d| url.contains(d.as_str())) {
        score = t.neutral_score;
    }
    if t.sensational.iter().any(|kw| title.contains(kw.as_str())) {
        score -= t.sensational_penalty;
    }

    round3(score.clamp(0.0, 1.0))
}

/// Evidence-quality score from source kind, citations, and snippet keywords.
pub fn score_methodology(source: &Source, tables: &HeuristicTables) -> f32 {
    let t = &tables.methodology;
    let content = source.snippet.to_lowercase();

    let mut score = t.base;

    if source.kind == SourceKind::Paper {
        score = t.paper_base;
        if source.citations.as_deref().is_some_and(|c| !c.is_empty()) {
            score = (score + t.citation_bonus).min(1.0);
        }
    }

    if t.evidence.iter().any(|kw| content.contains(kw.as_str())) {
        score += t.evidence_bonus;
    }
    if t.hedging.iter().any(|kw| content.contains(kw.as_str())) {
        score -= t.hedging_penalty;
    }

    round3(score.clamp(0.0, 1.0))
}

/// Best-effort ISO8601 parsing: full RFC3339 first, then date-only and
/// offset-less datetime forms that search APIs commonly emit.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw.replace("Z", "+00:00")) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

pub(crate) fn round3(x: f32) -> f32 {
    (x * 1000.0).round() / 1000.0
}
