// src/heuristics.rs
//! Heuristic tables for the dimension scorers: domain tiers, keyword lists,
//! recency buckets, clustering threshold, and composite weights.
//!
//! - Embedded defaults (`config/credibility.toml`) compiled into the binary.
//! - Optional file override via `CREDIBILITY_CONFIG_PATH`.
//! - Mtime-based hot reload for the long-running service.
//!
//! The tables are data, not code: tests substitute their own TOML without
//! touching scoring logic.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{
    fs,
    path::PathBuf,
    sync::{Arc, RwLock},
    time::SystemTime,
};

pub const DEFAULT_TABLES_PATH: &str = "config/credibility.toml";
pub const ENV_TABLES_PATH: &str = "CREDIBILITY_CONFIG_PATH";

const EMBEDDED_TOML: &str = include_str!("../config/credibility.toml");

static DEFAULT_TABLES: Lazy<HeuristicTables> =
    Lazy::new(|| HeuristicTables::from_toml_str(EMBEDDED_TOML).expect("valid embedded tables"));

/* ----------------------------
Schema (from TOML)
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
pub struct HeuristicTables {
    pub version: u32,
    pub authority: AuthorityTable,
    pub recency: RecencyTable,
    pub bias: BiasTable,
    pub methodology: MethodologyTable,
    pub clustering: ClusteringTable,
    pub weights: CompositeWeights,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorityTable {
    pub base: f32,
    pub author_bonus: f32,
    /// Ordered: first domain match wins.
    pub tiers: Vec<AuthorityTier>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorityTier {
    pub id: String,
    pub score: f32,
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecencyTable {
    /// Score when the publish date is absent or unparseable.
    pub unknown: f32,
    /// Score for anything older than the last bucket.
    pub fallback: f32,
    /// Ordered by `max_days` ascending; first bucket with age < max_days wins.
    pub buckets: Vec<RecencyBucket>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecencyBucket {
    pub max_days: i64,
    pub score: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BiasTable {
    pub base: f32,
    pub paper_base: f32,
    pub neutral_score: f32,
    pub neutral_domains: Vec<String>,
    pub sensational_penalty: f32,
    pub sensational: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodologyTable {
    pub base: f32,
    pub paper_base: f32,
    pub citation_bonus: f32,
    pub evidence_bonus: f32,
    pub hedging_penalty: f32,
    pub evidence: Vec<String>,
    pub hedging: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusteringTable {
    pub jaccard_threshold: f32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CompositeWeights {
    pub authority: f32,
    pub recency: f32,
    pub corroboration: f32,
    pub bias: f32,
    pub methodology: f32,
}

impl CompositeWeights {
    pub fn sum(&self) -> f32 {
        self.authority + self.recency + self.corroboration + self.bias + self.methodology
    }
}

impl HeuristicTables {
    /// Parse and validate from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let tables: HeuristicTables = toml::from_str(toml_str)?;

        let wsum = tables.weights.sum();
        if (wsum - 1.0).abs() > 1e-3 {
            anyhow::bail!("composite weights must sum to 1.0, got {wsum}");
        }
        if !tables.clustering.jaccard_threshold.is_finite() {
            anyhow::bail!("clustering threshold must be finite");
        }
        Ok(tables)
    }

    /// Load from `CREDIBILITY_CONFIG_PATH` (or the default path). A missing
    /// or unreadable file falls back to the embedded defaults; a present but
    /// invalid file is an error so bad deploys fail loudly.
    pub fn load() -> anyhow::Result<Self> {
        let path = resolve_path();
        match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content).map_err(|e| {
                anyhow::anyhow!("invalid heuristic tables at {}: {e}", path.display())
            }),
            Err(_) => Ok(Self::default_tables()),
        }
    }

    /// Embedded defaults, parsed once.
    pub fn default_tables() -> Self {
        DEFAULT_TABLES.clone()
    }
}

fn resolve_path() -> PathBuf {
    std::env::var(ENV_TABLES_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_TABLES_PATH))
}

/* ----------------------------
Thread-safe handle + hot reload
---------------------------- */

/// Shared handle; `current()` reloads when the file mtime changes.
#[derive(Clone)]
pub struct TablesHandle {
    inner: Arc<RwLock<State>>,
    path: PathBuf,
}

struct State {
    tables: Arc<HeuristicTables>,
    last_modified: Option<SystemTime>,
}

impl TablesHandle {
    pub fn new(tables: HeuristicTables) -> Self {
        Self {
            inner: Arc::new(RwLock::new(State {
                tables: Arc::new(tables),
                last_modified: None,
            })),
            path: resolve_path(),
        }
    }

    /// Get the latest tables, reloading if the config file changed.
    pub fn current(&self) -> Arc<HeuristicTables> {
        let mtime = fs::metadata(&self.path).and_then(|m| m.modified()).ok();

        {
            let guard = self.inner.read().expect("tables lock");
            if mtime.is_none() || guard.last_modified == mtime {
                return guard.tables.clone();
            }
        }

        // Slow path: reload with write lock; keep old tables on any failure.
        let mut guard = self.inner.write().expect("tables lock");
        if guard.last_modified != mtime {
            if let Ok(content) = fs::read_to_string(&self.path) {
                match HeuristicTables::from_toml_str(&content) {
                    Ok(fresh) => {
                        guard.tables = Arc::new(fresh);
                        tracing::info!(path = %self.path.display(), "reloaded heuristic tables");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "heuristic table reload failed; keeping previous");
                    }
                }
            }
            guard.last_modified = mtime;
        }
        guard.tables.clone()
    }
}
