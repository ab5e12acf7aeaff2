// src/retrieval/types.rs
use anyhow::Result;

use crate::source::{Source, SourceKind};

/// One upstream search backend (web, paper, or news API).
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Source>>;
    fn name(&self) -> &'static str;
    fn kind(&self) -> SourceKind;
}
