// src/retrieval/mod.rs
//! Retrieval collaborator: thin wrappers over the search APIs, fanned out
//! concurrently per source kind with independent failure handling. The
//! credibility core tolerates whatever subset survives.

pub mod providers;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::retrieval::types::SearchProvider;
use crate::source::{Source, SourceBatch};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "retrieval_sources_total",
            "Sources returned by providers, after normalization."
        );
        describe_counter!(
            "retrieval_provider_errors_total",
            "Provider search/parse errors."
        );
        describe_counter!(
            "retrieval_fallback_total",
            "Times a lower-priority provider was tried after a failure."
        );
        describe_histogram!("retrieval_parse_ms", "Provider parse time in milliseconds.");
        describe_gauge!(
            "retrieval_last_run_ts",
            "Unix ts when retrieval last completed."
        );
    });
}

/// Normalize a snippet: decode HTML entities, strip tags, collapse
/// whitespace, cap length.
pub fn normalize_snippet(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }
    out
}

/// Multi-kind retriever with a prioritized fallback chain per kind.
pub struct Retriever {
    web: Vec<Box<dyn SearchProvider>>,
    papers: Vec<Box<dyn SearchProvider>>,
    news: Vec<Box<dyn SearchProvider>>,
    max_results: usize,
}

impl Retriever {
    pub fn new(
        web: Vec<Box<dyn SearchProvider>>,
        papers: Vec<Box<dyn SearchProvider>>,
        news: Vec<Box<dyn SearchProvider>>,
        max_results: usize,
    ) -> Self {
        Self {
            web,
            papers,
            news,
            max_results,
        }
    }

    /// Wire up the default provider set from the environment. Kinds whose
    /// keys are missing simply get an empty chain.
    pub fn from_env(max_results: usize) -> Self {
        use providers::{ArxivProvider, TavilyProvider};

        let mut web: Vec<Box<dyn SearchProvider>> = Vec::new();
        if let Some(p) = TavilyProvider::web_from_env() {
            web.push(Box::new(p));
        } else {
            warn!("TAVILY_API_KEY not set; web search will be empty");
        }

        let papers: Vec<Box<dyn SearchProvider>> = vec![Box::new(ArxivProvider::new())];

        let mut news: Vec<Box<dyn SearchProvider>> = Vec::new();
        if let Some(p) = TavilyProvider::news_from_env() {
            news.push(Box::new(p));
        }

        Self::new(web, papers, news, max_results)
    }

    /// Retrieve all kinds concurrently. A failing stream yields an empty
    /// list for its kind and must not block or corrupt the others.
    pub async fn retrieve(&self, query: &str) -> SourceBatch {
        ensure_metrics_described();
        info!(query, "retriever: searching");

        let (web, papers, news) = tokio::join!(
            search_first_ok(&self.web, query, self.max_results),
            search_first_ok(&self.papers, query, self.max_results),
            search_first_ok(&self.news, query, self.max_results),
        );

        let batch = SourceBatch {
            query: query.to_string(),
            web: normalize_all(web),
            papers: normalize_all(papers),
            news: normalize_all(news),
        };

        counter!("retrieval_sources_total").increment(batch.total() as u64);
        gauge!("retrieval_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
        info!(
            web = batch.web.len(),
            papers = batch.papers.len(),
            news = batch.news.len(),
            "retriever: done"
        );

        batch
    }
}

/// Try providers in priority order; first success wins. Every failure is
/// logged and swallowed. All failing (or no providers) yields an empty list.
pub async fn search_first_ok(
    providers: &[Box<dyn SearchProvider>],
    query: &str,
    max_results: usize,
) -> Vec<Source> {
    for (i, p) in providers.iter().enumerate() {
        if i > 0 {
            counter!("retrieval_fallback_total").increment(1);
        }
        match p.search(query, max_results).await {
            Ok(sources) => return sources,
            Err(e) => {
                warn!(error = ?e, provider = p.name(), "provider error");
                counter!("retrieval_provider_errors_total").increment(1);
            }
        }
    }
    Vec::new()
}

fn normalize_all(mut sources: Vec<Source>) -> Vec<Source> {
    for s in &mut sources {
        s.snippet = normalize_snippet(&s.snippet);
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceKind;
    use anyhow::Result;

    struct FixedProvider {
        kind: SourceKind,
        titles: Vec<&'static str>,
    }

    #[async_trait::async_trait]
    impl SearchProvider for FixedProvider {
        async fn search(&self, _query: &str, _max: usize) -> Result<Vec<Source>> {
            Ok(self
                .titles
                .iter()
                .map(|t| Source::new(self.kind, *t, "https://example.com"))
                .collect())
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn kind(&self) -> SourceKind {
            self.kind
        }
    }

    struct FailingProvider;

    #[async_trait::async_trait]
    impl SearchProvider for FailingProvider {
        async fn search(&self, _query: &str, _max: usize) -> Result<Vec<Source>> {
            anyhow::bail!("upstream 500")
        }
        fn name(&self) -> &'static str {
            "failing"
        }
        fn kind(&self) -> SourceKind {
            SourceKind::Web
        }
    }

    #[test]
    fn normalize_snippet_strips_html_and_collapses() {
        let s = "  Hello,&nbsp;<b>world</b>\n\n twice  ";
        assert_eq!(normalize_snippet(s), "Hello, world twice");
    }

    #[test]
    fn normalize_snippet_caps_length() {
        let long = "x".repeat(4000);
        assert_eq!(normalize_snippet(&long).chars().count(), 1500);
    }

    #[tokio::test]
    async fn fallback_chain_first_success_wins() {
        let chain: Vec<Box<dyn SearchProvider>> = vec![
            Box::new(FailingProvider),
            Box::new(FixedProvider {
                kind: SourceKind::Web,
                titles: vec!["from secondary"],
            }),
        ];
        let out = search_first_ok(&chain, "q", 5).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "from secondary");
    }

    #[tokio::test]
    async fn all_providers_failing_yields_empty() {
        let chain: Vec<Box<dyn SearchProvider>> =
            vec![Box::new(FailingProvider), Box::new(FailingProvider)];
        assert!(search_first_ok(&chain, "q", 5).await.is_empty());
    }

    #[tokio::test]
    async fn one_failed_stream_does_not_block_others() {
        let retriever = Retriever::new(
            vec![Box::new(FailingProvider)],
            vec![Box::new(FixedProvider {
                kind: SourceKind::Paper,
                titles: vec!["paper one", "paper two"],
            })],
            vec![],
            5,
        );
        let batch = retriever.retrieve("q").await;
        assert!(batch.web.is_empty());
        assert_eq!(batch.papers.len(), 2);
        assert!(batch.news.is_empty());
        assert_eq!(batch.query, "q");
    }
}
