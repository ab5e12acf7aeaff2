// src/retrieval/providers/tavily.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::retrieval::types::SearchProvider;
use crate::source::{Source, SourceKind};

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";
pub const ENV_TAVILY_API_KEY: &str = "TAVILY_API_KEY";

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// Tavily calls the parsed snippet "content".
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub published_date: Option<String>,
}

/// Tavily search provider, used in two modes: general web search and a
/// news-suffixed search (the upstream API has no hard news filter).
pub struct TavilyProvider {
    http: reqwest::Client,
    api_key: String,
    kind: SourceKind,
}

impl TavilyProvider {
    fn new(api_key: String, kind: SourceKind) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("source-credibility-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            kind,
        }
    }

    pub fn web(api_key: String) -> Self {
        Self::new(api_key, SourceKind::Web)
    }

    pub fn news(api_key: String) -> Self {
        Self::new(api_key, SourceKind::News)
    }

    /// Build from `TAVILY_API_KEY`; `None` when the key is not configured.
    pub fn web_from_env() -> Option<Self> {
        std::env::var(ENV_TAVILY_API_KEY).ok().map(Self::web)
    }

    pub fn news_from_env() -> Option<Self> {
        std::env::var(ENV_TAVILY_API_KEY).ok().map(Self::news)
    }

    fn effective_query(&self, query: &str) -> String {
        match self.kind {
            SourceKind::News => format!("{query} news"),
            _ => format!("{query} recent"),
        }
    }
}

/// Parse a Tavily response body into sources. The AI-generated answer (when
/// present) becomes a leading pseudo-source with no URL, like the rest of
/// the result list it is scored on its own merits downstream.
pub fn parse_response(resp: SearchResponse, kind: SourceKind, max_results: usize) -> Vec<Source> {
    let mut out = Vec::with_capacity(max_results + 1);

    if let Some(answer) = resp.answer.filter(|a| !a.is_empty()) {
        let mut pseudo = Source::new(kind, "AI-Generated Answer", "");
        pseudo.snippet = answer;
        out.push(pseudo);
    }

    for r in resp.results.into_iter().take(max_results) {
        let mut s = Source::new(kind, r.title, r.url);
        s.snippet = r.content;
        s.published_date = r.published_date.filter(|d| !d.is_empty());
        out.push(s);
    }

    out
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Source>> {
        let t0 = std::time::Instant::now();
        let q = self.effective_query(query);

        let req = SearchRequest {
            api_key: &self.api_key,
            query: &q,
            max_results,
            search_depth: "advanced",
            include_answer: true,
            include_raw_content: false,
        };

        let resp = self
            .http
            .post(TAVILY_ENDPOINT)
            .json(&req)
            .send()
            .await
            .context("tavily request")?
            .error_for_status()
            .context("tavily status")?;

        let body: SearchResponse = resp.json().await.context("tavily response body")?;
        let out = parse_response(body, self.kind, max_results);

        histogram!("retrieval_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        match self.kind {
            SourceKind::News => "tavily-news",
            _ => "tavily-web",
        }
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }
}
