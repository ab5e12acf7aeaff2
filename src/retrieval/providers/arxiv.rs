// src/retrieval/providers/arxiv.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::retrieval::types::SearchProvider;
use crate::source::{Source, SourceKind};

const ARXIV_ENDPOINT: &str = "http://export.arxiv.org/api/query";

/* Atom feed shape (namespaced elements deserialize by local name). */

#[derive(Debug, Deserialize)]
pub struct Feed {
    #[serde(rename = "entry", default)]
    pub entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub published: Option<String>,
    #[serde(rename = "author", default)]
    pub authors: Vec<Author>,
}

#[derive(Debug, Deserialize)]
pub struct Author {
    pub name: Option<String>,
}

/// arXiv Atom API provider for the papers stream.
pub struct ArxivProvider {
    http: reqwest::Client,
}

impl ArxivProvider {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent("source-credibility-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        Self { http }
    }
}

impl Default for ArxivProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an Atom feed into paper sources. Entries without a title are
/// dropped; multi-author lists join with ", ".
pub fn parse_atom(xml: &str, max_results: usize) -> Result<Vec<Source>> {
    let feed: Feed = from_str(xml).context("parsing arxiv atom xml")?;
    let mut out = Vec::with_capacity(feed.entries.len().min(max_results));

    for entry in feed.entries.into_iter().take(max_results) {
        let Some(title) = entry.title.filter(|t| !t.trim().is_empty()) else {
            continue;
        };
        let mut s = Source::new(SourceKind::Paper, title.trim(), entry.id.unwrap_or_default());
        s.snippet = entry.summary.map(|x| x.trim().to_string()).unwrap_or_default();
        s.published_date = entry.published.filter(|d| !d.is_empty());
        let authors: Vec<String> = entry.authors.into_iter().filter_map(|a| a.name).collect();
        if !authors.is_empty() {
            s.authors = Some(authors.join(", "));
        }
        out.push(s);
    }

    Ok(out)
}

#[async_trait]
impl SearchProvider for ArxivProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Source>> {
        let t0 = std::time::Instant::now();

        let resp = self
            .http
            .get(ARXIV_ENDPOINT)
            .query(&[
                ("search_query", format!("all:{query}")),
                ("max_results", max_results.to_string()),
            ])
            .send()
            .await
            .context("arxiv request")?
            .error_for_status()
            .context("arxiv status")?;

        let xml = resp.text().await.context("arxiv response body")?;
        let out = parse_atom(&xml, max_results)?;

        histogram!("retrieval_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "arxiv"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Paper
    }
}
