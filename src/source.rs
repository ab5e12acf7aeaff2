// src/source.rs
//! Retrieved-source data model shared by the retrieval collaborator and the
//! credibility core. Sources are immutable once retrieved; the core only
//! attaches derived data, never rewrites the content fields.

use serde::{Deserialize, Serialize};

/// Where a source came from. Papers get different prior treatment in the
/// bias and methodology scorers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Web,
    Paper,
    News,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Web => "web",
            SourceKind::Paper => "paper",
            SourceKind::News => "news",
        }
    }
}

/// One retrieved item (web page, paper, news article).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    /// May be empty (e.g. synthesized answers from a search API).
    #[serde(default)]
    pub url: String,
    /// Snippet for web/news, abstract/summary for papers.
    #[serde(default, alias = "summary")]
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    /// ISO8601 when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    /// Citation metadata when the provider reports it (papers only so far).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<String>,
    pub kind: SourceKind,
}

impl Source {
    /// Minimal constructor used by providers and tests.
    pub fn new(kind: SourceKind, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: String::new(),
            authors: None,
            published_date: None,
            citations: None,
            kind,
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    pub fn with_authors(mut self, authors: impl Into<String>) -> Self {
        self.authors = Some(authors.into());
        self
    }

    pub fn with_published_date(mut self, date: impl Into<String>) -> Self {
        self.published_date = Some(date.into());
        self
    }
}

/// What the retrieval collaborator hands the core: per-kind ordered lists.
/// Any list may be empty; the core must not special-case partial input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceBatch {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub web: Vec<Source>,
    #[serde(default)]
    pub papers: Vec<Source>,
    #[serde(default)]
    pub news: Vec<Source>,
}

impl SourceBatch {
    pub fn total(&self) -> usize {
        self.web.len() + self.papers.len() + self.news.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Flatten into one ordered list (web, papers, news) — this order is the
    /// retrieval order the clusterer depends on.
    pub fn flatten(&self) -> Vec<Source> {
        let mut out = Vec::with_capacity(self.total());
        out.extend(self.web.iter().cloned());
        out.extend(self.papers.iter().cloned());
        out.extend(self.news.iter().cloned());
        out
    }
}
