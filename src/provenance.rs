// src/provenance.rs
//! Provenance tracking: stable citation keys and retrieval-metadata
//! snapshots used for grouping and display.

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::source::Source;

static RE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("word regex"));
static RE_DOMAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://([^/]+)").expect("domain regex"));

/// Retrieval metadata snapshot attached to every evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub url: String,
    pub title: String,
    pub source_type: String,
    pub retrieved_at: String,
    pub authors: String,
    pub publisher: String,
    pub access_method: String,
    /// Short stable id derived from url+title; survives re-retrieval of the
    /// same item and is safe to log.
    pub record_id: String,
}

/// Build the provenance record for one source.
pub fn track(source: &Source) -> Provenance {
    Provenance {
        url: source.url.clone(),
        title: source.title.clone(),
        source_type: source.kind.as_str().to_string(),
        retrieved_at: Utc::now().to_rfc3339(),
        authors: source.authors.clone().unwrap_or_default(),
        publisher: extract_publisher(&source.url),
        access_method: "direct_fetch".to_string(),
        record_id: record_id(source),
    }
}

/// Citation key: first author word + year, else first significant title
/// word + year, else a generic fallback. Words are capped at 10 chars.
pub fn citation_key(source: &Source) -> String {
    let year = Utc::now().year();

    if let Some(authors) = source.authors.as_deref() {
        if let Some(m) = RE_WORD.find(authors) {
            let key: String = m.as_str().chars().take(10).collect();
            if !key.is_empty() {
                return format!("{key}{year}");
            }
        }
    }

    let title_key = RE_WORD
        .find_iter(&source.title)
        .map(|m| m.as_str())
        .find(|w| w.len() > 3)
        .map(|w| w.chars().take(10).collect::<String>())
        .unwrap_or_else(|| "Source".to_string());

    format!("{title_key}{year}")
}

/// Extract the publisher domain from a URL, stripping any `www.` prefix.
pub fn extract_publisher(url: &str) -> String {
    if url.is_empty() {
        return "Unknown".to_string();
    }
    match RE_DOMAIN.captures(url) {
        Some(caps) => {
            let domain = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            domain.strip_prefix("www.").unwrap_or(domain).to_string()
        }
        None => "Unknown".to_string(),
    }
}

/// 12-hex-char identity over url+title. Good enough for grouping and logs;
/// not a cryptographic commitment.
pub fn record_id(source: &Source) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(source.url.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(source.title.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
