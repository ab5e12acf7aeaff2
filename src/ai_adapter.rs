// src/ai_adapter.rs
//! Model-score adapter: provider abstraction + file cache + daily limit.
//! The blended credibility strategy asks this client for a [0,1] score; a
//! `None` means "unavailable" and the caller degrades to heuristics only.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Trait object used by strategies and handlers.
pub trait ScoreClient: Send + Sync {
    /// Ask the model for a credibility score in [0,1] for the described
    /// source. `None` on any failure, limit, or disabled state.
    fn score<'a>(
        &'a self,
        source_info: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<f32>> + Send + 'a>>;
    /// Provider name for diagnostics/headers.
    fn provider_name(&self) -> &'static str;
}

pub type DynScoreClient = Arc<dyn ScoreClient>;

/// Factory: build a client according to config and environment.
///
/// * If `AI_TEST_MODE=mock`, returns a deterministic mock client.
/// * Else if the config is disabled, returns a disabled client.
/// * Else builds the OpenRouter provider wrapped with caching + daily limit.
pub fn build_client_from_config(config: &LlmConfig) -> DynScoreClient {
    if std::env::var("AI_TEST_MODE").map(|v| v == "mock").unwrap_or(false) {
        let client = CachingClient::new(
            MockProvider { fixed: 0.7 },
            default_cache_dir(),
            config.daily_limit,
        );
        return Arc::new(client);
    }

    if !config.enabled || config.api_key.is_empty() {
        return Arc::new(DisabledClient);
    }

    let provider = OpenRouterProvider::new(config);
    let client = CachingClient::new(provider, default_cache_dir(), config.daily_limit);
    Arc::new(client)
}

// ------------------------------------------------------------
// Provider abstraction + concrete providers
// ------------------------------------------------------------

/// Low-level provider: does a *real* remote call. Separated so the caching
/// wrapper is shared between production and tests.
pub trait Provider: Send + Sync + 'static {
    fn fetch<'a>(
        &'a self,
        source_info: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<f32>> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

/// OpenRouter chat-completions provider. Uses the analyzer-stage model.
pub struct OpenRouterProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenRouterProvider {
    pub fn new(config: &LlmConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("source-credibility-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key: config.api_key.clone(),
            model: config.analyzer.model.clone(),
            temperature: config.analyzer.temperature,
        }
    }
}

const SCORE_PROMPT: &str = "You are a source credibility evaluator. Evaluate the credibility of the \
following source on a scale of 0.0 to 1.0. Consider domain reputation, source type, author \
credentials, content quality, and potential bias. Respond with ONLY a number between 0.0 and 1.0.";

impl Provider for OpenRouterProvider {
    fn fetch<'a>(
        &'a self,
        source_info: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<f32>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Msg<'a> {
                role: &'a str,
                content: &'a str,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                model: &'a str,
                messages: Vec<Msg<'a>>,
                temperature: f32,
                max_tokens: u32,
            }
            #[derive(Deserialize)]
            struct Resp {
                choices: Vec<Choice>,
            }
            #[derive(Deserialize)]
            struct Choice {
                message: ChoiceMsg,
            }
            #[derive(Deserialize)]
            struct ChoiceMsg {
                content: String,
            }

            let req = Req {
                model: &self.model,
                messages: vec![
                    Msg {
                        role: "system",
                        content: SCORE_PROMPT,
                    },
                    Msg {
                        role: "user",
                        content: source_info,
                    },
                ],
                temperature: self.temperature,
                max_tokens: 16,
            };

            let resp = self
                .http
                .post("https://openrouter.ai/api/v1/chat/completions")
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await
                .ok()?;

            if !resp.status().is_success() {
                tracing::warn!(status = %resp.status(), "model score request failed");
                return None;
            }
            let body: Resp = resp.json().await.ok()?;
            let content = body
                .choices
                .first()
                .map(|c| c.message.content.as_str())
                .unwrap_or("");
            parse_score(content)
        })
    }
    fn name(&self) -> &'static str {
        "openrouter"
    }
}

/// Returns `None` always; used when model scoring is disabled.
pub struct DisabledClient;

impl ScoreClient for DisabledClient {
    fn score<'a>(
        &'a self,
        _source_info: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<f32>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed-score provider for tests/local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: f32,
}

impl Provider for MockProvider {
    fn fetch<'a>(
        &'a self,
        _source_info: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<f32>> + Send + 'a>> {
        let out = self.fixed;
        Box::pin(async move { Some(out) })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Extract the first number from a model reply; values above 1.0 are
/// treated as a 0–10 scale and divided down, then clamped.
pub fn parse_score(reply: &str) -> Option<f32> {
    static RE_NUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.?\d*").expect("number regex"));
    let m = RE_NUM.find(reply)?;
    let raw: f32 = m.as_str().parse().ok()?;
    let normalized = if raw > 1.0 { raw / 10.0 } else { raw };
    Some(normalized.clamp(0.0, 1.0))
}

// ------------------------------------------------------------
// Caching client wrapper (file cache + daily limit)
// ------------------------------------------------------------

/// Counter state is guarded by a `Mutex` to keep it simple and safe.
pub struct CachingClient<P: Provider> {
    inner: P,
    cache_dir: PathBuf,
    daily_limit_max: u32,
    counter: Arc<Mutex<DailyCounter>>,
}

impl<P: Provider> CachingClient<P> {
    pub fn new(inner: P, cache_dir: PathBuf, daily_limit_max: u32) -> Self {
        let _ = fs::create_dir_all(&cache_dir);
        let counter = Arc::new(Mutex::new(
            load_daily_counter(&cache_dir).unwrap_or_default(),
        ));
        Self {
            inner,
            cache_dir,
            daily_limit_max,
            counter,
        }
    }

    async fn score_impl(&self, source_info: &str) -> Option<f32> {
        // 1) Daily limit: only real API calls increment; cache hits do not.
        {
            let mut g = self.counter.lock().expect("poisoned counter");
            if g.is_expired() {
                g.reset_to_today();
                let _ = save_daily_counter(&self.cache_dir, &g);
            }
            if g.count >= self.daily_limit_max {
                return None;
            }
        }

        // 2) Cache lookup.
        let key = cache_key(source_info);
        if let Some(hit) = read_cache_file(&self.cache_dir, &key) {
            return Some(hit.score);
        }

        // 3) Real call.
        let fresh = self.inner.fetch(source_info).await?;
        if !(0.0..=1.0).contains(&fresh) {
            return None;
        }
        let _ = write_cache_file(&self.cache_dir, &key, &CachedScore { score: fresh });
        let mut g = self.counter.lock().expect("poisoned counter");
        g.count = g.count.saturating_add(1);
        let _ = save_daily_counter(&self.cache_dir, &g);
        Some(fresh)
    }
}

impl<P: Provider> ScoreClient for CachingClient<P> {
    fn score<'a>(
        &'a self,
        source_info: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<f32>> + Send + 'a>> {
        Box::pin(self.score_impl(source_info))
    }
    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

// ------------------------------------------------------------
// File cache helpers
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedScore {
    score: f32,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache/model_scores")
}

fn cache_key(input: &str) -> String {
    // DefaultHasher is sufficient for cache keys; no crypto needed here.
    let mut hasher = DefaultHasher::new();
    input.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn cache_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

fn read_cache_file(dir: &Path, key: &str) -> Option<CachedScore> {
    let buf = fs::read_to_string(cache_path(dir, key)).ok()?;
    serde_json::from_str(&buf).ok()
}

fn write_cache_file(dir: &Path, key: &str, value: &CachedScore) -> io::Result<()> {
    let path = cache_path(dir, key);
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
    let mut f = fs::File::create(&tmp)?;
    f.write_all(json.as_bytes())?;
    fs::rename(tmp, path)?;
    Ok(())
}

// ------------------------------------------------------------
// Daily counter helpers
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DailyCounter {
    date: String,
    count: u32,
}
impl Default for DailyCounter {
    fn default() -> Self {
        Self {
            date: today(),
            count: 0,
        }
    }
}
impl DailyCounter {
    fn is_expired(&self) -> bool {
        self.date != today()
    }
    fn reset_to_today(&mut self) {
        self.date = today();
        self.count = 0;
    }
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

fn counter_path(dir: &Path) -> PathBuf {
    dir.join("daily_count.json")
}

fn load_daily_counter(dir: &Path) -> io::Result<DailyCounter> {
    let s = fs::read_to_string(counter_path(dir))?;
    serde_json::from_str(&s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn save_daily_counter(dir: &Path, dc: &DailyCounter) -> io::Result<()> {
    let p = counter_path(dir);
    let tmp = p.with_extension("json.tmp");
    let s = serde_json::to_string(dc).unwrap_or_else(|_| "{}".to_string());
    let mut f = fs::File::create(&tmp)?;
    f.write_all(s.as_bytes())?;
    fs::rename(tmp, p)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_tmp_dir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        dir.push(format!("model_score_cache_{}", nanos));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parse_score_variants() {
        assert!((parse_score("0.85").unwrap() - 0.85).abs() < 1e-6);
        assert!((parse_score("Score: 0.6 overall").unwrap() - 0.6).abs() < 1e-6);
        // 0-10 scale normalized down.
        assert!((parse_score("7").unwrap() - 0.7).abs() < 1e-6);
        assert!((parse_score("100").unwrap() - 1.0).abs() < 1e-6, "clamped");
        assert!(parse_score("no numbers here").is_none());
    }

    /// Counts real fetches so the cache behavior is observable.
    struct CountingProvider {
        calls: Arc<Mutex<u32>>,
    }
    impl Provider for CountingProvider {
        fn fetch<'a>(
            &'a self,
            _input: &'a str,
        ) -> Pin<Box<dyn Future<Output = Option<f32>> + Send + 'a>> {
            let calls = self.calls.clone();
            Box::pin(async move {
                *calls.lock().unwrap() += 1;
                Some(0.42)
            })
        }
        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn cache_hit_skips_second_fetch() {
        let dir = unique_tmp_dir();
        let calls = Arc::new(Mutex::new(0u32));
        let client = CachingClient::new(
            CountingProvider { calls: calls.clone() },
            dir.clone(),
            10,
        );

        let a = client.score("same source").await;
        let b = client.score("same source").await;
        assert_eq!(a, Some(0.42));
        assert_eq!(b, Some(0.42));
        assert_eq!(*calls.lock().unwrap(), 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn daily_limit_blocks_real_calls() {
        let dir = unique_tmp_dir();
        let calls = Arc::new(Mutex::new(0u32));
        let client = CachingClient::new(
            CountingProvider { calls: calls.clone() },
            dir.clone(),
            1,
        );

        assert!(client.score("first").await.is_some());
        // Second distinct input exceeds the limit of 1.
        assert!(client.score("second").await.is_none());
        assert_eq!(*calls.lock().unwrap(), 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn disabled_client_always_none() {
        assert!(DisabledClient.score("anything").await.is_none());
        assert_eq!(DisabledClient.provider_name(), "disabled");
    }
}
