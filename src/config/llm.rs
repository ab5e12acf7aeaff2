// src/config/llm.rs
//! Injected LLM configuration: per-stage model ids and temperatures.
//! Loaded from JSON (`LLM_CONFIG_PATH`, default `config/llm.json`) with an
//! "ENV" indirection for the API key so secrets stay out of the file.

use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

pub const DEFAULT_LLM_CONFIG_PATH: &str = "config/llm.json";
pub const ENV_LLM_CONFIG_PATH: &str = "LLM_CONFIG_PATH";
/// OpenRouter key variable (the upstream providers are routed through it).
pub const ENV_API_KEY: &str = "OPEN_ROUTER_KEY";

const DEFAULT_MODEL: &str = "openai/gpt-4-turbo-preview";

/// Model id + temperature for one pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    pub model: String,
    pub temperature: f32,
}

impl StageConfig {
    fn new(model: &str, temperature: f32) -> Self {
        Self {
            model: model.to_string(),
            temperature,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub enabled: bool,
    /// "ENV" means: read from OPEN_ROUTER_KEY at load time.
    pub api_key: String,
    /// Per-day cap on real model calls; cache hits don't count.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    #[serde(default = "default_analyzer")]
    pub analyzer: StageConfig,
    #[serde(default = "default_insight")]
    pub insight: StageConfig,
    #[serde(default = "default_report")]
    pub report: StageConfig,
}

fn default_daily_limit() -> u32 {
    20
}
fn default_analyzer() -> StageConfig {
    StageConfig::new(DEFAULT_MODEL, 0.3)
}
fn default_insight() -> StageConfig {
    StageConfig::new(DEFAULT_MODEL, 0.7)
}
fn default_report() -> StageConfig {
    StageConfig::new(DEFAULT_MODEL, 0.5)
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            daily_limit: default_daily_limit(),
            analyzer: default_analyzer(),
            insight: default_insight(),
            report: default_report(),
        }
    }
}

impl LlmConfig {
    /// Load from `LLM_CONFIG_PATH` (or the default path). A missing file
    /// yields the disabled default; a present but invalid file is an error.
    pub fn load() -> anyhow::Result<Self> {
        let path = env::var(ENV_LLM_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_LLM_CONFIG_PATH.to_string());
        match fs::read_to_string(Path::new(&path)) {
            Ok(data) => Self::from_json_str(&data),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_json_str(data: &str) -> anyhow::Result<Self> {
        let mut cfg: LlmConfig = serde_json::from_str(data)?;

        // Resolve api key if "ENV".
        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = env::var(ENV_API_KEY).unwrap_or_default();
            if cfg.api_key.is_empty() {
                tracing::warn!("OPEN_ROUTER_KEY not set; model-backed scoring disabled");
                cfg.enabled = false;
            }
        }

        // OpenRouter keys start with sk-or-; a mismatch is suspicious but
        // not fatal (key formats have changed before).
        if cfg.enabled && !cfg.api_key.is_empty() && !cfg.api_key.starts_with("sk-or-") {
            tracing::warn!("OPEN_ROUTER_KEY does not look like an OpenRouter key");
        }

        // Sanitize temperatures.
        for stage in [&mut cfg.analyzer, &mut cfg.insight, &mut cfg.report] {
            if !(0.0..=2.0).contains(&stage.temperature) {
                stage.temperature = 0.3;
            }
        }

        Ok(cfg)
    }
}
