// =============================================================================
// Runtime Configuration — JSON file plus environment overrides
// =============================================================================
//
// Resolution order: built-in defaults, then `runtime_config.json` (when it
// exists), then environment variables. All fields carry `#[serde(default)]`
// so that a partial or older file still loads.
//
// The model credential is never part of this struct; it is read from
// `GROQ_API_KEY` at startup and handed straight to the client.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::DEFAULT_TTL;
use crate::llm::groq::{DEFAULT_BASE_URL, DEFAULT_MODEL};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_model_timeout_secs() -> u64 {
    20
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
        "https://stockdashboard2011.netlify.app".to_string(),
    ]
}

fn default_news_region() -> String {
    "IN".to_string()
}

fn default_news_lang() -> String {
    "en".to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Server -------------------------------------------------------------

    /// Directory holding `<SYMBOL>.csv` price files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Origins accepted by the CORS layer.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    // --- Language model -----------------------------------------------------

    #[serde(default = "default_model")]
    pub groq_model: String,

    /// OpenAI-compatible API root; `/chat/completions` is appended.
    #[serde(default = "default_base_url")]
    pub groq_base_url: String,

    /// Upper bound on one outbound model or news request.
    #[serde(default = "default_model_timeout_secs")]
    pub model_timeout_secs: u64,

    // --- Caching & news -----------------------------------------------------

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_news_region")]
    pub news_region: String,

    #[serde(default = "default_news_lang")]
    pub news_lang: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            bind_addr: default_bind_addr(),
            allowed_origins: default_allowed_origins(),
            groq_model: default_model(),
            groq_base_url: default_base_url(),
            model_timeout_secs: default_model_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            news_region: default_news_region(),
            news_lang: default_news_lang(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            data_dir = %config.data_dir.display(),
            model = %config.groq_model,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Blank values are ignored; unparseable
    /// numbers keep the current value and log a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        if let Some(v) = get("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = get("GROQ_MODEL") {
            self.groq_model = v;
        }
        if let Some(v) = get("GROQ_BASE_URL") {
            self.groq_base_url = v;
        }
        if let Some(v) = get("NEWS_REGION") {
            self.news_region = v;
        }
        if let Some(v) = get("NEWS_LANG") {
            self.news_lang = v;
        }
        if let Some(v) = get("ALLOWED_ORIGINS") {
            let origins: Vec<String> = v
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
            if !origins.is_empty() {
                self.allowed_origins = origins;
            }
        }
        for (key, slot) in [
            ("CACHE_TTL_SECS", &mut self.cache_ttl_secs),
            ("MODEL_TIMEOUT_SECS", &mut self.model_timeout_secs),
        ] {
            if let Some(v) = get(key) {
                match v.parse::<u64>() {
                    Ok(n) => *slot = n,
                    Err(e) => warn!(key, value = %v, error = %e, "ignoring invalid override"),
                }
            }
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }
}
