// quilldeck/src/config.rs
//!
//! Process configuration, built once at start-up and handed to the service.
//!
//! Values come from a TOML file (every section optional) followed by
//! environment overrides: `LLM_API_KEY`, `LLM_BASE_URL`, `LLM_MODEL`,
//! `DB_PATH` and `QUILLDECK_LOG`. Empty environment values are ignored.

use crate::models::SummaryLength;
use crate::summarizer::SummaryPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "./data/quilldeck.db";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub summarizer: SummarizerConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            max_connections: 4,
        }
    }
}

/// Remote chat-completion backend. Left empty, summaries are produced locally.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Character budget quoted in the prompt.
    pub max_chars: usize,
    pub style: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: String::new(),
            model: String::new(),
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            max_chars: 200,
            style: "Japanese business".to_string(),
        }
    }
}

impl LlmConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.base_url.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let api_key = if self.api_key.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("LlmConfig")
            .field("api_key", &api_key)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_chars", &self.max_chars)
            .field("style", &self.style)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub policy: SummaryPolicy,
    pub default_length: SummaryLength,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads `path` if given (it must exist), otherwise the per-user default
    /// file when present, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_from_path(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::load_from_str(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("Failed to parse config file as TOML")
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(value) = get("LLM_API_KEY") {
            self.llm.api_key = value;
        }
        if let Some(value) = get("LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = get("LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = get("DB_PATH") {
            self.database.path = PathBuf::from(value);
        }
        if let Some(value) = get("QUILLDECK_LOG") {
            self.log.filter = value;
        }
    }
}

/// `<config dir>/quilldeck/config.toml`, e.g. `~/.config/quilldeck/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("quilldeck").join("config.toml"))
}
