use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::{MemcatError, Result};

/// Environment variable overriding the backend host
pub const HOST_ENV: &str = "OLLAMA_HOST";

/// Environment variable overriding the model identifier
pub const MODEL_ENV: &str = "MEMCAT_MODEL";

/// Main configuration structure for memcat
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Inference backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Retry policy for backend calls
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Load configuration from an explicit path, or from the first default
    /// location that exists. Falls back to defaults when no file is found.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        for path in Self::default_paths() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(&path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read and parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MemcatError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content)
            .map_err(|e| MemcatError::Config(format!("Failed to parse config: {e}")))
    }

    /// Candidate config locations, in lookup order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::home_dir().map(|h| h.join(".memcat").join("config.toml")),
            dirs::config_dir().map(|c| c.join("memcat").join("config.toml")),
            Some(PathBuf::from("config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Apply `OLLAMA_HOST` / `MEMCAT_MODEL` from the process environment.
    ///
    /// Meant to be called once by the hosting application at startup.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_ENV).filter(|v| !v.trim().is_empty()) {
            self.backend.host = host.trim().to_string();
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.backend.model = model.trim().to_string();
        }
        self
    }
}

/// Inference backend (Ollama) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_host")]
    pub host: String,
    /// Model identifier passed with every generate request
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    /// Parse and check the configured host, returning it as a URL
    pub fn validate(&self) -> Result<Url> {
        if self.model.trim().is_empty() {
            return Err(MemcatError::Config("backend.model must not be empty".to_string()));
        }

        let url = Url::parse(&self.host).map_err(|e| {
            MemcatError::Config(format!("Invalid backend host '{}': {e}", self.host))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(MemcatError::Config(format!(
                "Unsupported backend scheme '{other}' (expected http or https)"
            ))),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_host() -> String {
    "http://ollama:11434".to_string()
}

fn default_model() -> String {
    "gemma3:1b".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Retry configuration for backend calls
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay after the first failed attempt, in seconds
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: u64,
    /// Upper bound for any single delay, in seconds
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
    /// Multiplier applied to the exponential term
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
            multiplier: default_multiplier(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_secs() -> u64 {
    4
}

fn default_max_delay_secs() -> u64 {
    15
}

fn default_multiplier() -> u32 {
    1
}
