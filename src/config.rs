use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub permagent: PermagentConfig,
    pub embeddings: EmbeddingsConfig,
    pub summarizer: SummarizerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Agent-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PermagentConfig {
    /// Directory watched for newly created files. Created at startup if absent.
    pub watch_folder: PathBuf,
    /// Append-only success log, one JSON record per line.
    #[serde(default = "default_success_log")]
    pub success_log: PathBuf,
    /// Append-only failure log, one JSON record per line.
    #[serde(default = "default_failure_log")]
    pub failure_log: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Embeddings configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub api_key_env: String,
    pub batch_size: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

/// Summarizer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    pub model: String,
    pub api_key_env: String,
    #[serde(default = "default_summary_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Storage gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_api_url")]
    pub api_url: String,
    pub api_key_env: String,
    #[serde(default = "default_upload_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Dashboard (viewer) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: default_dashboard_port(),
        }
    }
}

fn default_success_log() -> PathBuf {
    PathBuf::from("metadata_log.json")
}

fn default_failure_log() -> PathBuf {
    PathBuf::from("failed_uploads.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_upload_timeout_secs() -> u64 {
    120
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_summary_max_tokens() -> u32 {
    128
}

fn default_storage_api_url() -> String {
    "https://node.lighthouse.storage/api/v0/add".to_string()
}

fn default_dashboard_port() -> u16 {
    8080
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in PERMAGENT_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        let config_path = std::env::var("PERMAGENT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config.toml")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    ///
    /// The watch folder is allowed to be absent (the agent creates it), but
    /// it must not point at an existing non-directory. API key presence is
    /// checked by the agent binary, not here, so the read-only dashboard can
    /// load the same config without the agent's secrets.
    fn validate(&self) -> Result<()> {
        if self.permagent.watch_folder.exists() && !self.permagent.watch_folder.is_dir() {
            anyhow::bail!(
                "watch_folder must be a directory, not a file: {}",
                self.permagent.watch_folder.display()
            );
        }

        if self.embeddings.batch_size == 0 {
            anyhow::bail!("embeddings.batch_size must be greater than 0");
        }

        if self.embeddings.request_timeout_secs == 0
            || self.summarizer.request_timeout_secs == 0
            || self.storage.request_timeout_secs == 0
        {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.summarizer.max_tokens == 0 {
            anyhow::bail!("summarizer.max_tokens must be greater than 0");
        }

        if self.storage.api_url.is_empty() {
            anyhow::bail!("storage.api_url must not be empty");
        }

        Ok(())
    }

    /// Get the watched folder path
    pub fn watch_folder(&self) -> &Path {
        &self.permagent.watch_folder
    }

    /// Get the success log path
    pub fn success_log(&self) -> &Path {
        &self.permagent.success_log
    }

    /// Get the failure log path
    pub fn failure_log(&self) -> &Path {
        &self.permagent.failure_log
    }
}
