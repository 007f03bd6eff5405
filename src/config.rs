//! Configuration management with YAML support

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key: set completion.api_key or the {env} environment variable")]
    MissingApiKey { env: String },

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub themes: ThemesConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

/// Chat completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable consulted when `api_key` is not set
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Re-prompts after an unparseable score; 0 fails immediately
    #[serde(default)]
    pub clarify_retries: u32,
}

/// Word cloud rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemesConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_max_words")]
    pub max_words: usize,

    #[serde(default)]
    pub extra_stopwords: Vec<String>,
}

/// Terminal output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Delay between words when printing the report; 0 prints at once
    #[serde(default = "default_stream_delay_ms")]
    pub stream_delay_ms: u64,
}

/// Secrets resolved at startup
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("api_key", &"<redacted>").finish()
    }
}

// Default value functions
fn default_database_path() -> String {
    "~/.local/share/braindump/braindump.db".to_string()
}

fn default_base_url() -> String {
    "https://api.together.xyz/v1".to_string()
}

fn default_model() -> String {
    "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free".to_string()
}

fn default_api_key_env() -> String {
    "TOGETHER_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    400
}

fn default_max_words() -> usize {
    200
}

fn default_stream_delay_ms() -> u64 {
    20
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            clarify_retries: 0,
        }
    }
}

impl Default for ThemesConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            max_words: default_max_words(),
            extra_stopwords: Vec::new(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            stream_delay_ms: default_stream_delay_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    /// Searches in order:
    /// 1. Provided path
    /// 2. ./braindump.yaml (current directory)
    /// 3. ~/.config/braindump/braindump.yaml
    pub fn load(path: &str) -> Result<Self> {
        let search_paths = vec![
            shellexpand::tilde(path).to_string(),
            "braindump.yaml".to_string(),
            shellexpand::tilde("~/.config/braindump/braindump.yaml").to_string(),
        ];

        for search_path in &search_paths {
            if std::path::Path::new(search_path).exists() {
                let content = std::fs::read_to_string(search_path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                tracing::debug!(path = %search_path, "loaded config");
                return Ok(config);
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    /// Reject values that would only fail later, mid-request
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.completion.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "completion.base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.completion.model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "completion.model",
                reason: "must not be empty".to_string(),
            });
        }
        if self.completion.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "completion.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.themes.width == 0 || self.themes.height == 0 {
            return Err(ConfigError::Invalid {
                field: "themes.width/height",
                reason: "canvas must be non-empty".to_string(),
            });
        }
        if self.themes.max_words == 0 {
            return Err(ConfigError::Invalid {
                field: "themes.max_words",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Get the database path, expanding ~ to home directory
    pub fn database_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.database.path).to_string();
        PathBuf::from(expanded)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.completion.timeout_secs)
    }

    /// Resolve the API key from the config file, then the environment
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        self.credentials_with(|name| std::env::var(name).ok())
    }

    fn credentials_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Credentials, ConfigError> {
        let key = self
            .completion
            .api_key
            .clone()
            .or_else(|| lookup(&self.completion.api_key_env))
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        match key {
            Some(api_key) => Ok(Credentials { api_key }),
            None => Err(ConfigError::MissingApiKey {
                env: self.completion.api_key_env.clone(),
            }),
        }
    }
}
