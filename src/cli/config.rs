//! Configuration management for IncidentBuddy
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.incidentbuddy/config.toml
//!
//! Every client receives the settings it needs from here at construction;
//! nothing is read from process-wide state afterwards.

use crate::completion::client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::errors::{IncidentError, Result};
use crate::retry::{RetryPolicy, DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Highest sampling temperature accepted by OpenAI-compatible services
const MAX_TEMPERATURE: f32 = 2.0;

/// Complete configuration for IncidentBuddy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub similarity: SimilarityConfig,
    pub generation: GenerationConfig,
    pub retry: RetryConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

/// Completion service connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub request_timeout_secs: u64,
}

/// Similarity oracle sampling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub temperature: f32,
}

/// Solution generator sampling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f32,
}

/// Retry behaviour shared by oracle and generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_secs: u64,
}

/// Incident store location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: String,
}

/// Log output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level or `EnvFilter` directives, e.g. `info` or `incidentbuddy=debug`
    pub level: String,
    /// Append log lines to this file; stderr when empty
    pub file: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self { temperature: 0.0 }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { temperature: 0.3 }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_secs: DEFAULT_BACKOFF.as_secs(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: "incidents.db".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: "incident_solution_retrieval.log".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_secs(self.backoff_secs))
    }
}

impl StoreConfig {
    pub fn db_path(&self) -> PathBuf {
        Config::expand_path(&self.db_path)
    }
}

impl LoggingConfig {
    pub fn log_file(&self) -> Option<PathBuf> {
        let file = self.file.trim();
        if file.is_empty() {
            None
        } else {
            Some(Config::expand_path(file))
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| IncidentError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| IncidentError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".incidentbuddy").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.service.base_url.trim().is_empty() {
            return Err(IncidentError::ConfigError(
                "service.base_url must not be empty".to_string(),
            ));
        }

        if self.service.model.trim().is_empty() {
            return Err(IncidentError::ConfigError(
                "service.model must not be empty".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(IncidentError::ConfigError(
                "retry.max_attempts must be greater than 0".to_string(),
            ));
        }

        for (name, temperature) in [
            ("similarity.temperature", self.similarity.temperature),
            ("generation.temperature", self.generation.temperature),
        ] {
            if !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
                return Err(IncidentError::ConfigError(format!(
                    "{} must be between 0.0 and {}",
                    name, MAX_TEMPERATURE
                )));
            }
        }

        if self.service.request_timeout_secs == 0 {
            return Err(IncidentError::ConfigError(
                "service.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        EnvFilter::try_new(&self.logging.level).map_err(|e| {
            IncidentError::ConfigError(format!(
                "Invalid logging.level '{}': {}",
                self.logging.level, e
            ))
        })?;

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| IncidentError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| IncidentError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| IncidentError::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }
}
