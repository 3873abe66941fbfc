//! Core configuration loaded from TOML.
//!
//! # Responsibility
//! - Define the `[logging]`, `[storage]`, `[inference]` and `[reminders]`
//!   sections consumed by hosts (CLI, embedding apps).
//! - Validate inference credentials before they reach the HTTP client.
//!
//! # Invariants
//! - Every field has a default; an empty file is a valid config.
//! - `LAZYTASK_HF_API_KEY` overrides `inference.api_key` when set.
//! - The 14-day reminder ceiling and 1-hour spacing are policy constants and
//!   intentionally absent from this file.

use crate::logging::default_log_level;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `inference.api_key`.
pub const API_KEY_ENV: &str = "LAZYTASK_HF_API_KEY";

const DEFAULT_API_URL: &str =
    "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.2";
const DEFAULT_DB_FILE_NAME: &str = "lazytask.sqlite3";

static API_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^hf_\S+$").expect("valid api key regex"));

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(message) => write!(f, "invalid config syntax: {message}"),
            Self::Invalid(message) => write!(f, "invalid config value: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(_) | Self::Invalid(_) => None,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub inference: InferenceConfig,
    pub reminders: ReminderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute directory for rolling log files. Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Disables the model tier entirely; classification uses the fallback.
    pub enabled: bool,
    pub api_url: String,
    pub api_key: Option<String>,
    /// Overall deadline for one request, body included. Also caps connect,
    /// read and write individually.
    pub timeout_ms: u64,
    pub max_new_tokens: u32,
    pub temperature: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            timeout_ms: 15_000,
            max_new_tokens: 400,
            temperature: 0.1,
        }
    }
}

impl InferenceConfig {
    /// Returns the trimmed API key, or `None` when unset or blank.
    pub fn resolved_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Cadence of the in-app upcoming-reminder poll.
    pub poll_interval_secs: u64,
    /// Look-ahead window for the in-app heads-up.
    pub upcoming_window_secs: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            upcoming_window_secs: 5 * 60,
        }
    }
}

impl ReminderConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn upcoming_window_ms(&self) -> i64 {
        i64::try_from(self.upcoming_window_secs.saturating_mul(1_000)).unwrap_or(i64::MAX)
    }
}

impl CoreConfig {
    /// Loads configuration from a TOML file, defaulting missing fields.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `LAZYTASK_HF_API_KEY` from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let key = std::env::var(API_KEY_ENV).ok();
        self.with_api_key_override(key)
    }

    /// Replaces the configured API key when `key` is present.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Result<Self, ConfigError> {
        if let Some(key) = key {
            validate_api_key(&key)?;
            self.inference.api_key = Some(key.trim().to_string());
        }
        Ok(self)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(key) = &self.inference.api_key {
            validate_api_key(key)?;
        }
        if self.inference.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "inference.timeout_ms must be > 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.inference.temperature) {
            return Err(ConfigError::Invalid(format!(
                "inference.temperature must be within 0.0..=2.0, got {}",
                self.inference.temperature
            )));
        }
        if self.reminders.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "reminders.poll_interval_secs must be > 0".to_string(),
            ));
        }
        if self.reminders.upcoming_window_secs == 0 {
            return Err(ConfigError::Invalid(
                "reminders.upcoming_window_secs must be > 0".to_string(),
            ));
        }
        if let Some(dir) = &self.logging.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "logging.log_dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Default config path: `$XDG_CONFIG_HOME/lazytask/config.toml`, then
    /// `~/.config/lazytask/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("lazytask").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("lazytask")
                .join("config.toml")
        } else {
            PathBuf::from("lazytask-config.toml")
        }
    }
}

/// Validates a Hugging Face access token.
///
/// Rules: non-blank and `hf_` prefix with no embedded whitespace.
pub fn validate_api_key(key: &str) -> Result<(), ConfigError> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid("API token cannot be empty".to_string()));
    }
    if !API_KEY_RE.is_match(trimmed) {
        return Err(ConfigError::Invalid(
            "invalid Hugging Face token format; it should start with `hf_`".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_api_key, ConfigError, CoreConfig};
    use std::path::PathBuf;

    #[test]
    fn empty_document_yields_defaults() {
        let config = CoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.reminders.poll_interval_secs, 60);
        assert_eq!(config.reminders.upcoming_window_ms(), 300_000);
        assert_eq!(config.inference.max_new_tokens, 400);
        assert_eq!(config.storage.db_path, PathBuf::from("lazytask.sqlite3"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = CoreConfig::from_toml_str(
            r#"
            [inference]
            api_key = "hf_abc123"
            timeout_ms = 2500

            [reminders]
            poll_interval_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.inference.resolved_api_key(), Some("hf_abc123"));
        assert_eq!(config.inference.timeout_ms, 2_500);
        assert!(config.inference.enabled);
        assert_eq!(config.reminders.poll_interval_secs, 30);
        assert_eq!(config.reminders.upcoming_window_secs, 300);
    }

    #[test]
    fn rejects_malformed_api_key_and_zero_interval() {
        let err = CoreConfig::from_toml_str("[inference]\napi_key = \"sk-123\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("hf_")));

        let err =
            CoreConfig::from_toml_str("[reminders]\npoll_interval_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_relative_log_dir() {
        let err = CoreConfig::from_toml_str("[logging]\nlog_dir = \"logs\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("absolute")));
    }

    #[test]
    fn api_key_override_replaces_configured_key() {
        let config = CoreConfig::default()
            .with_api_key_override(Some(" hf_from_env ".to_string()))
            .unwrap();
        assert_eq!(config.inference.resolved_api_key(), Some("hf_from_env"));

        let unchanged = CoreConfig::default().with_api_key_override(None).unwrap();
        assert_eq!(unchanged.inference.api_key, None);
    }

    #[test]
    fn validate_api_key_rules() {
        assert!(validate_api_key("hf_abc").is_ok());
        assert!(validate_api_key("   ").is_err());
        assert!(validate_api_key("hf_ab c").is_err());
        assert!(validate_api_key("abc").is_err());
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\ndb_path = \"/tmp/tasks.db\"\n").unwrap();

        let config = CoreConfig::from_file(&path).unwrap();
        assert_eq!(config.storage.db_path, PathBuf::from("/tmp/tasks.db"));

        let missing = CoreConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
