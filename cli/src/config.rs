//! Configuration management for qrdash.
//!
//! Loaded with figment from defaults, an optional TOML file and
//! `QRDASH_`-prefixed environment variables.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use qrdash_core::StaleEditPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_DIR_NAME: &str = "qrdash";
const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(Box<figment::Error>),

    #[error("invalid configuration: {message}")]
    Validation { message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// Application configuration.
///
/// Precedence, highest first:
/// 1. Environment variables (`QRDASH_API__BASE_URL`, ...)
/// 2. TOML config file at `~/.config/qrdash/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root of the record service, without the `/api` suffix.
    pub base_url: String,
    /// Global per-request timeout. Exceeding it is a transport failure.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Where the credential is kept between runs.
    /// Defaults to `~/.local/share/qrdash/session.json`
    pub token_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub stale_edit_policy: StalePolicySetting,
}

/// Serializable mirror of `StaleEditPolicy`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicySetting {
    #[default]
    ReturnToBrowsing,
    KeepEditing,
}

impl From<StalePolicySetting> for StaleEditPolicy {
    fn from(setting: StalePolicySetting) -> Self {
        match setting {
            StalePolicySetting::ReturnToBrowsing => StaleEditPolicy::ReturnToBrowsing,
            StalePolicySetting::KeepEditing => StaleEditPolicy::KeepEditing,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        let config: Config = Self::figment(config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(config_file: PathBuf) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("QRDASH_").split("__"))
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Validation {
                message: "api.base_url must not be empty".to_string(),
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation {
                message: format!("api.base_url must be an http(s) URL, got '{url}'"),
            });
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                message: "api.timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// The credential file, explicit or defaulted.
    #[must_use]
    pub fn token_path(&self) -> PathBuf {
        self.session.token_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR_NAME)
                .join(SESSION_FILE_NAME)
        })
    }

    #[must_use]
    pub fn stale_edit_policy(&self) -> StaleEditPolicy {
        self.dashboard.stale_edit_policy.into()
    }
}
