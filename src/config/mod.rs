//! Configuration management for folio-i18n
//!
//! This module handles loading and validating configuration from environment variables
//! and TOML files.
//!
//! # Environment Variables
//!
//! - `FOLIO_STORAGE_PATH`: preference file location (default `data/preferences.json`)
//! - `FOLIO_STORAGE_ENABLED`: `false` simulates blocked storage
//! - `FOLIO_GEO_ENDPOINT`: geolocation endpoint (default `https://ipapi.co/json/`)
//! - `FOLIO_GEO_TIMEOUT_SECS`: optional request timeout
//! - `FOLIO_REFINE_ENABLED`: `false` disables refinement
//! - `FOLIO_REFINE_DELAY_MS`: delay before refinement (default 1000)
//! - `FOLIO_LOG_LEVEL`, `FOLIO_LOG_FORMAT`: logging

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::i18n::refine::{DEFAULT_GEO_ENDPOINT, DEFAULT_REFINE_DELAY};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preference storage configuration
    pub storage: StorageConfig,

    /// Geolocation refinement configuration
    pub refinement: RefinementConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Preference storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the stored preferences
    pub path: PathBuf,

    /// Whether storage is available at all
    pub enabled: bool,
}

/// Geolocation refinement configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinementConfig {
    /// Run refinement after startup
    pub enabled: bool,

    /// IP geolocation endpoint
    pub endpoint: String,

    /// Delay before refinement runs, in milliseconds
    pub delay_ms: u64,

    /// Request timeout in seconds; unset uses the client default
    pub timeout_secs: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/preferences.json"),
            enabled: true,
        }
    }
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: String::from(DEFAULT_GEO_ENDPOINT),
            delay_ms: u64::try_from(DEFAULT_REFINE_DELAY.as_millis()).unwrap_or(1000),
            timeout_secs: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let path = std::env::var("FOLIO_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage.path);

        let storage_enabled = env_flag("FOLIO_STORAGE_ENABLED").unwrap_or(defaults.storage.enabled);

        let refine_enabled =
            env_flag("FOLIO_REFINE_ENABLED").unwrap_or(defaults.refinement.enabled);

        let endpoint =
            std::env::var("FOLIO_GEO_ENDPOINT").unwrap_or(defaults.refinement.endpoint);

        let delay_ms = std::env::var("FOLIO_REFINE_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.refinement.delay_ms);

        let timeout_secs = std::env::var("FOLIO_GEO_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok());

        let level = std::env::var("FOLIO_LOG_LEVEL").unwrap_or(defaults.logging.level);

        let format = std::env::var("FOLIO_LOG_FORMAT").unwrap_or(defaults.logging.format);

        Ok(Self {
            storage: StorageConfig {
                path,
                enabled: storage_enabled,
            },
            refinement: RefinementConfig {
                enabled: refine_enabled,
                endpoint,
                delay_ms,
                timeout_secs,
            },
            logging: LoggingConfig { level, format },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let endpoint = Url::parse(&self.refinement.endpoint)
            .with_context(|| format!("Invalid geolocation endpoint: {}", self.refinement.endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            anyhow::bail!("geolocation endpoint must use http or https");
        }

        if self.refinement.timeout_secs == Some(0) {
            anyhow::bail!("timeout_secs must be greater than 0");
        }

        if self.storage.enabled && self.storage.path.as_os_str().is_empty() {
            anyhow::bail!("storage path must not be empty");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("log format must be text or json");
        }

        Ok(())
    }

    /// Get refinement delay as Duration
    #[must_use]
    pub fn refine_delay(&self) -> Duration {
        Duration::from_millis(self.refinement.delay_ms)
    }

    /// Get geolocation request timeout, if configured
    #[must_use]
    pub fn geo_timeout(&self) -> Option<Duration> {
        self.refinement.timeout_secs.map(Duration::from_secs)
    }
}
