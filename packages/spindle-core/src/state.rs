//! Application configuration.
//!
//! [`Config`] is loaded from an optional YAML file, then environment overrides
//! are applied, then the result is validated. All fields have sensible defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SpindleError, SpindleResult};
use crate::protocol_constants::{
    BROWSE_HIERARCHY, DEFAULT_CALL_TIMEOUT_MS, DEFAULT_PAGE_SIZE, DEFAULT_PLAY_BUDGET_MS,
    LIBRARY_TITLE,
};

/// Configuration for browse traversals and play requests.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BrowseConfig {
    /// Controller hierarchy the strategies navigate.
    pub hierarchy: String,

    /// Titles walked from the hierarchy root before every strategy path.
    pub library_path: Vec<String>,

    /// Items requested per load call.
    pub page_size: usize,

    /// Timeout for a single controller round trip (milliseconds).
    pub call_timeout_ms: u64,

    /// End-to-end budget for one play request, counted from lock acquisition (milliseconds).
    pub play_budget_ms: u64,

    /// Fixed browse session key. A random one is generated at bootstrap when absent.
    pub session_key: Option<String>,
}

impl BrowseConfig {
    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.hierarchy.trim().is_empty() {
            return Err("hierarchy must not be empty".to_string());
        }
        if self.page_size == 0 {
            return Err("page_size must be >= 1".to_string());
        }
        if self.call_timeout_ms == 0 {
            return Err("call_timeout_ms must be >= 1".to_string());
        }
        if self.play_budget_ms < self.call_timeout_ms {
            return Err(format!(
                "play_budget_ms ({}) must be >= call_timeout_ms ({})",
                self.play_budget_ms, self.call_timeout_ms
            ));
        }
        Ok(())
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            hierarchy: BROWSE_HIERARCHY.to_string(),
            library_path: vec![LIBRARY_TITLE.to_string()],
            page_size: DEFAULT_PAGE_SIZE,
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            play_budget_ms: DEFAULT_PLAY_BUDGET_MS,
            session_key: None,
        }
    }
}

/// Configuration for the Spindle core.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    // Server
    /// Preferred port for the HTTP server (0 = first free port in the default range).
    pub preferred_port: u16,

    // Browse
    /// Browse and play-request configuration.
    pub browse: BrowseConfig,
}

impl Config {
    /// Loads configuration from a YAML file, then applies environment overrides.
    ///
    /// Without a path, defaults are used as the base.
    ///
    /// # Errors
    ///
    /// Returns [`SpindleError::Configuration`] if the file cannot be read or
    /// parsed, or if the final values fail validation.
    pub fn load(path: Option<&Path>) -> SpindleResult<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    SpindleError::Configuration(format!(
                        "Failed to read config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::from_yaml(&content).map_err(|e| {
                    SpindleError::Configuration(format!(
                        "Failed to parse config file {}: {}",
                        path.display(),
                        e
                    ))
                })?
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.browse.validate().map_err(SpindleError::Configuration)?;
        Ok(config)
    }

    fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to unit, not to an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Some(port) = env_parse("SPINDLE_BIND_PORT") {
            self.preferred_port = port;
        }
        if let Some(page_size) = env_parse("SPINDLE_PAGE_SIZE") {
            self.browse.page_size = page_size;
        }
        if let Some(budget) = env_parse("SPINDLE_PLAY_BUDGET_MS") {
            self.browse.play_budget_ms = budget;
        }
        if let Some(timeout) = env_parse("SPINDLE_CALL_TIMEOUT_MS") {
            self.browse.call_timeout_ms = timeout;
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let val = std::env::var(key).ok()?;
    match val.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::warn!("[Config] Ignoring unparseable {}={:?}", key, val);
            None
        }
    }
}
