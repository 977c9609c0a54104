#![forbid(unsafe_code)]

//! Client configuration.
//!
//! Every field defaults to the value the builder UI uses out of the box, so
//! `ClientConfig::default()` needs no file at all. With the `config` feature
//! the same struct loads from TOML or JSON:
//!
//! ```toml
//! # dashkit.toml
//! indentation_width = 32.0
//! reentrancy_warn_depth = 4
//! seed_children = true
//! ```

#[cfg(feature = "config")]
use std::fmt;
#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use dashkit_core::ROOT_ID;

/// Tunables for a [`crate::TreeClient`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ClientConfig {
    /// Pixels of horizontal drag per nesting level.
    pub indentation_width: f64,
    /// Id of the anchor container of a fresh tree.
    pub root_id: String,
    /// Nested cascades deeper than this are logged at warn. Not enforced.
    pub reentrancy_warn_depth: usize,
    /// Start a fresh client with the sample navigation tree.
    pub seed_children: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            indentation_width: 50.0,
            root_id: ROOT_ID.to_string(),
            reentrancy_warn_depth: 8,
            seed_children: false,
        }
    }
}

impl ClientConfig {
    /// Validate all parameters are within acceptable ranges.
    ///
    /// An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(self.indentation_width.is_finite() && self.indentation_width > 0.0) {
            errors.push(format!(
                "indentation_width must be a positive number, got {}",
                self.indentation_width
            ));
        }
        if self.root_id.is_empty() {
            errors.push("root_id must not be empty".to_string());
        }
        if self.reentrancy_warn_depth == 0 {
            errors.push("reentrancy_warn_depth must be at least 1".to_string());
        }
        errors
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to TOML.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::TomlSerialize)
    }
}

/// Errors from loading a [`ClientConfig`].
#[cfg(feature = "config")]
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    TomlSerialize(toml::ser::Error),
    Json(serde_json::Error),
}

#[cfg(feature = "config")]
impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::TomlSerialize(e) => write!(f, "TOML serialize error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

#[cfg(feature = "config")]
impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::TomlSerialize(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}
