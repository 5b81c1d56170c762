//! Configuration file support.
//!
//! ```toml
//! [decode]
//! max_array_size = 100
//! prefix = ""
//! require_exhausted = true
//!
//! [logging]
//! filter = "info,introspect_flat=debug"
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use anyhow::Context;
use introspect_flat::DEFAULT_MAX_ARRAY_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub decode: DecodeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Decoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecodeConfig {
    /// Arrays longer than this are consumed but not emitted
    #[serde(default = "default_max_array_size")]
    pub max_array_size: u32,
    /// Root segment of every emitted path
    #[serde(default)]
    pub prefix: String,
    /// Fail when bytes remain after the root message
    #[serde(default = "default_require_exhausted")]
    pub require_exhausted: bool,
}

fn default_max_array_size() -> u32 {
    DEFAULT_MAX_ARRAY_SIZE
}

fn default_require_exhausted() -> bool {
    true
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_array_size: default_max_array_size(),
            prefix: String::new(),
            require_exhausted: default_require_exhausted(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives. Falls back to `RUST_LOG`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl Config {
    /// Load a config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path:?}"))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {path:?}"))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
