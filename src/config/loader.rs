//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::capability::Capabilities;
use crate::config::schema::RawConfig;
use crate::config::tree::ConfigurationTree;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported configuration format for {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),
}

/// Supported on-disk formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Format::Toml),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// Parse configuration text without validating it.
pub fn parse_raw_config(content: &str, format: Format) -> Result<RawConfig, ConfigError> {
    let value: Value = match format {
        Format::Toml => toml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };
    Ok(RawConfig::from_value(value)?)
}

/// Read and parse a configuration file without validating it.
pub fn read_raw_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let format =
        Format::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_raw_config(&content, format)
}

/// Load and validate configuration from a TOML or JSON file.
pub fn load_config(path: &Path, capabilities: &Capabilities) -> Result<ConfigurationTree, ConfigError> {
    let raw = read_raw_config(path)?;
    let tree = validate_config(raw, capabilities)?;

    tracing::debug!(
        path = %path.display(),
        persisters = tree.persisters.len(),
        search_clients = tree.search_clients.len(),
        "Configuration loaded"
    );
    Ok(tree)
}
