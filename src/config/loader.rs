//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::error::join;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not find config file {}", .0.display())]
    NotFound(PathBuf),

    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad config file format: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad config file format: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

/// Load and validate configuration from a JSON (`.json`) or TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let config = parse_config(&content, is_json(path))?;

    validate_config(&config).map_err(LoadError::Validation)?;

    Ok(config)
}

/// Parse configuration text without touching the filesystem.
pub fn parse_config(content: &str, json: bool) -> Result<GatewayConfig, LoadError> {
    if json {
        Ok(serde_json::from_str(content)?)
    } else {
        Ok(toml::from_str(content)?)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
