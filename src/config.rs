//! Sync Configuration
//!
//! Backend connection settings persisted as JSON next to the local database.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name used when the config lives in an app data directory
pub const CONFIG_FILE_NAME: &str = "grocery_sync.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroceryConfig {
    /// REST endpoint root, e.g. `https://api.everlive.com/v1/<api-key>`
    pub backend_url: String,
    /// Bearer token; empty for anonymous access
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Where the rolling log files go; logging stays off when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_collection() -> String {
    "Groceries".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl GroceryConfig {
    pub fn new(backend_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            token: token.into(),
            collection: default_collection(),
            request_timeout_secs: default_timeout(),
            log_dir: None,
        }
    }

    /// Remote sync needs both an endpoint and a token
    pub fn is_cloud_enabled(&self) -> bool {
        !self.backend_url.is_empty() && !self.token.is_empty()
    }
}

/// Read the config; a missing file means "not configured"
pub fn load_config(path: &Path) -> Result<Option<GroceryConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

pub fn save_config(path: &Path, config: &GroceryConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(config)?)?;
    log::info!("saved sync config to {}", path.display());
    Ok(())
}
