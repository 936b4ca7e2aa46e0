//! Client configuration types, validation and file persistence.
//!
//! The configuration is a single JSON document: the server list, model
//! parameters, deadlines, the collision policy and the history limit.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::mcp::{CollisionPolicy, ServerConfig};
use crate::domain::model::ModelParams;

/// Default connect deadline per server, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default tool call deadline, in seconds.
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 60;

/// Default number of chats shown in the history list.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Tool server endpoints, in connection order.
    pub servers: Vec<ServerConfig>,

    /// Model parameters handed to the conversational layer.
    pub model: ModelParams,

    /// Duplicate tool name handling.
    pub collision_policy: CollisionPolicy,

    /// Connect deadline per server.
    pub connect_timeout_secs: u64,

    /// Tool call deadline.
    pub tool_timeout_secs: u64,

    /// Number of chats shown in the history list (1-500).
    pub history_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            model: ModelParams::default(),
            collision_policy: CollisionPolicy::default(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            tool_timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl ClientConfig {
    /// Look up a server by name.
    pub fn server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.iter().find(|s| s.name == name)
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid server '{name}': {reason}")]
    InvalidServer { name: String, reason: String },

    #[error("Duplicate server name: {0}")]
    DuplicateServer(String),

    #[error("Invalid model parameters: {0}")]
    InvalidModel(String),

    #[error("{field} must be between 1 and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        max: u64,
        value: u64,
    },

    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to write config file {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Config file {path} is not valid: {reason}")]
    Parse { path: String, reason: String },
}

/// Validate configuration values.
pub fn validate_config(config: &ClientConfig) -> Result<(), SettingsError> {
    let mut seen = HashSet::new();
    for server in &config.servers {
        server
            .validate()
            .map_err(|reason| SettingsError::InvalidServer {
                name: server.name.clone(),
                reason,
            })?;
        if !seen.insert(server.name.as_str()) {
            return Err(SettingsError::DuplicateServer(server.name.clone()));
        }
    }

    config.model.validate().map_err(SettingsError::InvalidModel)?;

    check_range("connect_timeout_secs", config.connect_timeout_secs, 600)?;
    check_range("tool_timeout_secs", config.tool_timeout_secs, 3600)?;
    check_range("history_limit", config.history_limit as u64, 500)?;

    Ok(())
}

const fn check_range(field: &'static str, value: u64, max: u64) -> Result<(), SettingsError> {
    if value == 0 || value > max {
        return Err(SettingsError::OutOfRange { field, max, value });
    }
    Ok(())
}

/// Load and validate a config file.
///
/// A missing file yields the default configuration.
pub fn load_config(path: &Path) -> Result<ClientConfig, SettingsError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(ClientConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(|e| SettingsError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let config: ClientConfig =
        serde_json::from_str(&contents).map_err(|e| SettingsError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate and write a config file, creating parent directories.
pub fn save_config(path: &Path, config: &ClientConfig) -> Result<(), SettingsError> {
    validate_config(config)?;

    let write_err = |reason: String| SettingsError::Write {
        path: path.display().to_string(),
        reason,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
    }
    let json = serde_json::to_string_pretty(config).map_err(|e| write_err(e.to_string()))?;
    fs::write(path, json).map_err(|e| write_err(e.to_string()))?;

    tracing::debug!(path = %path.display(), servers = config.servers.len(), "Saved config");
    Ok(())
}
