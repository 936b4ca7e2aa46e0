//! Path resolution for the config file and the data directory.
//!
//! Resolution order for each path:
//! 1. Environment override (`MCPLAY_CONFIG`, `MCPLAY_DATA_DIR`)
//! 2. Platform directory from `dirs` (e.g. `~/.config/mcplay/config.json`)

use std::env;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "MCPLAY_CONFIG";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV_VAR: &str = "MCPLAY_DATA_DIR";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Could not determine the system config directory.
    #[error("Cannot determine system config directory")]
    NoConfigDir,

    /// Could not determine the system data directory.
    #[error("Cannot determine system data directory")]
    NoDataDir,

    /// Failed to create a directory.
    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },
}

/// Path of the config file.
pub fn config_file_path() -> Result<PathBuf, PathError> {
    resolve_config_path(env::var_os(CONFIG_ENV_VAR).map(PathBuf::from), dirs::config_dir())
}

/// Root directory for application data.
pub fn data_root() -> Result<PathBuf, PathError> {
    resolve_data_root(env::var_os(DATA_DIR_ENV_VAR).map(PathBuf::from), dirs::data_dir())
}

/// Path of the chat database, creating its directory if needed.
pub fn database_path() -> Result<PathBuf, PathError> {
    let data_dir = data_root()?;
    fs::create_dir_all(&data_dir).map_err(|e| PathError::CreateFailed {
        path: data_dir.clone(),
        reason: e.to_string(),
    })?;
    Ok(data_dir.join("mcplay.db"))
}

fn resolve_config_path(
    override_path: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> Result<PathBuf, PathError> {
    if let Some(path) = override_path.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    config_dir
        .map(|dir| dir.join("mcplay").join("config.json"))
        .ok_or(PathError::NoConfigDir)
}

fn resolve_data_root(
    override_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<PathBuf, PathError> {
    if let Some(dir) = override_dir.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(dir);
    }
    data_dir
        .map(|dir| dir.join("mcplay"))
        .ok_or(PathError::NoDataDir)
}
