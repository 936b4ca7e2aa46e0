//! CLI error type and exit code mapping.

use mcplay_core::{ChatStoreError, McpError, PathError, SettingsError};
use mcplay_runtime::{BridgeError, SessionError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Tool server or tool call failure.
    #[error("{0}")]
    Tool(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (terminal, file system).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Runtime error.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl CliError {
    /// Map error to an exit code (sysexits.h where one fits).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Tool(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Runtime(_) => 70,  // EX_SOFTWARE
            Self::Database(_) => 73, // EX_CANTCREAT (closest fit)
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Mcp(e) => e.into(),
            SessionError::Chat(ChatStoreError::Persistence(msg)) => Self::Database(msg),
            SessionError::Chat(e) => Self::Arguments(e.to_string()),
            SessionError::Bridge(e) => e.into(),
            SessionError::InvalidModel(msg) => Self::Config(msg),
            e @ SessionError::PropertyOptions { .. } => Self::Tool(e.to_string()),
        }
    }
}

impl From<McpError> for CliError {
    fn from(err: McpError) -> Self {
        match err {
            McpError::InvalidConfig(_)
            | McpError::DuplicateServer(_)
            | McpError::ServerNotFound(_)
            | McpError::ToolCollision { .. } => Self::Config(err.to_string()),
            McpError::ToolNotFound(_) => Self::Arguments(err.to_string()),
            McpError::Connection { .. } | McpError::ToolExecution { .. } => {
                Self::Tool(err.to_string())
            }
        }
    }
}

impl From<BridgeError> for CliError {
    fn from(err: BridgeError) -> Self {
        Self::Runtime(err.to_string())
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
