//! Tool client error types.
//!
//! `McpError` is what the connection manager and dispatcher return to
//! callers. `McpErrorInfo` is the user-safe projection carried by events.

use thiserror::Error;

use super::tool_server::ToolServerError;

/// How a tool invocation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// The server answered with a JSON-RPC error.
    Remote,
    /// The request never produced an answer (network, protocol, closed session).
    Transport,
    /// The deadline elapsed.
    Timeout,
}

impl std::fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Remote => "remote",
            Self::Transport => "transport",
            Self::Timeout => "timeout",
        })
    }
}

impl From<&ToolServerError> for ToolErrorKind {
    fn from(error: &ToolServerError) -> Self {
        match error {
            ToolServerError::Server { .. } => Self::Remote,
            ToolServerError::Timeout(_) => Self::Timeout,
            ToolServerError::Transport(_)
            | ToolServerError::Protocol(_)
            | ToolServerError::NotConnected => Self::Transport,
        }
    }
}

/// Errors returned by connection and tool dispatch operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum McpError {
    /// A server could not be reached or initialized.
    #[error("Failed to connect to '{server}' at {url}: {reason}")]
    Connection {
        server: String,
        url: String,
        reason: String,
    },

    /// No tool with this name is in the catalog.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The owning server failed to execute the tool.
    #[error("Tool '{tool}' on '{server}' failed ({kind}): {message}")]
    ToolExecution {
        tool: String,
        server: String,
        kind: ToolErrorKind,
        message: String,
    },

    /// Two servers publish the same tool and the policy forbids it.
    #[error("Tool '{tool}' is published by both '{first}' and '{second}'")]
    ToolCollision {
        tool: String,
        first: String,
        second: String,
    },

    /// A server with this name is already configured.
    #[error("Server already configured: {0}")]
    DuplicateServer(String),

    /// No server with this name is configured.
    #[error("Server not configured: {0}")]
    ServerNotFound(String),

    /// Configuration validation error.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl McpError {
    /// Build a connection error for a server.
    pub fn connection(
        server: impl Into<String>,
        url: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::Connection {
            server: server.into(),
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a tool execution error from a session failure.
    pub fn tool_execution(
        tool: impl Into<String>,
        server: impl Into<String>,
        error: &ToolServerError,
    ) -> Self {
        let message = match error {
            ToolServerError::Server { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self::ToolExecution {
            tool: tool.into(),
            server: server.into(),
            kind: ToolErrorKind::from(error),
            message,
        }
    }

    /// Server the error refers to, when there is one.
    pub fn server_name(&self) -> Option<&str> {
        match self {
            Self::Connection { server, .. } | Self::ToolExecution { server, .. } => Some(server),
            Self::ToolCollision { second, .. } => Some(second),
            Self::DuplicateServer(name) | Self::ServerNotFound(name) => Some(name),
            Self::ToolNotFound(_) | Self::InvalidConfig(_) => None,
        }
    }
}

/// User-safe error information for events.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpErrorInfo {
    /// Name of the server, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,

    /// User-friendly error message.
    pub message: String,

    /// Error category for UI handling.
    pub category: McpErrorCategory,
}

/// Categories of tool client errors for UI handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum McpErrorCategory {
    /// Reaching or initializing a server failed.
    Connection,
    /// Tool lookup or invocation error.
    Tool,
    /// Configuration error.
    Configuration,
}

impl From<&McpError> for McpErrorCategory {
    fn from(error: &McpError) -> Self {
        match error {
            McpError::Connection { .. } => Self::Connection,
            McpError::ToolNotFound(_) | McpError::ToolExecution { .. } => Self::Tool,
            McpError::ToolCollision { .. }
            | McpError::DuplicateServer(_)
            | McpError::ServerNotFound(_)
            | McpError::InvalidConfig(_) => Self::Configuration,
        }
    }
}

impl From<&McpError> for McpErrorInfo {
    fn from(error: &McpError) -> Self {
        Self {
            server_name: error.server_name().map(str::to_string),
            message: error.to_string(),
            category: McpErrorCategory::from(error),
        }
    }
}
