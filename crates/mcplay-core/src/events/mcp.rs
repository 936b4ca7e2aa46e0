//! Connection lifecycle events.

use super::AppEvent;
use crate::ports::McpErrorInfo;

impl AppEvent {
    /// Create a servers connected event.
    pub const fn servers_connected(servers: Vec<String>, tool_count: usize) -> Self {
        Self::ServersConnected {
            servers,
            tool_count,
        }
    }

    /// Create a servers disconnected event.
    pub const fn servers_disconnected() -> Self {
        Self::ServersDisconnected
    }

    /// Create a connection failed event.
    pub const fn connection_failed(error: McpErrorInfo) -> Self {
        Self::ConnectionFailed { error }
    }

    /// Create a server removed event.
    pub fn server_removed(server_name: impl Into<String>) -> Self {
        Self::ServerRemoved {
            server_name: server_name.into(),
        }
    }
}
