//! Canonical event union for state changes the rendering layer cares about.
//!
//! # Structure
//!
//! - `mcp` - Connection lifecycle events
//! - `chat` - Chat session events
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag:
//!
//! ```json
//! { "type": "servers_connected", "servers": ["ga4"], "toolCount": 4 }
//! ```

mod chat;
mod mcp;

use serde::{Deserialize, Serialize};

use crate::domain::chat::ChatId;
use crate::ports::McpErrorInfo;

/// Canonical event types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    // ========== Connection Events ==========
    /// Every configured server is connected and the catalog is rebuilt.
    ServersConnected {
        servers: Vec<String>,
        #[serde(rename = "toolCount")]
        tool_count: usize,
    },

    /// All sessions were released.
    ServersDisconnected,

    /// Connect-all failed; the state is disconnected.
    ConnectionFailed { error: McpErrorInfo },

    /// A server was removed from the configuration.
    ServerRemoved {
        #[serde(rename = "serverName")]
        server_name: String,
    },

    // ========== Chat Events ==========
    /// A chat session was created and selected.
    ChatCreated {
        #[serde(rename = "chatId")]
        chat_id: ChatId,
        #[serde(rename = "chatName")]
        chat_name: String,
    },

    /// A chat session was deleted.
    ChatDeleted {
        #[serde(rename = "chatId")]
        chat_id: ChatId,
    },

    /// The current chat changed (`None` when nothing is selected).
    ChatSelected {
        #[serde(rename = "chatId")]
        chat_id: Option<ChatId>,
    },
}

impl AppEvent {
    /// Event type name, matching the serialized `type` tag.
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::ServersConnected { .. } => "servers_connected",
            Self::ServersDisconnected => "servers_disconnected",
            Self::ConnectionFailed { .. } => "connection_failed",
            Self::ServerRemoved { .. } => "server_removed",
            Self::ChatCreated { .. } => "chat_created",
            Self::ChatDeleted { .. } => "chat_deleted",
            Self::ChatSelected { .. } => "chat_selected",
        }
    }
}
