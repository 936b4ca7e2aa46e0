//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` or `reqwest` types in any signature
//! - No JSON-RPC details in the tool server port
//! - Repository traits are minimal

pub mod chat_sessions;
pub mod event_emitter;
pub mod mcp_error;
pub mod tool_server;

pub use chat_sessions::{ChatSessionRepository, ChatStoreError, InMemoryChatRepository};
pub use event_emitter::{AppEventEmitter, NoopEmitter};
pub use mcp_error::{McpError, McpErrorCategory, McpErrorInfo, ToolErrorKind};
pub use tool_server::{ToolServerConnector, ToolServerError, ToolServerSession};
