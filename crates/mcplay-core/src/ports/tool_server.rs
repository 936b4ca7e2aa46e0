//! Tool server port definitions.
//!
//! A connector opens sessions against configured endpoints; a session lists
//! and invokes tools on one server. The MCP wire protocol lives behind these
//! traits in `mcplay-mcp`, so the catalog and dispatcher never see JSON-RPC.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::mcp::{ServerConfig, ToolCallResult, ToolDescriptor};

/// Errors raised by a tool server session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolServerError {
    /// The endpoint could not be reached or the stream broke.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with something that is not valid MCP.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server answered with a JSON-RPC error object.
    #[error("server error {code}: {message}")]
    Server { code: i64, message: String },

    /// No answer within the allotted time.
    #[error("timed out after {0} seconds")]
    Timeout(u64),

    /// The session has been closed.
    #[error("session is not connected")]
    NotConnected,
}

/// Port for opening sessions against tool servers.
#[async_trait]
pub trait ToolServerConnector: Send + Sync {
    /// Open a session and complete the protocol handshake.
    async fn connect(
        &self,
        config: &ServerConfig,
    ) -> Result<Arc<dyn ToolServerSession>, ToolServerError>;
}

/// An open session with one tool server.
#[async_trait]
pub trait ToolServerSession: Send + Sync {
    /// Name of the server this session belongs to.
    fn server_name(&self) -> &str;

    /// Tools published by the server, in the order the server lists them.
    ///
    /// Descriptors carry the server's own tool names; callers stamp
    /// ownership themselves.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolServerError>;

    /// Invoke a tool by its server-local name.
    ///
    /// A result flagged `is_error` is returned as `Ok`.
    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolCallResult, ToolServerError>;

    /// Close the session. Closing twice is a no-op.
    async fn close(&self) -> Result<(), ToolServerError>;
}
