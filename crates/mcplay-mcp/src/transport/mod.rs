//! Wire transports for the MCP client.
//!
//! - `streamable` - POST every message to one URL; JSON or SSE responses
//! - `legacy_sse` - GET an event stream, POST to the endpoint it announces

mod legacy_sse;
mod streamable;

use async_trait::async_trait;
use mcplay_core::ToolServerError;

use crate::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

pub use legacy_sse::SseTransport;
pub use streamable::StreamableHttpTransport;

/// Header carrying the streamable HTTP session id.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// `Accept` value for POSTed messages.
const ACCEPT_JSON_AND_SSE: &str = "application/json, text/event-stream";

/// One JSON-RPC message exchange channel.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for the matching response.
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, ToolServerError>;

    /// Send a notification.
    async fn notify(&self, notification: JsonRpcNotification) -> Result<(), ToolServerError>;

    /// Release the channel. Best-effort.
    async fn close(&self);
}

fn transport_error(error: &reqwest::Error) -> ToolServerError {
    ToolServerError::Transport(error.to_string())
}

fn check_status(response: &reqwest::Response) -> Result<(), ToolServerError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ToolServerError::Transport(format!("HTTP error: {status}")))
    }
}

fn content_type(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
