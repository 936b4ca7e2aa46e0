//! MCP JSON-RPC client for communicating with MCP servers over HTTP.
//!
//! Implements the `ToolServerSession` port on top of a `Transport`.
//! Reference: <https://spec.modelcontextprotocol.io/>

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mcplay_core::{ToolCallResult, ToolDescriptor, ToolServerError, ToolServerSession};
use serde_json::{Map, Value, json};

use crate::protocol::{
    InitializeResult, JsonRpcNotification, JsonRpcRequest, ServerCapabilities, ServerInfo,
    initialize_params, parse_call_result, parse_tools_list,
};
use crate::transport::Transport;

/// Client for one MCP server.
pub struct McpClient {
    server_name: String,
    transport: Box<dyn Transport>,
    request_id: AtomicU64,
    request_timeout: Duration,
    capabilities: ServerCapabilities,
    server_info: Option<ServerInfo>,
    protocol_version: Option<String>,
    closed: AtomicBool,
}

impl McpClient {
    /// Open a session over `transport` and run the initialize handshake.
    ///
    /// The transport is closed if the handshake fails.
    pub async fn connect(
        server_name: impl Into<String>,
        transport: Box<dyn Transport>,
        request_timeout: Duration,
    ) -> Result<Self, ToolServerError> {
        let mut client = Self {
            server_name: server_name.into(),
            transport,
            request_id: AtomicU64::new(1),
            request_timeout,
            capabilities: ServerCapabilities::default(),
            server_info: None,
            protocol_version: None,
            closed: AtomicBool::new(false),
        };

        if let Err(e) = client.initialize().await {
            client.transport.close().await;
            return Err(e);
        }
        Ok(client)
    }

    /// Send the initialize request and the initialized notification.
    async fn initialize(&mut self) -> Result<(), ToolServerError> {
        let result = self.request("initialize", Some(initialize_params())).await?;
        let result: InitializeResult = serde_json::from_value(result)
            .map_err(|e| ToolServerError::Protocol(format!("Invalid initialize result: {e}")))?;

        tracing::debug!(
            server_name = %self.server_name,
            protocol_version = %result.protocol_version,
            supports_tools = result.capabilities.supports_tools(),
            "MCP session initialized"
        );

        self.capabilities = result.capabilities;
        self.server_info = result.server_info;
        self.protocol_version = Some(result.protocol_version);

        self.transport
            .notify(JsonRpcNotification::new("notifications/initialized", None))
            .await
    }

    /// Send a JSON-RPC request and wait for its result.
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, ToolServerError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ToolServerError::NotConnected);
        }

        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(id, method, params);

        let response = tokio::time::timeout(self.request_timeout, self.transport.request(request))
            .await
            .map_err(|_| ToolServerError::Timeout(self.request_timeout.as_secs()))??;

        response.into_result()
    }

    /// Server info reported during initialize.
    pub const fn server_info(&self) -> Option<&ServerInfo> {
        self.server_info.as_ref()
    }

    /// Negotiated protocol version.
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }
}

#[async_trait]
impl ToolServerSession for McpClient {
    fn server_name(&self) -> &str {
        &self.server_name
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolServerError> {
        if !self.capabilities.supports_tools() {
            return Ok(Vec::new());
        }
        let result = self.request("tools/list", None).await?;
        parse_tools_list(&result, &self.server_name)
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolCallResult, ToolServerError> {
        let params = json!({
            "name": name,
            "arguments": arguments
        });
        let result = self.request("tools/call", Some(params)).await?;
        Ok(parse_call_result(&result))
    }

    async fn close(&self) -> Result<(), ToolServerError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.transport.close().await;
        tracing::debug!(server_name = %self.server_name, "MCP session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{JsonRpcResponse, decode_response};
    use std::sync::Mutex;

    /// Transport answering from a canned method -> result table.
    struct ScriptedTransport {
        capabilities: Value,
        sent: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(capabilities: Value) -> Self {
            Self {
                capabilities,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn request(
            &self,
            request: JsonRpcRequest,
        ) -> Result<JsonRpcResponse, ToolServerError> {
            self.sent.lock().unwrap().push(request.method.clone());
            let body = match request.method.as_str() {
                "initialize" => json!({
                    "jsonrpc": "2.0", "id": request.id,
                    "result": { "protocolVersion": "2024-11-05", "capabilities": self.capabilities }
                }),
                "tools/list" => json!({
                    "jsonrpc": "2.0", "id": request.id,
                    "result": { "tools": [{ "name": "foo" }] }
                }),
                "tools/call" => json!({
                    "jsonrpc": "2.0", "id": request.id,
                    "error": { "code": -32602, "message": "Unknown tool" }
                }),
                _ => unreachable!(),
            };
            Ok(decode_response(&body.to_string()).unwrap().unwrap())
        }

        async fn notify(&self, notification: JsonRpcNotification) -> Result<(), ToolServerError> {
            self.sent.lock().unwrap().push(notification.method);
            Ok(())
        }

        async fn close(&self) {}
    }

    #[tokio::test]
    async fn test_handshake_and_list_tools() {
        let client = McpClient::connect(
            "a",
            Box::new(ScriptedTransport::new(json!({ "tools": {} }))),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(client.protocol_version(), Some("2024-11-05"));
        let tools = client.list_tools().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].server, "a");
    }

    #[tokio::test]
    async fn test_list_tools_skipped_without_capability() {
        let client = McpClient::connect(
            "a",
            Box::new(ScriptedTransport::new(json!({}))),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert!(client.list_tools().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_rpc_error_surfaces_as_server_error() {
        let client = McpClient::connect(
            "a",
            Box::new(ScriptedTransport::new(json!({ "tools": {} }))),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        let err = client.call_tool("nope", Map::new()).await.unwrap_err();
        assert_eq!(
            err,
            ToolServerError::Server {
                code: -32602,
                message: "Unknown tool".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_closed_session_rejects_requests() {
        let client = McpClient::connect(
            "a",
            Box::new(ScriptedTransport::new(json!({ "tools": {} }))),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        client.close().await.unwrap();
        client.close().await.unwrap();
        assert_eq!(
            client.list_tools().await.unwrap_err(),
            ToolServerError::NotConnected
        );
    }
}
