//! MCP JSON-RPC 2.0 message types.
//!
//! Reference: <https://spec.modelcontextprotocol.io/>

use mcplay_core::{ToolCallResult, ToolDescriptor, ToolServerError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Protocol revision sent in `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Client name reported in `initialize`.
pub const CLIENT_NAME: &str = "mcplay";

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 notification (no id, no response).
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: Value,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params: params.unwrap_or_else(|| json!({})),
        }
    }
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Numeric request id, accepting ids echoed back as strings.
    pub fn id_u64(&self) -> Option<u64> {
        match self.id.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Unwrap the result, turning a JSON-RPC error into `ToolServerError::Server`.
    pub fn into_result(self) -> Result<Value, ToolServerError> {
        if let Some(err) = self.error {
            return Err(ToolServerError::Server {
                code: err.code,
                message: err.message,
            });
        }
        self.result
            .ok_or_else(|| ToolServerError::Protocol("Missing result in response".to_string()))
    }
}

/// Decode one inbound message.
///
/// Returns `Ok(None)` for server-initiated requests and notifications,
/// which this client does not handle.
pub fn decode_response(payload: &str) -> Result<Option<JsonRpcResponse>, ToolServerError> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| ToolServerError::Protocol(format!("Invalid JSON-RPC message: {e}")))?;

    if let Some(method) = value.get("method") {
        let method = method.as_str().unwrap_or_default();
        tracing::debug!(method, "Ignoring server-initiated message");
        return Ok(None);
    }

    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| ToolServerError::Protocol(format!("Invalid JSON-RPC response: {e}")))
}

/// MCP initialize result.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    #[serde(rename = "serverInfo", default)]
    pub server_info: Option<ServerInfo>,
    #[serde(default)]
    pub capabilities: ServerCapabilities,
}

/// Server information from initialize.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Server capabilities.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServerCapabilities {
    #[serde(default)]
    pub tools: Option<Value>,
}

impl ServerCapabilities {
    pub const fn supports_tools(&self) -> bool {
        self.tools.is_some()
    }
}

/// Tool entry from `tools/list`.
#[derive(Debug, Deserialize)]
struct McpToolSchema {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "inputSchema")]
    input_schema: Option<Value>,
}

/// Parameters of the `initialize` request.
pub fn initialize_params() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "clientInfo": {
            "name": CLIENT_NAME,
            "version": env!("CARGO_PKG_VERSION")
        },
        "capabilities": {}
    })
}

/// Parse a `tools/list` result, stamping each tool with its server.
pub fn parse_tools_list(result: &Value, server: &str) -> Result<Vec<ToolDescriptor>, ToolServerError> {
    let tools_value = result.get("tools").cloned().unwrap_or_else(|| json!([]));
    let tools: Vec<McpToolSchema> = serde_json::from_value(tools_value)
        .map_err(|e| ToolServerError::Protocol(format!("Invalid tools/list result: {e}")))?;

    Ok(tools
        .into_iter()
        .map(|t| ToolDescriptor {
            name: t.name,
            description: t.description,
            input_schema: t.input_schema,
            server: server.to_string(),
        })
        .collect())
}

/// Parse a `tools/call` result.
///
/// `isError` results are kept as-is; the server's text stays in the content.
pub fn parse_call_result(result: &Value) -> ToolCallResult {
    let content = result.get("content").cloned().unwrap_or_else(|| json!([]));
    let is_error = result
        .get("isError")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut call_result = ToolCallResult {
        is_error,
        content,
        structured_content: None,
    };
    if let Some(structured) = result.get("structuredContent").filter(|v| !v.is_null()) {
        call_result = call_result.with_structured_content(structured.clone());
    }
    call_result
}
