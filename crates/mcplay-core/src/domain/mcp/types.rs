//! Tool server domain types.
//!
//! These types are shared by the connection manager, the dispatcher and
//! whatever renders the catalog.

use serde::{Deserialize, Serialize};

/// Wire transport used to reach a tool server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Single-endpoint HTTP transport (POST requests, JSON or SSE responses).
    #[default]
    StreamableHttp,
    /// Legacy SSE transport: GET an event stream, POST to the announced endpoint.
    Sse,
}

impl TransportKind {
    /// Infer the transport from an endpoint URL.
    ///
    /// Endpoints whose path ends in `/sse` speak the legacy SSE transport;
    /// everything else is treated as streamable HTTP.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path.trim_end_matches('/').ends_with("/sse") {
            Self::Sse
        } else {
            Self::StreamableHttp
        }
    }
}

/// Configuration for one tool server endpoint.
///
/// `name` is the unique key within the active configuration set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// User-friendly, unique name for the server.
    pub name: String,

    /// Endpoint URL (e.g. `http://localhost:8002/sse`).
    pub url: String,
}

impl ServerConfig {
    /// Create a server configuration.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Transport implied by the URL.
    pub fn transport(&self) -> TransportKind {
        TransportKind::from_url(&self.url)
    }

    /// Validate the configuration.
    ///
    /// Returns a human-readable message describing the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Server name cannot be empty".to_string());
        }

        let rest = self
            .url
            .strip_prefix("http://")
            .or_else(|| self.url.strip_prefix("https://"))
            .ok_or_else(|| format!("Server url must start with http:// or https://: {}", self.url))?;

        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if host.is_empty() {
            return Err(format!("Server url has no host: {}", self.url));
        }

        Ok(())
    }
}

/// Tool definition published by a tool server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name as addressed in the catalog.
    pub name: String,

    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON Schema for input parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<serde_json::Value>,

    /// Name of the server that owns this tool.
    #[serde(default)]
    pub server: String,
}

impl ToolDescriptor {
    /// Create a new tool definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: None,
            server: String::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Set the input schema.
    #[must_use]
    pub fn with_input_schema(mut self, schema: serde_json::Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    /// Set the owning server.
    #[must_use]
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// Description, or an empty string when the server sent none.
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// Result of a tool call, as reported by the server.
///
/// A result with `is_error` set is still a successful round trip: the server
/// ran the tool and reported a structured failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Whether the server flagged the result as an error.
    pub is_error: bool,

    /// MCP content items (`[{"type": "text", "text": ...}, ...]`).
    pub content: serde_json::Value,

    /// Optional structured payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<serde_json::Value>,
}

impl ToolCallResult {
    /// Create a success result.
    #[must_use]
    pub const fn success(content: serde_json::Value) -> Self {
        Self {
            is_error: false,
            content,
            structured_content: None,
        }
    }

    /// Create an error result carrying the server's message as text content.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            content: serde_json::json!([{ "type": "text", "text": message.into() }]),
            structured_content: None,
        }
    }

    /// Attach a structured payload.
    #[must_use]
    pub fn with_structured_content(mut self, value: serde_json::Value) -> Self {
        self.structured_content = Some(value);
        self
    }

    /// Concatenated text of all text content items.
    pub fn text(&self) -> String {
        self.content
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("text").and_then(serde_json::Value::as_str))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }

    /// Best structured view of the payload.
    ///
    /// Prefers `structured_content`; otherwise tries to parse the first text
    /// item as JSON, falling back to the raw content.
    pub fn payload(&self) -> serde_json::Value {
        if let Some(structured) = &self.structured_content {
            return structured.clone();
        }
        let text = self.text();
        serde_json::from_str(&text).unwrap_or_else(|_| self.content.clone())
    }

    /// Message to surface when `is_error` is set.
    pub fn error_message(&self) -> Option<String> {
        if !self.is_error {
            return None;
        }
        let text = self.text();
        Some(if text.is_empty() {
            "Unknown error".to_string()
        } else {
            text
        })
    }
}

/// What to do when two servers publish a tool with the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The later server in connection order shadows the earlier one.
    #[default]
    LastWins,
    /// Fail aggregation (and therefore connect-all).
    Reject,
    /// Publish every tool as `<server>.<tool>`.
    Namespace,
}

/// Read model of the connection state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Names of servers with a live session, in connection order.
    pub connected_servers: Vec<String>,
    /// Number of tools in the aggregated catalog.
    pub tool_count: usize,
}

impl ConnectionStatus {
    /// Whether any session is open.
    pub fn is_connected(&self) -> bool {
        !self.connected_servers.is_empty()
    }
}
