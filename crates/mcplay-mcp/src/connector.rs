//! HTTP connector: opens MCP sessions for configured endpoints.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mcplay_core::{
    DEFAULT_TOOL_TIMEOUT_SECS, ServerConfig, ToolServerConnector, ToolServerError,
    ToolServerSession, TransportKind,
};

use crate::client::McpClient;
use crate::transport::{SseTransport, StreamableHttpTransport, Transport};

/// Connector speaking MCP over HTTP.
///
/// The transport is chosen from the endpoint URL (see `TransportKind`).
#[derive(Clone)]
pub struct HttpMcpConnector {
    client: reqwest::Client,
    request_timeout: Duration,
}

impl HttpMcpConnector {
    /// Create a connector with its own HTTP client.
    pub fn new(request_timeout: Duration) -> Result<Self, ToolServerError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mcplay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ToolServerError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, request_timeout))
    }

    /// Create a connector around an existing HTTP client.
    pub const fn with_client(client: reqwest::Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl std::fmt::Debug for HttpMcpConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMcpConnector")
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl Default for HttpMcpConnector {
    fn default() -> Self {
        Self::with_client(
            reqwest::Client::new(),
            Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
        )
    }
}

#[async_trait]
impl ToolServerConnector for HttpMcpConnector {
    async fn connect(
        &self,
        config: &ServerConfig,
    ) -> Result<Arc<dyn ToolServerSession>, ToolServerError> {
        let transport: Box<dyn Transport> = match config.transport() {
            TransportKind::StreamableHttp => Box::new(StreamableHttpTransport::new(
                self.client.clone(),
                config.url.clone(),
            )),
            TransportKind::Sse => Box::new(
                SseTransport::connect(self.client.clone(), &config.url, self.request_timeout)
                    .await?,
            ),
        };

        tracing::debug!(
            server_name = %config.name,
            url = %config.url,
            transport = ?config.transport(),
            "Opening MCP session"
        );

        let client = McpClient::connect(config.name.clone(), transport, self.request_timeout).await?;
        Ok(Arc::new(client))
    }
}
