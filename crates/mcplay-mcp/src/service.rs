//! High-level tool client service.
//!
//! Wraps the connection manager with event emission and logging. This is
//! the interface the runtime facade and the CLI use.

use std::sync::Arc;

use mcplay_core::{
    AppEvent, AppEventEmitter, ConnectionStatus, McpError, McpErrorInfo, ServerConfig,
    ToolCallResult, ToolDescriptor, ToolServerConnector,
};
use serde_json::{Map, Value};

use crate::catalog::ToolCatalog;
use crate::manager::{ConnectionManager, ConnectionOptions};

/// Tool client service providing connection management and tool dispatch.
pub struct McpService {
    manager: ConnectionManager,
    emitter: Arc<dyn AppEventEmitter>,
}

impl McpService {
    /// Create a new service with injected dependencies.
    pub fn new(
        connector: Arc<dyn ToolServerConnector>,
        options: ConnectionOptions,
        emitter: Arc<dyn AppEventEmitter>,
    ) -> Self {
        Self {
            manager: ConnectionManager::with_options(connector, options),
            emitter,
        }
    }

    /// Register endpoints without connecting.
    pub async fn configure(&self, servers: Vec<ServerConfig>) -> Result<(), McpError> {
        for server in servers {
            self.manager.add_server(server).await?;
        }
        Ok(())
    }

    /// Connect to every configured endpoint.
    pub async fn connect(&self) -> Result<ToolCatalog, McpError> {
        let result = self.manager.reconnect().await;
        self.report_connect(result).await
    }

    /// Replace the configured endpoints and connect to all of them.
    pub async fn connect_all(&self, configs: Vec<ServerConfig>) -> Result<ToolCatalog, McpError> {
        let result = self.manager.connect_all(configs).await;
        self.report_connect(result).await
    }

    async fn report_connect(
        &self,
        result: Result<ToolCatalog, McpError>,
    ) -> Result<ToolCatalog, McpError> {
        match &result {
            Ok(catalog) => {
                let status = self.manager.status().await;
                self.emitter.emit(AppEvent::servers_connected(
                    status.connected_servers,
                    catalog.len(),
                ));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to tool servers");
                self.emitter
                    .emit(AppEvent::connection_failed(McpErrorInfo::from(e)));
            }
        }
        result
    }

    /// Release every session.
    pub async fn disconnect(&self) {
        self.manager.disconnect_all().await;
        self.emitter.emit(AppEvent::servers_disconnected());
    }

    /// Add an endpoint; it is connected on the next connect.
    pub async fn add_server(&self, config: ServerConfig) -> Result<(), McpError> {
        let name = config.name.clone();
        self.manager.add_server(config).await?;
        tracing::info!(server_name = %name, "Added tool server configuration");
        Ok(())
    }

    /// Remove an endpoint, closing its session if connected.
    pub async fn remove_server(&self, name: &str) -> Result<ServerConfig, McpError> {
        let removed = self.manager.remove_server(name).await?;
        self.emitter.emit(AppEvent::server_removed(name));
        Ok(removed)
    }

    /// Invoke a tool by catalog name.
    pub async fn invoke(
        &self,
        tool_name: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolCallResult, McpError> {
        self.manager.invoke(tool_name, arguments).await
    }

    /// Invoke a tool with a JSON value as arguments.
    ///
    /// `null` means no arguments; anything else must be an object.
    pub async fn invoke_value(
        &self,
        tool_name: &str,
        arguments: Value,
    ) -> Result<ToolCallResult, McpError> {
        let arguments = match arguments {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(McpError::InvalidConfig(format!(
                    "Tool arguments must be a JSON object, got {other}"
                )));
            }
        };
        self.invoke(tool_name, arguments).await
    }

    /// Tools in catalog order.
    pub async fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.manager.catalog().await.tools()
    }

    /// Snapshot of the catalog.
    pub async fn catalog(&self) -> ToolCatalog {
        self.manager.catalog().await
    }

    pub async fn is_connected(&self) -> bool {
        self.manager.is_connected().await
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.manager.status().await
    }

    pub async fn servers(&self) -> Vec<ServerConfig> {
        self.manager.servers().await
    }

    /// Disconnect everything (shutdown hook).
    pub async fn shutdown(&self) {
        if self.is_connected().await {
            self.disconnect().await;
        }
    }
}
