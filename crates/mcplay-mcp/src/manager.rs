//! Tool server connection lifecycle and tool dispatch.
//!
//! The manager owns the configured endpoints, one session per connected
//! endpoint and the aggregated catalog. Connect-all is all-or-nothing: after
//! it returns, either every configured server has a session and contributes
//! to the catalog, or nothing is connected.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use mcplay_core::{
    ClientConfig, CollisionPolicy, ConnectionStatus, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_TOOL_TIMEOUT_SECS, McpError, ServerConfig, ToolCallResult, ToolDescriptor,
    ToolServerConnector, ToolServerError, ToolServerSession,
};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};

use crate::catalog::ToolCatalog;

/// Tunables for the connection manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub collision_policy: CollisionPolicy,
    pub connect_timeout: Duration,
    pub tool_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            collision_policy: CollisionPolicy::default(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
        }
    }
}

impl From<&ClientConfig> for ConnectionOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            collision_policy: config.collision_policy,
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            tool_timeout: Duration::from_secs(config.tool_timeout_secs),
        }
    }
}

/// A live session and the tools it published.
struct ServerSession {
    name: String,
    session: Arc<dyn ToolServerSession>,
    tools: Vec<ToolDescriptor>,
}

#[derive(Default)]
struct ConnectionState {
    configs: Vec<ServerConfig>,
    /// Connection order.
    sessions: Vec<ServerSession>,
    catalog: ToolCatalog,
}

impl ConnectionState {
    fn session(&self, name: &str) -> Option<&ServerSession> {
        self.sessions.iter().find(|s| s.name == name)
    }

    fn tool_lists(&self) -> Vec<(String, Vec<ToolDescriptor>)> {
        self.sessions
            .iter()
            .map(|s| (s.name.clone(), s.tools.clone()))
            .collect()
    }

    fn take_sessions(&mut self) -> Vec<ServerSession> {
        self.catalog = ToolCatalog::new();
        std::mem::take(&mut self.sessions)
    }

    fn check_invariants(&self) {
        debug_assert!(
            self.sessions
                .iter()
                .all(|s| self.configs.iter().any(|c| c.name == s.name)),
            "session without a configuration"
        );
        debug_assert!(
            self.catalog
                .entries()
                .iter()
                .all(|e| self.session(e.server()).is_some()),
            "catalog entry without a session"
        );
        debug_assert!(
            !self.sessions.is_empty() || self.catalog.is_empty(),
            "catalog populated while disconnected"
        );
    }
}

/// Manager for tool server sessions and the aggregated catalog.
pub struct ConnectionManager {
    connector: Arc<dyn ToolServerConnector>,
    options: ConnectionOptions,
    state: RwLock<ConnectionState>,
    /// Serializes connect, disconnect and remove.
    lifecycle: Mutex<()>,
}

impl ConnectionManager {
    /// Create a manager with default options.
    pub fn new(connector: Arc<dyn ToolServerConnector>) -> Self {
        Self::with_options(connector, ConnectionOptions::default())
    }

    /// Create a manager with explicit options.
    pub fn with_options(connector: Arc<dyn ToolServerConnector>, options: ConnectionOptions) -> Self {
        Self {
            connector,
            options,
            state: RwLock::new(ConnectionState::default()),
            lifecycle: Mutex::new(()),
        }
    }

    pub const fn options(&self) -> ConnectionOptions {
        self.options
    }

    /// Replace the configured endpoints and connect to all of them.
    ///
    /// Any previous connection is torn down first. On the first failure every
    /// session opened so far is closed, the state is left disconnected and the
    /// error names the failing endpoint.
    pub async fn connect_all(&self, configs: Vec<ServerConfig>) -> Result<ToolCatalog, McpError> {
        validate_configs(&configs)?;
        let _lifecycle = self.lifecycle.lock().await;

        let previous = {
            let mut state = self.state.write().await;
            state.configs.clone_from(&configs);
            let previous = state.take_sessions();
            state.check_invariants();
            previous
        };
        close_sessions(previous).await;

        let mut opened: Vec<ServerSession> = Vec::with_capacity(configs.len());
        for config in &configs {
            match self.open(config).await {
                Ok(session) => opened.push(session),
                Err(e) => {
                    tracing::warn!(
                        server_name = %config.name,
                        url = %config.url,
                        error = %e,
                        "Connect failed, closing opened sessions"
                    );
                    close_sessions(opened).await;
                    return Err(e);
                }
            }
        }

        let tool_lists: Vec<(String, Vec<ToolDescriptor>)> = opened
            .iter()
            .map(|s| (s.name.clone(), s.tools.clone()))
            .collect();
        let catalog = match ToolCatalog::aggregate(&tool_lists, self.options.collision_policy) {
            Ok(catalog) => catalog,
            Err(e) => {
                close_sessions(opened).await;
                return Err(e);
            }
        };

        let mut state = self.state.write().await;
        state.sessions = opened;
        state.catalog = catalog.clone();
        state.check_invariants();
        drop(state);

        tracing::info!(
            server_count = configs.len(),
            tool_count = catalog.len(),
            "Connected to tool servers"
        );
        Ok(catalog)
    }

    /// Connect to the currently configured endpoints.
    pub async fn reconnect(&self) -> Result<ToolCatalog, McpError> {
        let configs = self.servers().await;
        self.connect_all(configs).await
    }

    /// Release every session. Close failures are logged and skipped.
    pub async fn disconnect_all(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        let sessions = {
            let mut state = self.state.write().await;
            let sessions = state.take_sessions();
            state.check_invariants();
            sessions
        };
        if !sessions.is_empty() {
            tracing::info!(server_count = sessions.len(), "Disconnecting tool servers");
        }
        close_sessions(sessions).await;
    }

    /// Add an endpoint. It is connected on the next connect.
    pub async fn add_server(&self, config: ServerConfig) -> Result<(), McpError> {
        config
            .validate()
            .map_err(|reason| McpError::InvalidConfig(format!("{}: {reason}", config.name)))?;

        let mut state = self.state.write().await;
        if state.configs.iter().any(|c| c.name == config.name) {
            return Err(McpError::DuplicateServer(config.name));
        }
        tracing::debug!(server_name = %config.name, url = %config.url, "Added server");
        state.configs.push(config);
        state.check_invariants();
        Ok(())
    }

    /// Remove an endpoint, closing its session and re-aggregating the catalog.
    pub async fn remove_server(&self, name: &str) -> Result<ServerConfig, McpError> {
        let _lifecycle = self.lifecycle.lock().await;

        let (removed, session) = {
            let mut state = self.state.write().await;
            let position = state
                .configs
                .iter()
                .position(|c| c.name == name)
                .ok_or_else(|| McpError::ServerNotFound(name.to_string()))?;

            let session_position = state.sessions.iter().position(|s| s.name == name);
            if let Some(session_position) = session_position {
                let mut remaining = state.tool_lists();
                remaining.remove(session_position);
                state.catalog =
                    ToolCatalog::aggregate(&remaining, self.options.collision_policy)?;
            }

            let removed = state.configs.remove(position);
            let session = session_position.map(|p| state.sessions.remove(p));
            state.check_invariants();
            (removed, session)
        };

        if let Some(session) = session {
            close_sessions(vec![session]).await;
        }
        tracing::info!(server_name = %name, "Removed server");
        Ok(removed)
    }

    /// Invoke a tool by catalog name.
    ///
    /// Unknown names fail without contacting any server. The owning server's
    /// result is returned verbatim, including results flagged `is_error`.
    pub async fn invoke(
        &self,
        tool_name: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolCallResult, McpError> {
        let (session, server, remote_name) = {
            let state = self.state.read().await;
            let entry = state
                .catalog
                .get(tool_name)
                .ok_or_else(|| McpError::ToolNotFound(tool_name.to_string()))?;
            let session = state
                .session(entry.server())
                .map(|s| Arc::clone(&s.session))
                .ok_or_else(|| McpError::ToolNotFound(tool_name.to_string()))?;
            (session, entry.server().to_string(), entry.remote_name.clone())
        };

        tracing::debug!(tool = %tool_name, server_name = %server, "Invoking tool");
        let deadline = self.options.tool_timeout;
        let call = session.call_tool(&remote_name, arguments);
        let result = match tokio::time::timeout(deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(ToolServerError::Timeout(deadline.as_secs())),
        };

        result.map_err(|e| {
            tracing::warn!(tool = %tool_name, server_name = %server, error = %e, "Tool call failed");
            McpError::tool_execution(tool_name, &server, &e)
        })
    }

    /// Whether any session is open.
    pub async fn is_connected(&self) -> bool {
        !self.state.read().await.sessions.is_empty()
    }

    /// Configured endpoints, in configuration order.
    pub async fn servers(&self) -> Vec<ServerConfig> {
        self.state.read().await.configs.clone()
    }

    /// Snapshot of the aggregated catalog.
    pub async fn catalog(&self) -> ToolCatalog {
        self.state.read().await.catalog.clone()
    }

    /// Connected server names and tool count.
    pub async fn status(&self) -> ConnectionStatus {
        let state = self.state.read().await;
        ConnectionStatus {
            connected_servers: state.sessions.iter().map(|s| s.name.clone()).collect(),
            tool_count: state.catalog.len(),
        }
    }

    /// Open one session and fetch its tools, bounded by the connect timeout.
    async fn open(&self, config: &ServerConfig) -> Result<ServerSession, McpError> {
        let deadline = self.options.connect_timeout;
        let attempt = connect_and_list(self.connector.as_ref(), config);

        let (session, tools) = match tokio::time::timeout(deadline, attempt).await {
            Ok(Ok(opened)) => opened,
            Ok(Err(e)) => return Err(McpError::connection(&config.name, &config.url, e)),
            Err(_) => {
                return Err(McpError::connection(
                    &config.name,
                    &config.url,
                    ToolServerError::Timeout(deadline.as_secs()),
                ));
            }
        };

        tracing::info!(
            server_name = %config.name,
            tool_count = tools.len(),
            "Tool server connected"
        );
        Ok(ServerSession {
            name: config.name.clone(),
            session,
            tools: tools
                .into_iter()
                .map(|t| t.with_server(config.name.clone()))
                .collect(),
        })
    }
}

async fn connect_and_list(
    connector: &dyn ToolServerConnector,
    config: &ServerConfig,
) -> Result<(Arc<dyn ToolServerSession>, Vec<ToolDescriptor>), ToolServerError> {
    let session = connector.connect(config).await?;
    match session.list_tools().await {
        Ok(tools) => Ok((session, tools)),
        Err(e) => {
            if let Err(close_error) = session.close().await {
                tracing::warn!(
                    server_name = %config.name,
                    error = %close_error,
                    "Failed to close session after tool listing failed"
                );
            }
            Err(e)
        }
    }
}

fn validate_configs(configs: &[ServerConfig]) -> Result<(), McpError> {
    let mut seen = HashSet::new();
    for config in configs {
        config
            .validate()
            .map_err(|reason| McpError::InvalidConfig(format!("{}: {reason}", config.name)))?;
        if !seen.insert(config.name.as_str()) {
            return Err(McpError::DuplicateServer(config.name.clone()));
        }
    }
    Ok(())
}

async fn close_sessions(sessions: Vec<ServerSession>) {
    for server in sessions {
        if let Err(e) = server.session.close().await {
            tracing::warn!(server_name = %server.name, error = %e, "Failed to close session");
        }
    }
}
