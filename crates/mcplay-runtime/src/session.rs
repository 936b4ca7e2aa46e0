//! Playground session: the long-lived application object.
//!
//! Owns the execution bridge, the tool client service, the chat sessions,
//! the tool hints and the model parameters. Every method is synchronous and
//! runs its async work through the bridge, so interactive front ends can call
//! it from a plain loop. Safe to share across threads; calls from different
//! threads are not ordered relative to each other.

use std::sync::{Arc, Mutex, PoisonError};

use mcplay_core::{
    AppEventEmitter, ChatId, ChatSession, ChatSessionRepository, ChatSessionService,
    ChatStoreError, ChatTurn, ClientConfig, ConnectionStatus, McpError, ModelParams,
    PropertyOption, ServerConfig, ToolCallResult, ToolDescriptor, ToolHint, ToolHintRegistry,
    ToolParameter, ToolServerConnector, extract_parameters, parse_property_options,
};
use mcplay_mcp::{ConnectionOptions, McpService};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::bridge::{BridgeError, ExecutionBridge};

/// Errors surfaced by the playground session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Mcp(#[from] McpError),

    #[error(transparent)]
    Chat(#[from] ChatStoreError),

    /// Model parameters failed validation.
    #[error("Invalid model parameters: {0}")]
    InvalidModel(String),

    /// A property options provider returned something unusable.
    #[error("Failed to load options from '{tool}': {reason}")]
    PropertyOptions { tool: String, reason: String },
}

/// Collaborators needed to open a session.
pub struct SessionParts {
    pub connector: Arc<dyn ToolServerConnector>,
    pub repository: Arc<dyn ChatSessionRepository>,
    pub emitter: Arc<dyn AppEventEmitter>,
    pub config: ClientConfig,
    pub hints: ToolHintRegistry,
}

/// Synchronous facade over the tool client and chat sessions.
pub struct PlaygroundSession {
    mcp: McpService,
    chats: ChatSessionService,
    hints: ToolHintRegistry,
    model: Mutex<ModelParams>,
    history_limit: usize,
    // Dropped last.
    bridge: ExecutionBridge,
}

impl PlaygroundSession {
    /// Build the session: register configured servers and load stored chats.
    ///
    /// Nothing is connected yet; call `connect`.
    pub fn open(parts: SessionParts) -> Result<Self, SessionError> {
        Self::open_on(ExecutionBridge::new(), parts)
    }

    /// Like `open`, reusing a bridge the caller already ran setup work on.
    pub fn open_on(bridge: ExecutionBridge, parts: SessionParts) -> Result<Self, SessionError> {
        let SessionParts {
            connector,
            repository,
            emitter,
            config,
            hints,
        } = parts;
        config.model.validate().map_err(SessionError::InvalidModel)?;

        let mcp = McpService::new(
            connector,
            ConnectionOptions::from(&config),
            Arc::clone(&emitter),
        );
        bridge.run(mcp.configure(config.servers.clone()))??;
        let chats = bridge.run(ChatSessionService::load_with_emitter(repository, emitter))??;

        tracing::info!(
            server_count = config.servers.len(),
            provider = %config.model.provider,
            "Playground session opened"
        );

        Ok(Self {
            mcp,
            chats,
            hints,
            model: Mutex::new(config.model),
            history_limit: config.history_limit,
            bridge,
        })
    }

    // ========== Connection ==========

    /// Connect every configured server and rebuild the catalog.
    pub fn connect(&self) -> Result<ConnectionStatus, SessionError> {
        self.bridge.run(self.mcp.connect())??;
        self.status()
    }

    /// Release every server session.
    pub fn disconnect(&self) -> Result<(), SessionError> {
        self.bridge.run(self.mcp.disconnect())?;
        Ok(())
    }

    /// Add a server; it is connected on the next `connect`.
    pub fn add_server(&self, config: ServerConfig) -> Result<(), SessionError> {
        Ok(self.bridge.run(self.mcp.add_server(config))??)
    }

    /// Remove a server, closing its session if connected.
    pub fn remove_server(&self, name: &str) -> Result<ServerConfig, SessionError> {
        Ok(self.bridge.run(self.mcp.remove_server(name))??)
    }

    pub fn servers(&self) -> Result<Vec<ServerConfig>, SessionError> {
        Ok(self.bridge.run(self.mcp.servers())?)
    }

    pub fn status(&self) -> Result<ConnectionStatus, SessionError> {
        Ok(self.bridge.run(self.mcp.status())?)
    }

    // ========== Tools ==========

    /// Catalog tools in order.
    pub fn tools(&self) -> Result<Vec<ToolDescriptor>, SessionError> {
        Ok(self.bridge.run(self.mcp.list_tools())?)
    }

    /// Parameters of a catalog tool, or `None` when it is not in the catalog.
    pub fn tool_parameters(&self, name: &str) -> Result<Option<Vec<ToolParameter>>, SessionError> {
        let catalog = self.bridge.run(self.mcp.catalog())?;
        Ok(catalog
            .get(name)
            .map(|entry| extract_parameters(&entry.descriptor)))
    }

    pub fn hint_for(&self, tool: &str) -> ToolHint {
        self.hints.hint_for(tool)
    }

    /// Selectable properties for a tool that needs one.
    ///
    /// Returns an empty list when no options provider is registered.
    pub fn property_options(&self, tool: &str) -> Result<Vec<PropertyOption>, SessionError> {
        let Some(provider) = self.hints.options_provider_for(tool) else {
            return Ok(Vec::new());
        };

        let result = self.invoke(provider, Map::new())?;
        if let Some(message) = result.error_message() {
            return Err(SessionError::PropertyOptions {
                tool: provider.to_string(),
                reason: message,
            });
        }
        parse_property_options(&result.payload()).map_err(|reason| {
            SessionError::PropertyOptions {
                tool: provider.to_string(),
                reason,
            }
        })
    }

    /// Invoke a tool by catalog name.
    pub fn invoke(
        &self,
        tool: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolCallResult, SessionError> {
        Ok(self.bridge.run(self.mcp.invoke(tool, arguments))??)
    }

    /// Invoke a tool and record the outcome as a `tool` turn in a chat.
    ///
    /// Dispatch failures are recorded as error turns before being returned.
    pub fn invoke_in_chat(
        &self,
        chat_id: ChatId,
        tool: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolCallResult, SessionError> {
        if self.get_chat(chat_id)?.is_none() {
            return Err(ChatStoreError::SessionNotFound(chat_id).into());
        }

        let recorded_args = Value::Object(arguments.clone());
        let outcome = self.bridge.run(self.mcp.invoke(tool, arguments))?;
        let turn = match &outcome {
            Ok(result) => ChatTurn::tool(tool, recorded_args, render_result(result), result.is_error),
            Err(e) => ChatTurn::tool(tool, recorded_args, e.to_string(), true),
        };
        self.bridge
            .run(self.chats.append_message(chat_id, turn))??;

        Ok(outcome?)
    }

    // ========== Chats ==========

    /// Create a chat with the default name and select it.
    pub fn create_chat(&self) -> Result<ChatSession, SessionError> {
        Ok(self.bridge.run(self.chats.create_chat())??)
    }

    pub fn create_named_chat(&self, name: &str) -> Result<ChatSession, SessionError> {
        Ok(self.bridge.run(self.chats.create_named_chat(name))??)
    }

    /// Delete a chat. Unknown ids are ignored.
    pub fn delete_chat(&self, chat_id: ChatId) -> Result<(), SessionError> {
        Ok(self.bridge.run(self.chats.delete_chat(chat_id))??)
    }

    pub fn select_chat(&self, chat_id: ChatId) -> Result<(), SessionError> {
        Ok(self.bridge.run(self.chats.select_chat(chat_id))??)
    }

    pub fn rename_chat(&self, chat_id: ChatId, name: &str) -> Result<ChatSession, SessionError> {
        Ok(self.bridge.run(self.chats.rename_chat(chat_id, name))??)
    }

    /// Append a turn to a chat.
    pub fn append_message(&self, chat_id: ChatId, turn: ChatTurn) -> Result<ChatSession, SessionError> {
        Ok(self.bridge.run(self.chats.append_message(chat_id, turn))??)
    }

    /// Chats most recent first, truncated to the configured history limit.
    pub fn list_chats(&self) -> Result<Vec<ChatSession>, SessionError> {
        Ok(self.bridge.run(self.chats.list_chats(self.history_limit))?)
    }

    pub fn get_chat(&self, chat_id: ChatId) -> Result<Option<ChatSession>, SessionError> {
        Ok(self.bridge.run(self.chats.get_chat(chat_id))?)
    }

    pub fn current_chat(&self) -> Result<Option<ChatSession>, SessionError> {
        Ok(self.bridge.run(self.chats.current_chat())?)
    }

    pub fn current_index(&self) -> Result<Option<usize>, SessionError> {
        Ok(self.bridge.run(self.chats.current_index())?)
    }

    // ========== Model ==========

    pub fn model_params(&self) -> ModelParams {
        self.model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the model parameters.
    ///
    /// Switching provider resets the connection; reconnect afterwards.
    pub fn set_model_params(&self, params: ModelParams) -> Result<(), SessionError> {
        params.validate().map_err(SessionError::InvalidModel)?;

        let previous = {
            let mut model = self.model.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *model, params)
        };
        let current = self.model_params();
        if previous.provider != current.provider {
            tracing::info!(
                from = %previous.provider,
                to = %current.provider,
                "Provider changed, resetting connection"
            );
            self.disconnect()?;
        }
        Ok(())
    }

    // ========== Lifecycle ==========

    /// Disconnect every server and release the runtime. Runs once.
    pub fn shutdown(&self) {
        if self.bridge.is_shut_down() {
            return;
        }
        if let Err(e) = self.bridge.run(self.mcp.shutdown()) {
            tracing::warn!(error = %e, "Failed to disconnect during shutdown");
        }
        self.bridge.shutdown();
        tracing::debug!("Playground session shut down");
    }
}

impl Drop for PlaygroundSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Text recorded for a tool result in a chat.
fn render_result(result: &ToolCallResult) -> String {
    if let Some(message) = result.error_message() {
        return message;
    }
    if let Some(structured) = &result.structured_content {
        return pretty(structured);
    }
    let text = result.text();
    if text.is_empty() {
        pretty(&result.content)
    } else {
        text
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_result_prefers_structured_payload() {
        let result = ToolCallResult::success(json!([{ "type": "text", "text": "plain" }]))
            .with_structured_content(json!({ "rows": 3 }));
        assert_eq!(render_result(&result), "{\n  \"rows\": 3\n}");
    }

    #[test]
    fn test_render_result_plain_text() {
        let result = ToolCallResult::success(json!([{ "type": "text", "text": "hello" }]));
        assert_eq!(render_result(&result), "hello");
    }

    #[test]
    fn test_render_result_error() {
        let result = ToolCallResult::error("Permission Denied");
        assert_eq!(render_result(&result), "Permission Denied");
    }
}
