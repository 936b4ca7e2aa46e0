//! Core domain types, ports and services for mcplay.
//!
//! This crate has no knowledge of HTTP, JSON-RPC or SQL. Adapters
//! (`mcplay-mcp`, `mcplay-db`) implement the ports defined here and the
//! runtime crate wires them together.

pub mod domain;
pub mod events;
pub mod paths;
pub mod ports;
pub mod services;
pub mod settings;
pub mod utils;

// Re-export commonly used types for convenience
pub use domain::{
    ChatId, ChatSession, ChatTurn, CollisionPolicy, ConnectionStatus, Credentials,
    DEFAULT_CHAT_NAME, MessageRole, ModelParams, PropertyOption, Provider, ServerConfig,
    ToolCallRecord, ToolCallResult, ToolCapabilities, ToolDescriptor, ToolHint, ToolHintRegistry,
    TransportKind, parse_property_options,
};
pub use events::AppEvent;
pub use ports::{
    AppEventEmitter, ChatSessionRepository, ChatStoreError, InMemoryChatRepository, McpError,
    McpErrorCategory, McpErrorInfo, NoopEmitter, ToolErrorKind, ToolServerConnector,
    ToolServerError, ToolServerSession,
};
pub use services::{ChatSessionService, ChatSessionStore};
pub use settings::{
    ClientConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_HISTORY_LIMIT, DEFAULT_TOOL_TIMEOUT_SECS,
    SettingsError, load_config, save_config, validate_config,
};
pub use utils::{ToolParameter, extract_parameters};

pub use paths::{PathError, config_file_path, data_root, database_path};
