//! Domain types for mcplay.
//!
//! These are pure data types with no infrastructure dependencies.

pub mod chat;
pub mod mcp;
pub mod model;
pub mod tool_hints;

pub use chat::{ChatId, ChatSession, ChatTurn, DEFAULT_CHAT_NAME, MessageRole, ToolCallRecord};
pub use mcp::{
    CollisionPolicy, ConnectionStatus, ServerConfig, ToolCallResult, ToolDescriptor, TransportKind,
};
pub use model::{Credentials, ModelParams, Provider};
pub use tool_hints::{
    PropertyOption, ToolCapabilities, ToolHint, ToolHintRegistry, parse_property_options,
};
