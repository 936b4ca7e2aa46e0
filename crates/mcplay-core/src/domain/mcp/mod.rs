//! Tool server domain types.
//!
//! # Design
//!
//! - `ServerConfig` - A configured endpoint (`name` is the unique key)
//! - `TransportKind` - Wire transport inferred from the URL
//! - `ToolDescriptor` - Tool exposed by a server
//! - `ToolCallResult` - Result of a tool invocation
//! - `CollisionPolicy` - Duplicate tool name handling during aggregation
//! - `ConnectionStatus` - Read model of the connection state

mod types;

pub use types::{
    CollisionPolicy, ConnectionStatus, ServerConfig, ToolCallResult, ToolDescriptor, TransportKind,
};
