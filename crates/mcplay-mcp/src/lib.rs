//! MCP client, connection manager and tool dispatcher for mcplay.
//!
//! - `protocol` / `transport` / `client` - JSON-RPC over HTTP (streamable
//!   HTTP and legacy SSE), implementing the `ToolServerSession` port
//! - `connector` - `HttpMcpConnector`, the `ToolServerConnector` adapter
//! - `catalog` / `manager` - catalog aggregation, connect-all and dispatch
//! - `service` - `McpService`, the manager plus events

pub mod catalog;
pub mod client;
pub mod connector;
pub mod manager;
pub mod protocol;
pub mod service;
pub mod sse;
pub mod transport;

pub use catalog::{CatalogEntry, ToolCatalog};
pub use client::McpClient;
pub use connector::HttpMcpConnector;
pub use manager::{ConnectionManager, ConnectionOptions};
pub use service::McpService;
