//! Runtime wiring for mcplay.
//!
//! - `bridge` - `ExecutionBridge`, one shared tokio runtime for sync callers
//! - `session` - `PlaygroundSession`, the synchronous application facade

pub mod bridge;
pub mod session;

pub use bridge::{BridgeError, ExecutionBridge};
pub use session::{PlaygroundSession, SessionError, SessionParts};
