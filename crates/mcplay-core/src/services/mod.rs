//! Core services - the application's business logic layer.
//!
//! Services orchestrate between ports (trait interfaces) and domain logic.
//! They don't know about concrete implementations.

mod chat_sessions;
mod chat_store;

pub use chat_sessions::ChatSessionService;
pub use chat_store::ChatSessionStore;
