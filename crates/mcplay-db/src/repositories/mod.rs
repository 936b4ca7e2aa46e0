//! Repository implementations using `SQLite`.
//!
//! All SQL lives here; port trait signatures never mention the pool.

mod row_mappers;
mod sqlite_chat_session_repository;

pub use sqlite_chat_session_repository::SqliteChatSessionRepository;
