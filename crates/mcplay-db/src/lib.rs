//! `SQLite` storage for mcplay chat sessions.
//!
//! Implements the `ChatSessionRepository` port from `mcplay-core`. The
//! `SqlitePool` never leaves this crate except through `setup_database`.

pub mod factory;
pub mod repositories;
pub mod setup;

pub use factory::DbFactory;
pub use repositories::SqliteChatSessionRepository;

pub use setup::setup_database;
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
