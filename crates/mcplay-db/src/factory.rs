//! Composition helpers for `SQLite`-backed repositories.

use std::path::Path;
use std::sync::Arc;

use mcplay_core::ChatSessionRepository;
use sqlx::SqlitePool;

use crate::repositories::SqliteChatSessionRepository;
use crate::setup::setup_database;

/// Factory for repositories with `SQLite` backends. Construction only.
pub struct DbFactory;

impl DbFactory {
    /// Open the database at `path` and build the chat session repository.
    pub async fn open_chat_repository(
        path: &Path,
    ) -> anyhow::Result<Arc<dyn ChatSessionRepository>> {
        let pool = setup_database(path).await?;
        Ok(Self::chat_repository(pool))
    }

    /// Chat session repository over an existing pool.
    pub fn chat_repository(pool: SqlitePool) -> Arc<dyn ChatSessionRepository> {
        Arc::new(SqliteChatSessionRepository::new(pool))
    }
}
