//! Chat session persistence port definition.
//!
//! The chat store is backend-agnostic: it loads every session once on start
//! and writes each mutated session back through this port.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::chat::{ChatId, ChatSession};

/// Errors that can occur in chat session operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatStoreError {
    #[error("Chat session not found: {0}")]
    SessionNotFound(ChatId),

    #[error("Chat persistence error: {0}")]
    Persistence(String),
}

/// Port for chat session persistence.
#[async_trait]
pub trait ChatSessionRepository: Send + Sync {
    /// Load every stored session with its messages. Order is unspecified.
    async fn load_all(&self) -> Result<Vec<ChatSession>, ChatStoreError>;

    /// Insert or replace a session, including its full message list.
    async fn save(&self, session: &ChatSession) -> Result<(), ChatStoreError>;

    /// Delete a session. Deleting an unknown id is not an error.
    async fn delete(&self, id: ChatId) -> Result<(), ChatStoreError>;
}

/// Volatile repository used when no database is configured, and in tests.
#[derive(Debug, Default)]
pub struct InMemoryChatRepository {
    sessions: RwLock<HashMap<ChatId, ChatSession>>,
}

impl InMemoryChatRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with sessions.
    pub fn with_sessions(sessions: impl IntoIterator<Item = ChatSession>) -> Self {
        Self {
            sessions: RwLock::new(sessions.into_iter().map(|s| (s.chat_id, s)).collect()),
        }
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl ChatSessionRepository for InMemoryChatRepository {
    async fn load_all(&self) -> Result<Vec<ChatSession>, ChatStoreError> {
        Ok(self.sessions.read().await.values().cloned().collect())
    }

    async fn save(&self, session: &ChatSession) -> Result<(), ChatStoreError> {
        self.sessions
            .write()
            .await
            .insert(session.chat_id, session.clone());
        Ok(())
    }

    async fn delete(&self, id: ChatId) -> Result<(), ChatStoreError> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }
}
