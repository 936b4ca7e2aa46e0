//! Chat session service - the chat store plus its persistence port.
//!
//! Sessions are loaded once when the service is built; every mutation is
//! applied to the in-memory store and written back through the repository.
//! A failed write leaves the store as it was before the mutation.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::chat_store::ChatSessionStore;
use crate::domain::chat::{ChatId, ChatSession, ChatTurn, DEFAULT_CHAT_NAME};
use crate::events::AppEvent;
use crate::ports::{AppEventEmitter, ChatSessionRepository, ChatStoreError, NoopEmitter};

/// Service for managing chat sessions.
pub struct ChatSessionService {
    store: Mutex<ChatSessionStore>,
    repo: Arc<dyn ChatSessionRepository>,
    emitter: Arc<dyn AppEventEmitter>,
}

impl ChatSessionService {
    /// Load every stored session and build the service.
    pub async fn load(repo: Arc<dyn ChatSessionRepository>) -> Result<Self, ChatStoreError> {
        Self::load_with_emitter(repo, Arc::new(NoopEmitter::new())).await
    }

    /// Load every stored session and build the service with an event emitter.
    pub async fn load_with_emitter(
        repo: Arc<dyn ChatSessionRepository>,
        emitter: Arc<dyn AppEventEmitter>,
    ) -> Result<Self, ChatStoreError> {
        let sessions = repo.load_all().await?;
        tracing::debug!(chat_count = sessions.len(), "Loaded chat sessions");

        Ok(Self {
            store: Mutex::new(ChatSessionStore::from_sessions(sessions)),
            repo,
            emitter,
        })
    }

    /// Create a chat with the default name and select it.
    pub async fn create_chat(&self) -> Result<ChatSession, ChatStoreError> {
        self.create_named_chat(DEFAULT_CHAT_NAME).await
    }

    /// Create a named chat and select it.
    ///
    /// If the session cannot be persisted the store is rolled back to its
    /// previous selection.
    pub async fn create_named_chat(
        &self,
        name: impl Into<String>,
    ) -> Result<ChatSession, ChatStoreError> {
        let mut store = self.store.lock().await;
        let previous = store.current_chat_id();
        let session = store.create_named_chat(name).clone();

        if let Err(e) = self.repo.save(&session).await {
            store.delete_chat(session.chat_id);
            if let Some(previous) = previous {
                store.select_chat(previous)?;
            }
            return Err(e);
        }
        drop(store);

        tracing::info!(chat_id = %session.chat_id, chat_name = %session.chat_name, "Created chat");
        self.emitter
            .emit(AppEvent::chat_created(session.chat_id, &session.chat_name));
        Ok(session)
    }

    /// Delete a chat. Unknown ids are ignored.
    ///
    /// The chat leaves the store only once the repository has deleted it.
    pub async fn delete_chat(&self, id: ChatId) -> Result<(), ChatStoreError> {
        let mut store = self.store.lock().await;
        if store.get_chat(id).is_none() {
            tracing::debug!(chat_id = %id, "Ignoring delete of unknown chat");
            return Ok(());
        }

        self.repo.delete(id).await?;
        store.delete_chat(id);
        let current = store.current_chat_id();
        drop(store);

        tracing::info!(chat_id = %id, "Deleted chat");
        self.emitter.emit(AppEvent::chat_deleted(id));
        self.emitter.emit(AppEvent::chat_selected(current));
        Ok(())
    }

    /// Chats in display order (most recent first), truncated to `limit`.
    pub async fn list_chats(&self, limit: usize) -> Vec<ChatSession> {
        self.store
            .lock()
            .await
            .list_chats(limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Make a chat current.
    pub async fn select_chat(&self, id: ChatId) -> Result<(), ChatStoreError> {
        self.store.lock().await.select_chat(id)?;
        self.emitter.emit(AppEvent::chat_selected(Some(id)));
        Ok(())
    }

    /// Append a turn to a chat and persist it.
    pub async fn append_message(
        &self,
        id: ChatId,
        turn: ChatTurn,
    ) -> Result<ChatSession, ChatStoreError> {
        let mut store = self.store.lock().await;
        let snapshot = store.get_chat(id).cloned();
        let session = store.append_message(id, turn)?.clone();
        self.save_or_restore(&mut store, &session, snapshot).await?;
        Ok(session)
    }

    /// Rename a chat and persist it.
    pub async fn rename_chat(
        &self,
        id: ChatId,
        name: impl Into<String>,
    ) -> Result<ChatSession, ChatStoreError> {
        let mut store = self.store.lock().await;
        let snapshot = store.get_chat(id).cloned();
        let session = store.rename_chat(id, name)?.clone();
        self.save_or_restore(&mut store, &session, snapshot).await?;
        Ok(session)
    }

    /// Persist a mutated session, putting the snapshot back on failure.
    async fn save_or_restore(
        &self,
        store: &mut ChatSessionStore,
        session: &ChatSession,
        snapshot: Option<ChatSession>,
    ) -> Result<(), ChatStoreError> {
        if let Err(e) = self.repo.save(session).await {
            tracing::warn!(chat_id = %session.chat_id, error = %e, "Failed to save chat, reverting");
            if let Some(snapshot) = snapshot {
                store.restore_chat(snapshot);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Look up a chat.
    pub async fn get_chat(&self, id: ChatId) -> Option<ChatSession> {
        self.store.lock().await.get_chat(id).cloned()
    }

    /// The selected chat, if any.
    pub async fn current_chat(&self) -> Option<ChatSession> {
        self.store.lock().await.current_chat().cloned()
    }

    /// Position of the current chat in display order.
    pub async fn current_index(&self) -> Option<usize> {
        self.store.lock().await.current_index()
    }

    /// Number of chats.
    pub async fn chat_count(&self) -> usize {
        self.store.lock().await.len()
    }
}
