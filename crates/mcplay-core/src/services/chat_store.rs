//! In-memory chat session state.
//!
//! The store keeps sessions in display order (most recent first) together
//! with the current selection. `current_index` is always either a valid
//! position in that order or `None`.

use std::collections::HashMap;

use crate::domain::chat::{ChatId, ChatSession, ChatTurn, DEFAULT_CHAT_NAME};
use crate::ports::ChatStoreError;

/// Chat sessions plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct ChatSessionStore {
    sessions: HashMap<ChatId, ChatSession>,
    /// Display order, most recent first.
    order: Vec<ChatId>,
    current_chat_id: Option<ChatId>,
    current_index: Option<usize>,
}

impl ChatSessionStore {
    /// Create an empty store with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from previously persisted sessions.
    ///
    /// Sessions are ordered newest first; nothing is selected.
    pub fn from_sessions(sessions: impl IntoIterator<Item = ChatSession>) -> Self {
        let mut loaded: Vec<ChatSession> = sessions.into_iter().collect();
        loaded.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut store = Self::new();
        for session in loaded {
            if store.sessions.contains_key(&session.chat_id) {
                continue;
            }
            store.order.push(session.chat_id);
            store.sessions.insert(session.chat_id, session);
        }
        store.check_invariants();
        store
    }

    /// Create a chat with the default name, put it first and select it.
    pub fn create_chat(&mut self) -> &ChatSession {
        self.create_named_chat(DEFAULT_CHAT_NAME)
    }

    /// Create a named chat, put it first and select it.
    pub fn create_named_chat(&mut self, name: impl Into<String>) -> &ChatSession {
        let session = ChatSession::new(name);
        let id = session.chat_id;

        self.order.insert(0, id);
        self.sessions.insert(id, session);
        self.current_chat_id = Some(id);
        self.current_index = Some(0);
        self.check_invariants();

        &self.sessions[&id]
    }

    /// Delete a chat.
    ///
    /// Deleting the current chat selects the newest remaining one, or clears
    /// the selection when none remain. Unknown ids are ignored. Returns the
    /// removed session.
    pub fn delete_chat(&mut self, id: ChatId) -> Option<ChatSession> {
        let removed = self.sessions.remove(&id)?;
        self.order.retain(|other| *other != id);

        if self.current_chat_id == Some(id) {
            self.current_chat_id = self.order.first().copied();
        }
        self.reindex();
        self.check_invariants();

        Some(removed)
    }

    /// Chats in display order, truncated to `limit`.
    pub fn list_chats(&self, limit: usize) -> Vec<&ChatSession> {
        self.order
            .iter()
            .take(limit)
            .filter_map(|id| self.sessions.get(id))
            .collect()
    }

    /// Make a chat current.
    pub fn select_chat(&mut self, id: ChatId) -> Result<(), ChatStoreError> {
        if !self.sessions.contains_key(&id) {
            return Err(ChatStoreError::SessionNotFound(id));
        }
        self.current_chat_id = Some(id);
        self.reindex();
        self.check_invariants();
        Ok(())
    }

    /// Append a turn to a chat's history.
    pub fn append_message(
        &mut self,
        id: ChatId,
        turn: ChatTurn,
    ) -> Result<&ChatSession, ChatStoreError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(ChatStoreError::SessionNotFound(id))?;
        session.messages.push(turn);
        Ok(session)
    }

    /// Rename a chat. Display order is unaffected.
    pub fn rename_chat(
        &mut self,
        id: ChatId,
        name: impl Into<String>,
    ) -> Result<&ChatSession, ChatStoreError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(ChatStoreError::SessionNotFound(id))?;
        session.chat_name = name.into();
        Ok(session)
    }

    /// Put back a previously taken snapshot of a chat.
    ///
    /// Only chats still in the store are restored; order and selection are
    /// unaffected.
    pub fn restore_chat(&mut self, snapshot: ChatSession) {
        if let Some(session) = self.sessions.get_mut(&snapshot.chat_id) {
            *session = snapshot;
        }
    }

    /// Look up a chat.
    pub fn get_chat(&self, id: ChatId) -> Option<&ChatSession> {
        self.sessions.get(&id)
    }

    /// The selected chat, if any.
    pub fn current_chat(&self) -> Option<&ChatSession> {
        self.current_chat_id.and_then(|id| self.sessions.get(&id))
    }

    pub const fn current_chat_id(&self) -> Option<ChatId> {
        self.current_chat_id
    }

    /// Position of the current chat in display order.
    pub const fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn reindex(&mut self) {
        self.current_index = self
            .current_chat_id
            .and_then(|id| self.order.iter().position(|other| *other == id));
        if self.current_index.is_none() {
            self.current_chat_id = None;
        }
    }

    fn check_invariants(&self) {
        debug_assert_eq!(self.order.len(), self.sessions.len());
        debug_assert!(self.order.iter().all(|id| self.sessions.contains_key(id)));
        debug_assert_eq!(self.current_chat_id.is_some(), self.current_index.is_some());
        if let Some(index) = self.current_index {
            debug_assert_eq!(self.order.get(index), self.current_chat_id.as_ref());
        }
    }
}
