//! Chat session events.

use super::AppEvent;
use crate::domain::chat::ChatId;

impl AppEvent {
    /// Create a chat created event.
    pub fn chat_created(chat_id: ChatId, chat_name: impl Into<String>) -> Self {
        Self::ChatCreated {
            chat_id,
            chat_name: chat_name.into(),
        }
    }

    /// Create a chat deleted event.
    pub const fn chat_deleted(chat_id: ChatId) -> Self {
        Self::ChatDeleted { chat_id }
    }

    /// Create a chat selected event.
    pub const fn chat_selected(chat_id: Option<ChatId>) -> Self {
        Self::ChatSelected { chat_id }
    }
}
