//! Row mapping helpers for `SQLite` queries.

use chrono::{DateTime, Utc};
use mcplay_core::{ChatId, ChatStoreError, ChatTurn, MessageRole, ToolCallRecord};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

pub fn storage_error(error: impl std::fmt::Display) -> ChatStoreError {
    ChatStoreError::Persistence(error.to_string())
}

/// Parse the `chat_id` column.
pub fn row_to_chat_id(row: &SqliteRow) -> Result<ChatId, ChatStoreError> {
    let raw: String = row.try_get("chat_id").map_err(storage_error)?;
    ChatId::parse(&raw).ok_or_else(|| storage_error(format!("Invalid chat id in database: {raw}")))
}

/// Parse a `chat_turns` row.
pub fn row_to_turn(row: &SqliteRow) -> Result<ChatTurn, ChatStoreError> {
    let role: String = row.try_get("role").map_err(storage_error)?;
    let role = MessageRole::parse(&role)
        .ok_or_else(|| storage_error(format!("Invalid role in database: {role}")))?;

    let tool_call: Option<String> = row.try_get("tool_call").map_err(storage_error)?;
    let tool_call = tool_call
        .map(|json| serde_json::from_str::<ToolCallRecord>(&json))
        .transpose()
        .map_err(storage_error)?;

    Ok(ChatTurn {
        role,
        content: row.try_get("content").map_err(storage_error)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(storage_error)?,
        tool_call,
    })
}
