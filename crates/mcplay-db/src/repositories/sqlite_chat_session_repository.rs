//! `SQLite` implementation of the `ChatSessionRepository` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mcplay_core::{ChatId, ChatSession, ChatSessionRepository, ChatStoreError, ChatTurn};
use sqlx::{Row, SqlitePool};

use super::row_mappers::{row_to_chat_id, row_to_turn, storage_error};

/// Chat sessions stored in `chat_sessions`, their turns in `chat_turns`.
pub struct SqliteChatSessionRepository {
    pool: SqlitePool,
}

impl SqliteChatSessionRepository {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatSessionRepository for SqliteChatSessionRepository {
    async fn load_all(&self) -> Result<Vec<ChatSession>, ChatStoreError> {
        let session_rows = sqlx::query(
            "SELECT chat_id, chat_name, created_at
             FROM chat_sessions
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let turn_rows = sqlx::query(
            "SELECT chat_id, role, content, tool_call, created_at
             FROM chat_turns
             ORDER BY chat_id, position ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let mut turns: HashMap<ChatId, Vec<ChatTurn>> = HashMap::new();
        for row in &turn_rows {
            turns
                .entry(row_to_chat_id(row)?)
                .or_default()
                .push(row_to_turn(row)?);
        }

        let sessions = session_rows
            .iter()
            .map(|row| {
                let chat_id = row_to_chat_id(row)?;
                Ok(ChatSession {
                    chat_id,
                    chat_name: row.try_get("chat_name").map_err(storage_error)?,
                    created_at: row
                        .try_get::<DateTime<Utc>, _>("created_at")
                        .map_err(storage_error)?,
                    messages: turns.remove(&chat_id).unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, ChatStoreError>>()?;

        tracing::debug!(chat_count = sessions.len(), "Loaded chat sessions from database");
        Ok(sessions)
    }

    async fn save(&self, session: &ChatSession) -> Result<(), ChatStoreError> {
        let chat_id = session.chat_id.to_string();
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        sqlx::query(
            "INSERT INTO chat_sessions (chat_id, chat_name, created_at) VALUES (?, ?, ?)
             ON CONFLICT(chat_id) DO UPDATE SET chat_name = excluded.chat_name",
        )
        .bind(&chat_id)
        .bind(&session.chat_name)
        .bind(session.created_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?;

        // Rewrite the turn list.
        sqlx::query("DELETE FROM chat_turns WHERE chat_id = ?")
            .bind(&chat_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        for (position, turn) in session.messages.iter().enumerate() {
            let tool_call = turn
                .tool_call
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(storage_error)?;
            let position = i64::try_from(position).map_err(storage_error)?;

            sqlx::query(
                "INSERT INTO chat_turns (chat_id, position, role, content, tool_call, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&chat_id)
            .bind(position)
            .bind(turn.role.as_str())
            .bind(&turn.content)
            .bind(tool_call)
            .bind(turn.created_at)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        }

        tx.commit().await.map_err(storage_error)?;
        Ok(())
    }

    async fn delete(&self, id: ChatId) -> Result<(), ChatStoreError> {
        let chat_id = id.to_string();
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        sqlx::query("DELETE FROM chat_turns WHERE chat_id = ?")
            .bind(&chat_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        sqlx::query("DELETE FROM chat_sessions WHERE chat_id = ?")
            .bind(&chat_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;
        Ok(())
    }
}
