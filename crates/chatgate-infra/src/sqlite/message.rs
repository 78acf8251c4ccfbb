//! SQLite message repository implementation.
//!
//! Implements `MessageRepository` from `chatgate-core` using sqlx with split
//! read/write pools. One row per message id; saving an existing id replaces
//! the row, so media-path updates after a download are plain upserts.

use std::str::FromStr;

use chatgate_core::repository::MessageRepository;
use chatgate_types::error::RepositoryError;
use chatgate_types::message::{MessageRecord, MessageType};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MessageRepository`.
#[derive(Clone)]
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Internal row type
// ---------------------------------------------------------------------------

struct MessageRow {
    id: String,
    chat_id: String,
    from_me: i64,
    sender: Option<String>,
    timestamp: i64,
    body: Option<String>,
    kind: String,
    has_media: i64,
    media_path: Option<String>,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            from_me: row.try_get("from_me")?,
            sender: row.try_get("sender")?,
            timestamp: row.try_get("timestamp")?,
            body: row.try_get("body")?,
            kind: row.try_get("type")?,
            has_media: row.try_get("has_media")?,
            media_path: row.try_get("media_path")?,
        })
    }

    fn into_record(self) -> MessageRecord {
        // FromStr is infallible; unknown types fold to Other.
        let kind = MessageType::from_str(&self.kind).unwrap_or(MessageType::Other);
        MessageRecord {
            id: self.id,
            chat_id: self.chat_id,
            from_me: self.from_me != 0,
            sender: self.sender,
            timestamp: self.timestamp,
            body: self.body,
            kind,
            has_media: self.has_media != 0,
            media_path: self.media_path,
        }
    }
}

fn map_rows(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<MessageRecord>, RepositoryError> {
    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let r = MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        records.push(r.into_record());
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// MessageRepository impl
// ---------------------------------------------------------------------------

impl MessageRepository for SqliteMessageRepository {
    async fn upsert(&self, record: &MessageRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT OR REPLACE INTO messages
               (id, chat_id, from_me, sender, timestamp, body, type, has_media, media_path)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&record.id)
        .bind(&record.chat_id)
        .bind(record.from_me as i64)
        .bind(&record.sender)
        .bind(record.timestamp)
        .bind(&record.body)
        .bind(record.kind.to_string())
        .bind(record.has_media as i64)
        .bind(&record.media_path)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<MessageRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|row| {
            MessageRow::from_row(&row)
                .map(MessageRow::into_record)
                .map_err(|e| RepositoryError::Query(e.to_string()))
        })
        .transpose()
    }

    async fn recent(&self, limit: u32) -> Result<Vec<MessageRecord>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM messages ORDER BY timestamp DESC LIMIT ?")
            .bind(limit as i64)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        map_rows(rows)
    }

    async fn chat_window(
        &self,
        chat_id: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<MessageRecord>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT * FROM messages
               WHERE chat_id = ? AND timestamp >= ? AND timestamp <= ?
               ORDER BY timestamp ASC"#,
        )
        .bind(chat_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        map_rows(rows)
    }

    async fn last_interaction(&self, contact_id: &str) -> Result<MessageRecord, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT * FROM messages
               WHERE sender = ? OR chat_id = ?
               ORDER BY timestamp DESC
               LIMIT 1"#,
        )
        .bind(contact_id)
        .bind(contact_id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => MessageRow::from_row(&row)
                .map(MessageRow::into_record)
                .map_err(|e| RepositoryError::Query(e.to_string())),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn clear_all(&self) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM messages")
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
