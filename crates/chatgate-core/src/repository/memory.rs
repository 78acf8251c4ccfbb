//! In-memory message repository.
//!
//! Backs tests and ephemeral deployments that do not want a database file.
//! Semantics match the SQLite implementation in chatgate-infra.

use std::collections::HashMap;

use tokio::sync::RwLock;

use chatgate_types::error::RepositoryError;
use chatgate_types::message::MessageRecord;

use super::message::MessageRepository;

/// HashMap-backed implementation of [`MessageRepository`].
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    rows: RwLock<HashMap<String, MessageRecord>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl MessageRepository for InMemoryMessageRepository {
    async fn upsert(&self, record: &MessageRecord) -> Result<(), RepositoryError> {
        self.rows
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<MessageRecord>, RepositoryError> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<MessageRecord>, RepositoryError> {
        let mut records: Vec<MessageRecord> = self.rows.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(limit as usize);
        Ok(records)
    }

    async fn chat_window(
        &self,
        chat_id: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<MessageRecord>, RepositoryError> {
        let mut records: Vec<MessageRecord> = self
            .rows
            .read()
            .await
            .values()
            .filter(|r| r.chat_id == chat_id && r.timestamp >= start && r.timestamp <= end)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.timestamp);
        Ok(records)
    }

    async fn last_interaction(&self, contact_id: &str) -> Result<MessageRecord, RepositoryError> {
        self.rows
            .read()
            .await
            .values()
            .filter(|r| r.sender.as_deref() == Some(contact_id) || r.chat_id == contact_id)
            .max_by_key(|r| r.timestamp)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn clear_all(&self) -> Result<(), RepositoryError> {
        self.rows.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::record;

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let repo = InMemoryMessageRepository::new();
        let mut rec = record("MSG1", "chat", 100);
        repo.upsert(&rec).await.unwrap();

        rec.media_path = Some("/media/MSG1.ogg".to_string());
        rec.has_media = true;
        repo.upsert(&rec).await.unwrap();

        assert_eq!(repo.len().await, 1);
        let stored = repo.get_by_id("MSG1").await.unwrap().unwrap();
        assert_eq!(stored.media_path.as_deref(), Some("/media/MSG1.ogg"));
    }

    #[tokio::test]
    async fn recent_orders_descending() {
        let repo = InMemoryMessageRepository::new();
        repo.upsert(&record("a", "chat", 10)).await.unwrap();
        repo.upsert(&record("b", "chat", 30)).await.unwrap();
        repo.upsert(&record("c", "chat", 20)).await.unwrap();

        let recent = repo.recent(2).await.unwrap();
        let ids: Vec<&str> = recent.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn last_interaction_matches_sender_or_chat() {
        let repo = InMemoryMessageRepository::new();
        let mut by_sender = record("a", "group@g.us", 10);
        by_sender.sender = Some("friend@c.us".to_string());
        repo.upsert(&by_sender).await.unwrap();
        repo.upsert(&record("b", "friend@c.us", 5)).await.unwrap();

        let last = repo.last_interaction("friend@c.us").await.unwrap();
        assert_eq!(last.id, "a");

        let err = repo.last_interaction("stranger@c.us").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn clear_all_removes_everything() {
        let repo = InMemoryMessageRepository::new();
        repo.upsert(&record("a", "chat", 10)).await.unwrap();
        repo.clear_all().await.unwrap();
        assert!(repo.is_empty().await);
    }
}
