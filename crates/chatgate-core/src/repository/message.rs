//! Message repository trait definition.
//!
//! Defines the storage interface for message records. The infrastructure
//! layer (chatgate-infra) implements this trait with SQLite persistence;
//! [`memory`](super::memory) provides an in-memory implementation for tests
//! and ephemeral deployments.
//!
//! Uses native async fn in traits (Rust 2024 edition, no async_trait macro).

use chatgate_types::error::RepositoryError;
use chatgate_types::message::MessageRecord;

/// Repository trait for durable message metadata.
///
/// Records are keyed by the connector-assigned message id. Saving an
/// existing id replaces the prior record (upsert, never append).
pub trait MessageRepository: Send + Sync {
    /// Insert or replace a record by id. No error on either path.
    fn upsert(
        &self,
        record: &MessageRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a record by message id.
    fn get_by_id(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<MessageRecord>, RepositoryError>> + Send;

    /// Most recent records, ordered by timestamp descending.
    fn recent(
        &self,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<MessageRecord>, RepositoryError>> + Send;

    /// Records for a chat with timestamp in `[start, end]` (inclusive),
    /// ordered by timestamp ascending.
    fn chat_window(
        &self,
        chat_id: &str,
        start: i64,
        end: i64,
    ) -> impl std::future::Future<Output = Result<Vec<MessageRecord>, RepositoryError>> + Send;

    /// Most recent record where the sender or the chat is the given contact.
    /// Fails with `NotFound` if there is none.
    fn last_interaction(
        &self,
        contact_id: &str,
    ) -> impl std::future::Future<Output = Result<MessageRecord, RepositoryError>> + Send;

    /// Remove every record. Used only by the destructive session reset.
    fn clear_all(
        &self,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

impl<R: MessageRepository> MessageRepository for std::sync::Arc<R> {
    fn upsert(
        &self,
        record: &MessageRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send {
        (**self).upsert(record)
    }

    fn get_by_id(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<MessageRecord>, RepositoryError>> + Send
    {
        (**self).get_by_id(id)
    }

    fn recent(
        &self,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<MessageRecord>, RepositoryError>> + Send {
        (**self).recent(limit)
    }

    fn chat_window(
        &self,
        chat_id: &str,
        start: i64,
        end: i64,
    ) -> impl std::future::Future<Output = Result<Vec<MessageRecord>, RepositoryError>> + Send {
        (**self).chat_window(chat_id, start, end)
    }

    fn last_interaction(
        &self,
        contact_id: &str,
    ) -> impl std::future::Future<Output = Result<MessageRecord, RepositoryError>> + Send {
        (**self).last_interaction(contact_id)
    }

    fn clear_all(&self) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send {
        (**self).clear_all()
    }
}

/// Messages surrounding an anchor message in the same chat.
///
/// Resolves the anchor by id (`NotFound` if absent), then returns every
/// record of the anchor's chat with a timestamp within `radius_minutes`
/// of the anchor, ascending. Window bounds are inclusive.
pub async fn message_context<R: MessageRepository>(
    repo: &R,
    message_id: &str,
    radius_minutes: i64,
) -> Result<Vec<MessageRecord>, RepositoryError> {
    let anchor = repo
        .get_by_id(message_id)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    let start = anchor.timestamp - radius_minutes * 60;
    let end = anchor.timestamp + radius_minutes * 60;
    repo.chat_window(&anchor.chat_id, start, end).await
}
