//! Message history handlers.
//!
//! Endpoints:
//! - GET /list-messages?chat_id=&limit=   - Fetch history, read-through the store
//! - GET /messages                        - 50 most recent stored records
//! - GET /get-last-interaction?contact_id=
//! - GET /get-message-context?message_id=&radius=

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::warn;

use chatgate_core::connector::ChatConnector;
use chatgate_core::repository::{message_context, MessageRepository};
use chatgate_types::message::MessageRecord;

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    pub chat_id: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

#[derive(Debug, Deserialize)]
pub struct LastInteractionQuery {
    pub contact_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContextQuery {
    pub message_id: Option<String>,
    #[serde(default = "default_radius")]
    pub radius: i64,
}

fn default_radius() -> i64 {
    5
}

fn require(param: Option<String>, name: &str) -> Result<String, AppError> {
    param
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("Query parameter '{name}' is required")))
}

/// GET /list-messages - Fetch recent chat history from the connector,
/// persisting each message and its media through the cache.
///
/// Only listable message types are returned; anything the gateway does
/// not model is dropped. A failed media download degrades to the bare
/// record rather than failing the listing.
pub async fn list_messages<C: ChatConnector>(
    State(state): State<AppState<C>>,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Vec<MessageRecord>>, AppError> {
    let chat_id = require(query.chat_id, "chat_id")?;

    let history = state
        .connector
        .fetch_messages(&chat_id, query.limit)
        .await?;

    let mut records = Vec::with_capacity(history.len());
    for msg in history.iter().filter(|m| m.kind.is_listable()) {
        match state.cache.ingest(msg).await {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(message_id = %msg.id, error = %e, "media ingest failed, listing without media");
                records.push(MessageRecord::from(msg));
            }
        }
    }

    Ok(Json(records))
}

/// GET /messages - The 50 most recent stored records, newest first.
pub async fn recent_messages<C: ChatConnector>(
    State(state): State<AppState<C>>,
) -> Result<Json<Vec<MessageRecord>>, AppError> {
    let records = state.repo.recent(50).await?;
    Ok(Json(records))
}

pub async fn get_last_interaction<C: ChatConnector>(
    State(state): State<AppState<C>>,
    Query(query): Query<LastInteractionQuery>,
) -> Result<Json<MessageRecord>, AppError> {
    let contact_id = require(query.contact_id, "contact_id")?;
    let record = state
        .repo
        .last_interaction(&contact_id)
        .await
        .map_err(|e| match e {
            chatgate_types::error::RepositoryError::NotFound => {
                AppError::NotFound(format!("No interaction with contact '{contact_id}'"))
            }
            other => other.into(),
        })?;
    Ok(Json(record))
}

/// GET /get-message-context - Messages in the same chat within `radius`
/// minutes of the anchor message, ascending.
pub async fn get_message_context<C: ChatConnector>(
    State(state): State<AppState<C>>,
    Query(query): Query<ContextQuery>,
) -> Result<Json<Vec<MessageRecord>>, AppError> {
    let message_id = require(query.message_id, "message_id")?;
    if query.radius <= 0 {
        return Err(AppError::Validation(
            "Query parameter 'radius' must be positive".to_string(),
        ));
    }

    let records = message_context(&state.repo, &message_id, query.radius)
        .await
        .map_err(|e| match e {
            chatgate_types::error::RepositoryError::NotFound => {
                AppError::NotFound(format!("Message '{message_id}' not found"))
            }
            other => other.into(),
        })?;
    Ok(Json(records))
}
