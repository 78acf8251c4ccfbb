//! Chat query handlers.
//!
//! Endpoints:
//! - GET /list-chats
//! - GET /unread-chats
//! - GET /get-chat?chat_id=
//! - GET /get-direct-chat-by-contact?contact_id=
//! - GET /get-contact-chats?contact_id=

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use chatgate_core::connector::ChatConnector;
use chatgate_types::contact::ChatInfo;

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    pub chat_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    pub contact_id: Option<String>,
}

fn require(param: Option<String>, name: &str) -> Result<String, AppError> {
    param
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("Query parameter '{name}' is required")))
}

fn project(chat: &ChatInfo) -> serde_json::Value {
    let last_message_time = chat
        .last_message_time
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339());

    json!({
        "id": chat.id,
        "name": chat.name,
        "last_message_time": last_message_time,
        "last_message_body": chat.last_message_body,
        "unread_count": chat.unread_count,
        "is_group": chat.is_group,
    })
}

pub async fn list_chats<C: ChatConnector>(
    State(state): State<AppState<C>>,
) -> Result<Json<Vec<serde_json::Value>>, AppError> {
    let chats = state.directory.list_chats().await?;
    Ok(Json(chats.iter().map(project).collect()))
}

pub async fn unread_chats<C: ChatConnector>(
    State(state): State<AppState<C>>,
) -> Result<Json<Vec<serde_json::Value>>, AppError> {
    let chats = state.directory.unread_chats().await?;
    Ok(Json(chats.iter().map(project).collect()))
}

pub async fn get_chat<C: ChatConnector>(
    State(state): State<AppState<C>>,
    Query(query): Query<ChatQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let chat_id = require(query.chat_id, "chat_id")?;
    let chat = state
        .directory
        .get_chat(&chat_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Chat '{chat_id}' not found")))?;
    Ok(Json(project(&chat)))
}

pub async fn get_direct_chat_by_contact<C: ChatConnector>(
    State(state): State<AppState<C>>,
    Query(query): Query<ContactQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let contact_id = require(query.contact_id, "contact_id")?;
    let chat = state
        .directory
        .direct_chat(&contact_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No direct chat with contact '{contact_id}'"))
        })?;
    Ok(Json(project(&chat)))
}

pub async fn get_contact_chats<C: ChatConnector>(
    State(state): State<AppState<C>>,
    Query(query): Query<ContactQuery>,
) -> Result<Json<Vec<serde_json::Value>>, AppError> {
    let contact_id = require(query.contact_id, "contact_id")?;
    let chats = state.directory.contact_chats(&contact_id).await?;
    Ok(Json(chats.iter().map(project).collect()))
}
