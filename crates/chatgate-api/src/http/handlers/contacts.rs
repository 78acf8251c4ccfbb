//! Contact listing and search handlers.
//!
//! Endpoints:
//! - GET /list-contacts      - Saved individual contacts, minus excluded ones
//! - GET /search-contacts?q= - Substring search over saved contacts

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use chatgate_core::connector::ChatConnector;
use chatgate_types::contact::Contact;

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

fn project(contact: &Contact) -> serde_json::Value {
    json!({
        "id": contact.id,
        "name": contact.display_name(),
        "number": contact.number,
        "pushname": contact.pushname,
    })
}

pub async fn list_contacts<C: ChatConnector>(
    State(state): State<AppState<C>>,
) -> Result<Json<Vec<serde_json::Value>>, AppError> {
    let contacts = state.directory.list_contacts().await?;
    Ok(Json(contacts.iter().map(project).collect()))
}

/// A blank or missing `q` yields an empty list rather than an error.
pub async fn search_contacts<C: ChatConnector>(
    State(state): State<AppState<C>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<serde_json::Value>>, AppError> {
    let contacts = state.directory.search_contacts(&query.q).await?;
    Ok(Json(contacts.iter().map(project).collect()))
}
