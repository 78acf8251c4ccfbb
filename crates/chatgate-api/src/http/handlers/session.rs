//! Session control handlers.
//!
//! Endpoints:
//! - POST /reconnect  - Tear down and schedule a fresh initialization
//! - POST /disconnect - Tear down and stay disconnected

use axum::extract::State;
use axum::Json;
use serde_json::json;

use chatgate_core::connector::ChatConnector;

use crate::state::AppState;

pub async fn reconnect<C: ChatConnector>(
    State(state): State<AppState<C>>,
) -> Json<serde_json::Value> {
    state.lifecycle.reconnect().await;
    Json(json!({
        "success": true,
        "message": "Reinitialization scheduled",
    }))
}

pub async fn disconnect<C: ChatConnector>(
    State(state): State<AppState<C>>,
) -> Json<serde_json::Value> {
    state.lifecycle.disconnect().await;
    Json(json!({
        "success": true,
        "message": "Disconnected",
    }))
}
