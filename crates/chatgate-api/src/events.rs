//! Background loop bridging connector events into services.
//!
//! Inbound messages flow into the media cache (persist + download);
//! every other event drives the session lifecycle.

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use chatgate_core::connector::{ChatConnector, ConnectorEvent};

use crate::state::AppState;

pub fn spawn_event_loop<C: ChatConnector>(state: AppState<C>) {
    let mut events = state.connector.events();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ConnectorEvent::MessageReceived(msg)) => {
                    debug!(message_id = %msg.id, chat_id = %msg.chat_id, "inbound message");
                    if let Err(e) = state.cache.ingest(&msg).await {
                        warn!(message_id = %msg.id, error = %e, "failed to ingest message");
                    }
                }
                Ok(event) => state.lifecycle.handle_event(&event).await,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event loop lagged behind connector events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
