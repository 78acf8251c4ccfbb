//! HTTP/SSE client for the external connector sidecar.
//!
//! The sidecar owns the actual chat-protocol engine. This client maps
//! the [`ChatConnector`] contract onto its JSON API and pumps its SSE
//! event stream into the process-wide [`EventBus`].
//!
//! Sidecar status codes map onto [`ConnectorError`]: 503 means the
//! session is not connected, anything else non-2xx is an upstream
//! failure.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::StreamExt;
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use chatgate_core::connector::{ChatConnector, ConnectorEvent, OutboundMedia};
use chatgate_core::event::EventBus;
use chatgate_types::contact::{ChatInfo, Contact};
use chatgate_types::error::ConnectorError;
use chatgate_types::message::{InboundMessage, MediaPayload};
use chatgate_types::session::DisconnectReason;

/// [`ChatConnector`] backed by the connector sidecar's HTTP API.
pub struct SidecarConnector {
    client: reqwest::Client,
    base_url: String,
    bus: EventBus,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ChallengeData {
    payload: String,
}

#[derive(Deserialize)]
struct SessionEndedData {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
struct MediaData {
    mime_type: String,
    /// Base64-encoded media bytes.
    data: String,
}

#[derive(Serialize)]
struct SendMessageBody<'a> {
    chat_id: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
struct SendMediaBody<'a> {
    chat_id: &'a str,
    filename: Option<&'a str>,
    caption: Option<&'a str>,
    as_voice: bool,
    /// Base64-encoded file bytes.
    data: String,
}

#[derive(Deserialize)]
struct SentResponse {
    id: String,
}

impl SidecarConnector {
    pub fn new(base_url: impl Into<String>, bus: EventBus) -> Result<Self, ConnectorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ConnectorError::Upstream(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bus,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Spawn the background task that pumps the sidecar's SSE stream
    /// into the event bus, reconnecting with a short backoff on failure.
    pub fn spawn_event_pump(self: &Arc<Self>) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                this.pump_once().await;
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        });
    }

    /// Consume the SSE stream until it errors or ends.
    async fn pump_once(&self) {
        let request = self.client.get(self.url("/events"));
        let mut source = match request.eventsource() {
            Ok(source) => source,
            Err(e) => {
                warn!(error = %e, "failed to open sidecar event stream");
                return;
            }
        };

        while let Some(event) = source.next().await {
            match event {
                Ok(Event::Open) => debug!("sidecar event stream open"),
                Ok(Event::Message(msg)) => {
                    match parse_event(&msg.event, &msg.data) {
                        Ok(Some(event)) => self.bus.publish(event),
                        Ok(None) => debug!(event = %msg.event, "ignoring unknown sidecar event"),
                        Err(e) => warn!(event = %msg.event, error = %e, "bad sidecar event payload"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "sidecar event stream failed");
                    source.close();
                    return;
                }
            }
        }
    }

    /// Map a response to `()`, translating sidecar status codes.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ConnectorError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(ConnectorError::NotConnected);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ConnectorError::Upstream(format!("HTTP {status}: {body}")))
    }

    async fn post_empty(&self, path: &str) -> Result<(), ConnectorError> {
        let response = self
            .client
            .post(self.url(path))
            .send()
            .await
            .map_err(|e| ConnectorError::Upstream(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ConnectorError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ConnectorError::Upstream(e.to_string()))?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ConnectorError::Upstream(format!("bad sidecar response: {e}")))
    }
}

fn parse_event(name: &str, data: &str) -> Result<Option<ConnectorEvent>, serde_json::Error> {
    Ok(Some(match name {
        "challenge" => {
            let d: ChallengeData = serde_json::from_str(data)?;
            ConnectorEvent::ChallengeIssued { payload: d.payload }
        }
        "authenticated" => ConnectorEvent::Authenticated,
        "ready" => ConnectorEvent::Ready,
        "session_ended" => {
            let d: SessionEndedData = serde_json::from_str(data)?;
            let reason = match d.reason.as_deref() {
                Some("logout") => DisconnectReason::Logout,
                Some(other) => DisconnectReason::Other(other.to_string()),
                None => DisconnectReason::Other("unknown".to_string()),
            };
            ConnectorEvent::SessionEnded { reason }
        }
        "message" => {
            let msg: InboundMessage = serde_json::from_str(data)?;
            ConnectorEvent::MessageReceived(msg)
        }
        _ => return Ok(None),
    }))
}

impl ChatConnector for SidecarConnector {
    fn events(&self) -> broadcast::Receiver<ConnectorEvent> {
        self.bus.subscribe()
    }

    async fn initialize(&self) -> Result<(), ConnectorError> {
        self.post_empty("/session/initialize").await
    }

    async fn teardown(&self) -> Result<(), ConnectorError> {
        self.post_empty("/session/teardown").await
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, ConnectorError> {
        self.get_json("/contacts").await
    }

    async fn list_chats(&self) -> Result<Vec<ChatInfo>, ConnectorError> {
        self.get_json("/chats").await
    }

    async fn get_chat_by_id(&self, chat_id: &str) -> Result<Option<ChatInfo>, ConnectorError> {
        let response = self
            .client
            .get(self.url(&format!("/chats/{chat_id}")))
            .send()
            .await
            .map_err(|e| ConnectorError::Upstream(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::check(response)
            .await?
            .json()
            .await
            .map(Some)
            .map_err(|e| ConnectorError::Upstream(format!("bad sidecar response: {e}")))
    }

    async fn fetch_messages(
        &self,
        chat_id: &str,
        limit: u32,
    ) -> Result<Vec<InboundMessage>, ConnectorError> {
        self.get_json(&format!("/chats/{chat_id}/messages?limit={limit}"))
            .await
    }

    async fn download_media(
        &self,
        message_id: &str,
    ) -> Result<Option<MediaPayload>, ConnectorError> {
        let response = self
            .client
            .get(self.url(&format!("/messages/{message_id}/media")))
            .send()
            .await
            .map_err(|e| ConnectorError::Upstream(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let media: MediaData = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ConnectorError::Upstream(format!("bad sidecar response: {e}")))?;

        let bytes = BASE64
            .decode(&media.data)
            .map_err(|e| ConnectorError::Upstream(format!("bad media encoding: {e}")))?;

        Ok(Some(MediaPayload {
            mime_type: media.mime_type,
            bytes,
        }))
    }

    async fn send_message(&self, chat_id: &str, body: &str) -> Result<String, ConnectorError> {
        let response = self
            .client
            .post(self.url("/messages"))
            .json(&SendMessageBody { chat_id, body })
            .send()
            .await
            .map_err(|e| ConnectorError::Upstream(e.to_string()))?;

        let sent: SentResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ConnectorError::Upstream(format!("bad sidecar response: {e}")))?;
        Ok(sent.id)
    }

    async fn send_media(&self, media: OutboundMedia) -> Result<String, ConnectorError> {
        let bytes = tokio::fs::read(&media.path)
            .await
            .map_err(|e| ConnectorError::Upstream(format!("cannot read outbound file: {e}")))?;

        let response = self
            .client
            .post(self.url("/media"))
            .json(&SendMediaBody {
                chat_id: &media.chat_id,
                filename: media.filename.as_deref(),
                caption: media.caption.as_deref(),
                as_voice: media.as_voice,
                data: BASE64.encode(&bytes),
            })
            .send()
            .await
            .map_err(|e| ConnectorError::Upstream(e.to_string()))?;

        let sent: SentResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ConnectorError::Upstream(format!("bad sidecar response: {e}")))?;
        Ok(sent.id)
    }
}
