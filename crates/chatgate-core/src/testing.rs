//! Shared test fixtures: record builders and a scriptable connector.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use tokio::sync::broadcast;

use chatgate_types::contact::{ChatInfo, Contact};
use chatgate_types::error::ConnectorError;
use chatgate_types::message::{InboundMessage, MediaPayload, MessageRecord, MessageType};

use crate::connector::{ChatConnector, ConnectorEvent, OutboundMedia};
use crate::event::EventBus;

pub(crate) fn record(id: &str, chat_id: &str, timestamp: i64) -> MessageRecord {
    MessageRecord {
        id: id.to_string(),
        chat_id: chat_id.to_string(),
        from_me: false,
        sender: Some(format!("{chat_id}@c.us")),
        timestamp,
        body: Some(format!("body of {id}")),
        kind: MessageType::Chat,
        has_media: false,
        media_path: None,
    }
}

pub(crate) fn inbound(id: &str, chat_id: &str, timestamp: i64) -> InboundMessage {
    InboundMessage {
        id: id.to_string(),
        chat_id: chat_id.to_string(),
        from_me: false,
        sender: Some(format!("{chat_id}@c.us")),
        timestamp,
        body: Some(format!("body of {id}")),
        kind: MessageType::Chat,
        has_media: false,
    }
}

/// Canned-response connector that counts the calls it receives.
pub(crate) struct MockConnector {
    bus: EventBus,
    pub contacts: Vec<Contact>,
    pub chats: Vec<ChatInfo>,
    pub messages: Vec<InboundMessage>,
    media: HashMap<String, MediaPayload>,
    pub initialize_calls: AtomicUsize,
    pub teardown_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub fail_teardown: AtomicBool,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self {
            bus: EventBus::new(16),
            contacts: Vec::new(),
            chats: Vec::new(),
            messages: Vec::new(),
            media: HashMap::new(),
            initialize_calls: AtomicUsize::new(0),
            teardown_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            fail_teardown: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_media(mut self, id: &str, payload: MediaPayload) -> Self {
        self.media.insert(id.to_string(), payload);
        self
    }
}

impl ChatConnector for MockConnector {
    fn events(&self) -> broadcast::Receiver<ConnectorEvent> {
        self.bus.subscribe()
    }

    async fn initialize(&self) -> Result<(), ConnectorError> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn teardown(&self) -> Result<(), ConnectorError> {
        self.teardown_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_teardown.load(Ordering::SeqCst) {
            return Err(ConnectorError::Upstream("teardown refused".to_string()));
        }
        Ok(())
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, ConnectorError> {
        Ok(self.contacts.clone())
    }

    async fn list_chats(&self) -> Result<Vec<ChatInfo>, ConnectorError> {
        Ok(self.chats.clone())
    }

    async fn get_chat_by_id(&self, chat_id: &str) -> Result<Option<ChatInfo>, ConnectorError> {
        Ok(self.chats.iter().find(|c| c.id == chat_id).cloned())
    }

    async fn fetch_messages(
        &self,
        chat_id: &str,
        limit: u32,
    ) -> Result<Vec<InboundMessage>, ConnectorError> {
        Ok(self
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn download_media(
        &self,
        message_id: &str,
    ) -> Result<Option<MediaPayload>, ConnectorError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.media.get(message_id).cloned())
    }

    async fn send_message(&self, chat_id: &str, body: &str) -> Result<String, ConnectorError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((chat_id.to_string(), body.to_string()));
        }
        Ok(format!("sent-{chat_id}"))
    }

    async fn send_media(&self, media: OutboundMedia) -> Result<String, ConnectorError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((media.chat_id.clone(), String::from("<media>")));
        }
        Ok(format!("sent-media-{}", media.chat_id))
    }
}
