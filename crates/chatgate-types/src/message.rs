//! Message records and the inbound message shape delivered by the connector.
//!
//! `MessageRecord` is the durable row persisted per chat message;
//! `InboundMessage` is the transient object the connector hands over in
//! events and history fetches.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Kind of chat message, as reported by the connector.
///
/// Unknown connector strings fold to `Other` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Chat,
    Document,
    Image,
    Audio,
    /// Push-to-talk voice note. Always opus audio in an Ogg container.
    Ptt,
    Video,
    Other,
}

impl MessageType {
    /// True for the types the history listing exposes to callers.
    pub fn is_listable(self) -> bool {
        !matches!(self, MessageType::Other)
    }

    /// True for voice audio, which is always stored with an `.ogg` extension.
    pub fn is_voice(self) -> bool {
        matches!(self, MessageType::Audio | MessageType::Ptt)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageType::Chat => "chat",
            MessageType::Document => "document",
            MessageType::Image => "image",
            MessageType::Audio => "audio",
            MessageType::Ptt => "ptt",
            MessageType::Video => "video",
            MessageType::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl FromStr for MessageType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "chat" => MessageType::Chat,
            "document" => MessageType::Document,
            "image" => MessageType::Image,
            "audio" => MessageType::Audio,
            "ptt" => MessageType::Ptt,
            "video" => MessageType::Video,
            _ => MessageType::Other,
        })
    }
}

/// One durable row per chat message ever observed or fetched.
///
/// `id` is the connector-assigned message id and the primary key; re-saving
/// the same id replaces the prior record. `media_path` is set iff media for
/// the message has been downloaded successfully at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub chat_id: String,
    pub from_me: bool,
    pub sender: Option<String>,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub body: Option<String>,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub has_media: bool,
    pub media_path: Option<String>,
}

/// A message as delivered by the connector (event or history fetch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    pub chat_id: String,
    pub from_me: bool,
    pub sender: Option<String>,
    pub timestamp: i64,
    pub body: Option<String>,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub has_media: bool,
}

impl From<&InboundMessage> for MessageRecord {
    fn from(msg: &InboundMessage) -> Self {
        MessageRecord {
            id: msg.id.clone(),
            chat_id: msg.chat_id.clone(),
            from_me: msg.from_me,
            sender: msg.sender.clone(),
            timestamp: msg.timestamp,
            body: msg.body.clone(),
            kind: msg.kind,
            has_media: msg.has_media,
            media_path: None,
        }
    }
}

/// Raw media bytes plus the MIME type the connector declared for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaPayload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl MediaPayload {
    /// The MIME subtype, used to derive file extensions for non-voice media.
    pub fn subtype(&self) -> &str {
        self.mime_type
            .split('/')
            .nth(1)
            .map(|s| s.split(';').next().unwrap_or(s).trim())
            .filter(|s| !s.is_empty())
            .unwrap_or("bin")
    }
}
