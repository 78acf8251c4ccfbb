//! The contract chatgate requires from the external chat connector.
//!
//! The connector is the chat-protocol/browser-automation engine living
//! outside this codebase. It pushes events (scan challenge, ready,
//! session ended, inbound messages) and answers synchronous calls
//! (snapshots, sends, media downloads). chatgate never implements the
//! wire protocol itself.

use std::path::PathBuf;

use tokio::sync::broadcast;

use chatgate_types::contact::{ChatInfo, Contact};
use chatgate_types::error::ConnectorError;
use chatgate_types::message::{InboundMessage, MediaPayload};
use chatgate_types::session::DisconnectReason;

/// Events pushed by the connector.
#[derive(Debug, Clone)]
pub enum ConnectorEvent {
    /// A new scan challenge was issued; the payload is the opaque string
    /// the account owner must scan to authenticate.
    ChallengeIssued { payload: String },
    /// The challenge was accepted. The session is not usable yet.
    Authenticated,
    /// The session is fully connected and usable.
    Ready,
    /// The session ended, with the connector's stated reason.
    SessionEnded { reason: DisconnectReason },
    /// An inbound chat message arrived.
    MessageReceived(InboundMessage),
}

/// Outbound media send request.
#[derive(Debug, Clone)]
pub struct OutboundMedia {
    pub chat_id: String,
    /// Local file whose bytes should be sent.
    pub path: PathBuf,
    /// Original filename to present to the recipient, when known.
    pub filename: Option<String>,
    pub caption: Option<String>,
    /// Send as a voice note (player-style rendering) rather than a file.
    pub as_voice: bool,
}

/// Operations chatgate issues against the connector.
///
/// Every call is a network/automation round-trip and therefore a
/// suspension point. Uses native async fn in traits; services hold the
/// connector as a generic parameter pinned in the application state.
pub trait ChatConnector: Send + Sync + 'static {
    /// Subscribe to the connector's event stream.
    fn events(&self) -> broadcast::Receiver<ConnectorEvent>;

    /// Start (or restart) the underlying engine.
    fn initialize(&self)
    -> impl std::future::Future<Output = Result<(), ConnectorError>> + Send;

    /// Tear the engine down. Resolves only once teardown is complete, so
    /// callers may safely delete on-disk session artifacts afterwards.
    fn teardown(&self) -> impl std::future::Future<Output = Result<(), ConnectorError>> + Send;

    /// Full contact snapshot.
    fn list_contacts(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Contact>, ConnectorError>> + Send;

    /// Full chat snapshot.
    fn list_chats(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ChatInfo>, ConnectorError>> + Send;

    /// A single chat by id, if it exists.
    fn get_chat_by_id(
        &self,
        chat_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<ChatInfo>, ConnectorError>> + Send;

    /// Recent message history for a chat, newest last.
    fn fetch_messages(
        &self,
        chat_id: &str,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<InboundMessage>, ConnectorError>> + Send;

    /// Raw media bytes and declared MIME type for a message, or `None`
    /// when the message carries no media.
    fn download_media(
        &self,
        message_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<MediaPayload>, ConnectorError>> + Send;

    /// Send a text message. Returns the connector-assigned message id.
    fn send_message(
        &self,
        chat_id: &str,
        body: &str,
    ) -> impl std::future::Future<Output = Result<String, ConnectorError>> + Send;

    /// Send a media file. Returns the connector-assigned message id.
    fn send_media(
        &self,
        media: OutboundMedia,
    ) -> impl std::future::Future<Output = Result<String, ConnectorError>> + Send;
}
