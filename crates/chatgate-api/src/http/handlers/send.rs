//! Outbound send handlers.
//!
//! Endpoints:
//! - POST /send-message       - JSON {to, message}
//! - POST /send-file          - multipart: file, to, caption?
//! - POST /send-audio-message - multipart: file, to; transcoded to a voice note
//!
//! Recipients are normalized to the individual address form: everything
//! but digits is stripped and the `@c.us` suffix appended. Sends are
//! rejected up front while the session is disconnected.

use std::io::Write as _;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use chatgate_core::connector::{ChatConnector, OutboundMedia};
use chatgate_infra::transcode::transcode_to_voice;

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    pub to: Option<String>,
    pub message: Option<String>,
}

/// Normalize a recipient to `digits@c.us`.
fn normalize_recipient(to: &str) -> Result<String, AppError> {
    let digits: String = to.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(AppError::Validation(format!(
            "Recipient '{to}' contains no digits"
        )));
    }
    Ok(format!("{digits}@c.us"))
}

async fn require_connected<C: ChatConnector>(state: &AppState<C>) -> Result<(), AppError> {
    if !state.lifecycle.snapshot().await.is_connected() {
        return Err(AppError::NotConnected);
    }
    Ok(())
}

fn sent_response(message_id: String, recipient: String) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message_id": message_id,
        "recipient": recipient,
        "sent_at": chrono::Utc::now().to_rfc3339(),
    }))
}

/// POST /send-message - Send a text message.
pub async fn send_message<C: ChatConnector>(
    State(state): State<AppState<C>>,
    Json(body): Json<SendMessageBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let to = body
        .to
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Field 'to' is required".to_string()))?;
    let message = body
        .message
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation("Field 'message' is required".to_string()))?;

    require_connected(&state).await?;
    let recipient = normalize_recipient(&to)?;

    let message_id = state.connector.send_message(&recipient, &message).await?;
    info!(recipient = %recipient, message_id = %message_id, "text message sent");

    Ok(sent_response(message_id, recipient))
}

/// Collected multipart fields for file sends.
struct Upload {
    file: tempfile::NamedTempFile,
    filename: Option<String>,
    to: String,
    caption: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut file = None;
    let mut filename = None;
    let mut to = None;
    let mut caption = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Bad multipart body: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                filename = field.file_name().map(String::from);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Bad file field: {e}")))?;
                let mut tmp = tempfile::NamedTempFile::new()
                    .map_err(|e| AppError::Storage(format!("cannot stage upload: {e}")))?;
                tmp.write_all(&bytes)
                    .map_err(|e| AppError::Storage(format!("cannot stage upload: {e}")))?;
                file = Some(tmp);
            }
            "to" => {
                to = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Bad 'to' field: {e}"))
                })?);
            }
            "caption" => {
                caption = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Bad 'caption' field: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::Validation("Field 'file' is required".to_string()))?;
    let to = to
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Field 'to' is required".to_string()))?;

    Ok(Upload {
        file,
        filename,
        to,
        caption,
    })
}

/// POST /send-file - Send an uploaded file as a document/media message.
pub async fn send_file<C: ChatConnector>(
    State(state): State<AppState<C>>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let upload = read_upload(multipart).await?;
    require_connected(&state).await?;
    let recipient = normalize_recipient(&upload.to)?;

    let message_id = state
        .connector
        .send_media(OutboundMedia {
            chat_id: recipient.clone(),
            path: upload.file.path().to_path_buf(),
            filename: upload.filename.clone(),
            caption: upload.caption.clone(),
            as_voice: false,
        })
        .await?;
    info!(recipient = %recipient, message_id = %message_id, "file sent");

    // `upload.file` drops here, deleting the staged temp file.
    Ok(sent_response(message_id, recipient))
}

/// POST /send-audio-message - Transcode uploaded audio to opus/ogg and
/// send it as a voice note.
pub async fn send_audio_message<C: ChatConnector>(
    State(state): State<AppState<C>>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let upload = read_upload(multipart).await?;
    require_connected(&state).await?;
    let recipient = normalize_recipient(&upload.to)?;

    let voice = transcode_to_voice(upload.file.path())
        .await
        .map_err(|e| AppError::Storage(format!("audio transcode failed: {e}")))?;

    let message_id = state
        .connector
        .send_media(OutboundMedia {
            chat_id: recipient.clone(),
            path: voice.path().to_path_buf(),
            filename: None,
            caption: None,
            as_voice: true,
        })
        .await?;
    info!(recipient = %recipient, message_id = %message_id, "voice note sent");

    // Both temp files drop here, success or not.
    Ok(sent_response(message_id, recipient))
}
