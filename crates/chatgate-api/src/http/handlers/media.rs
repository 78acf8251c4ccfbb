//! Cached-media delivery handlers.
//!
//! Endpoints:
//! - GET /media/{message_id}        - Stream cached media, with Range support for video
//! - GET /stream-url/{message_id}   - URL of the media endpoint for a message
//! - GET /download-media?message_id= - Attachment download of cached media
//!
//! Range handling applies only to range-capable types (video): a single
//! `bytes=start-end` range yields 206 with `Content-Range`; malformed or
//! unsatisfiable ranges yield 416 with `Content-Range: bytes */{size}`.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use chatgate_core::connector::ChatConnector;
use chatgate_core::media::stream::{parse_range, policy_for, Disposition, StreamPolicy};
use chatgate_core::repository::MessageRepository;
use chatgate_types::message::MessageRecord;

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub message_id: Option<String>,
}

/// GET /media/{message_id} - Stream a message's cached media.
pub async fn serve_media<C: ChatConnector>(
    State(state): State<AppState<C>>,
    Path(message_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (record, path) = resolve_media(&state, &message_id).await?;
    let policy = policy_for(record.kind, &path);

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| AppError::Storage(format!("cannot open cached media: {e}")))?;
    let file_size = file
        .metadata()
        .await
        .map_err(|e| AppError::Storage(format!("cannot stat cached media: {e}")))?
        .len();

    let range_header = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .filter(|_| policy.range_capable);

    if let Some(raw) = range_header {
        return match parse_range(raw, file_size) {
            Ok(range) => partial_response(file, file_size, range, &policy).await,
            Err(_) => Ok(range_not_satisfiable(file_size)),
        };
    }

    full_response(file, file_size, &policy)
}

/// GET /stream-url/{message_id} - Where to stream a message's media from.
pub async fn stream_url<C: ChatConnector>(
    State(state): State<AppState<C>>,
    Path(message_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let record = lookup_record(&state, &message_id).await?;
    if !record.has_media {
        return Err(AppError::NotFound("No media for this message".to_string()));
    }
    Ok(Json(json!({ "url": format!("/media/{message_id}") })))
}

/// GET /download-media - Force an attachment download of cached media.
pub async fn download_media<C: ChatConnector>(
    State(state): State<AppState<C>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    let message_id = query
        .message_id
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            AppError::Validation("Query parameter 'message_id' is required".to_string())
        })?;

    let (record, path) = resolve_media(&state, &message_id).await?;

    let mut policy = policy_for(record.kind, &path);
    policy.disposition = Disposition::Attachment {
        filename: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| message_id.clone()),
    };

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| AppError::Storage(format!("cannot open cached media: {e}")))?;
    let file_size = file
        .metadata()
        .await
        .map_err(|e| AppError::Storage(format!("cannot stat cached media: {e}")))?
        .len();

    full_response(file, file_size, &policy)
}

async fn lookup_record<C: ChatConnector>(
    state: &AppState<C>,
    message_id: &str,
) -> Result<MessageRecord, AppError> {
    state
        .repo
        .get_by_id(message_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Message '{message_id}' not found")))
}

/// Resolve a message's media to its cached on-disk path.
///
/// Pure cache read: the connector is never asked from here. A record
/// whose media was never cached, or whose cached file has gone missing,
/// yields NotFound. Downloads happen at ingestion time, in
/// /list-messages and the inbound event loop.
async fn resolve_media<C: ChatConnector>(
    state: &AppState<C>,
    message_id: &str,
) -> Result<(MessageRecord, std::path::PathBuf), AppError> {
    let record = lookup_record(state, message_id).await?;
    let path = record
        .media_path
        .as_deref()
        .map(std::path::PathBuf::from)
        .ok_or_else(|| AppError::NotFound("No media for this message".to_string()))?;
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(AppError::NotFound("No media for this message".to_string()));
    }
    Ok((record, path))
}

fn disposition_value(policy: &StreamPolicy) -> String {
    match &policy.disposition {
        Disposition::Inline => "inline".to_string(),
        Disposition::Attachment { filename } => {
            format!("attachment; filename=\"{}\"", sanitize_filename(filename))
        }
    }
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c == '"' || c == '\\' { '_' } else { c })
        .collect()
}

fn full_response(
    file: tokio::fs::File,
    file_size: u64,
    policy: &StreamPolicy,
) -> Result<Response, AppError> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, &policy.content_type)
        .header(header::CONTENT_DISPOSITION, disposition_value(policy))
        .header(header::CONTENT_LENGTH, file_size);

    if policy.range_capable {
        builder = builder.header(header::ACCEPT_RANGES, "bytes");
    }

    builder
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::Storage(e.to_string()))
}

async fn partial_response(
    mut file: tokio::fs::File,
    file_size: u64,
    range: chatgate_core::media::stream::ByteRange,
    policy: &StreamPolicy,
) -> Result<Response, AppError> {
    file.seek(std::io::SeekFrom::Start(range.start))
        .await
        .map_err(|e| AppError::Storage(format!("cannot seek cached media: {e}")))?;
    let reader = file.take(range.byte_len());

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_TYPE, &policy.content_type)
        .header(header::CONTENT_DISPOSITION, disposition_value(policy))
        .header(header::CONTENT_RANGE, range.content_range(file_size))
        .header(header::CONTENT_LENGTH, range.byte_len())
        .header(header::ACCEPT_RANGES, "bytes")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Storage(e.to_string()))
}

fn range_not_satisfiable(file_size: u64) -> Response {
    (
        StatusCode::RANGE_NOT_SATISFIABLE,
        [(header::CONTENT_RANGE, format!("bytes */{file_size}"))],
        Json(json!({ "error": "Requested range not satisfiable" })),
    )
        .into_response()
}
