//! Liveness and session-state handlers.
//!
//! Endpoints:
//! - GET /              - Plain liveness probe
//! - GET /health        - Liveness plus connection flag
//! - GET /status        - Connection state and challenge availability
//! - GET /qr-code       - Current scan challenge as a PNG data URL
//! - GET /qr-code-image - Current scan challenge as raw PNG bytes

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::json;

use chatgate_core::connector::ChatConnector;

use crate::http::error::AppError;
use crate::state::AppState;

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK" }))
}

pub async fn health<C: ChatConnector>(
    State(state): State<AppState<C>>,
) -> Json<serde_json::Value> {
    let snapshot = state.lifecycle.snapshot().await;
    Json(json!({
        "status": "healthy",
        "connected": snapshot.is_connected(),
    }))
}

/// GET /status - Connection state, whether a scan challenge is pending,
/// and the server time.
pub async fn status<C: ChatConnector>(
    State(state): State<AppState<C>>,
) -> Json<serde_json::Value> {
    let snapshot = state.lifecycle.snapshot().await;
    Json(json!({
        "connected": snapshot.is_connected(),
        "qr_code": snapshot.challenge.is_some(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /qr-code - Current challenge rendered as a PNG data URL.
pub async fn qr_code<C: ChatConnector>(
    State(state): State<AppState<C>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let png = render_challenge(&state).await?;
    let data_url = format!("data:image/png;base64,{}", BASE64.encode(&png));
    Ok(Json(json!({ "qr_code_image": data_url })))
}

/// GET /qr-code-image - Current challenge as raw PNG bytes.
pub async fn qr_code_image<C: ChatConnector>(
    State(state): State<AppState<C>>,
) -> Result<impl IntoResponse, AppError> {
    let png = render_challenge(&state).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

async fn render_challenge<C: ChatConnector>(state: &AppState<C>) -> Result<Vec<u8>, AppError> {
    let snapshot = state.lifecycle.snapshot().await;
    let Some(challenge) = snapshot.challenge else {
        return Err(AppError::NotFound("No QR code available".to_string()));
    };
    render_qr_png(&challenge)
}

fn render_qr_png(payload: &str) -> Result<Vec<u8>, AppError> {
    let code = qrcode::QrCode::new(payload.as_bytes())
        .map_err(|e| AppError::Storage(format!("failed to encode QR code: {e}")))?;

    let img = code
        .render::<image::Luma<u8>>()
        .min_dimensions(300, 300)
        .build();

    let mut png = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| AppError::Storage(format!("failed to render QR PNG: {e}")))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_render_produces_png() {
        let png = render_qr_png("challenge-payload").unwrap();
        // PNG magic bytes
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']);
    }
}
