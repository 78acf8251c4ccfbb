//! Axum router configuration with middleware.
//!
//! Middleware: CORS (any origin) and request tracing. Routes live at the
//! root, matching what existing clients of the gateway call.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use chatgate_core::connector::ChatConnector;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router<C: ChatConnector>(state: AppState<C>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Liveness and session state
        .route("/", get(handlers::status::root))
        .route("/health", get(handlers::status::health))
        .route("/status", get(handlers::status::status))
        .route("/qr-code", get(handlers::status::qr_code))
        .route("/qr-code-image", get(handlers::status::qr_code_image))
        // Contacts
        .route("/list-contacts", get(handlers::contacts::list_contacts))
        .route("/search-contacts", get(handlers::contacts::search_contacts))
        // Chats
        .route("/list-chats", get(handlers::chats::list_chats))
        .route("/unread-chats", get(handlers::chats::unread_chats))
        .route("/get-chat", get(handlers::chats::get_chat))
        .route(
            "/get-direct-chat-by-contact",
            get(handlers::chats::get_direct_chat_by_contact),
        )
        .route("/get-contact-chats", get(handlers::chats::get_contact_chats))
        // Messages
        .route("/list-messages", get(handlers::messages::list_messages))
        .route("/messages", get(handlers::messages::recent_messages))
        .route(
            "/get-last-interaction",
            get(handlers::messages::get_last_interaction),
        )
        .route(
            "/get-message-context",
            get(handlers::messages::get_message_context),
        )
        // Media
        .route("/media/{message_id}", get(handlers::media::serve_media))
        .route("/stream-url/{message_id}", get(handlers::media::stream_url))
        .route("/download-media", get(handlers::media::download_media))
        // Sending
        .route("/send-message", post(handlers::send::send_message))
        .route("/send-file", post(handlers::send::send_file))
        .route(
            "/send-audio-message",
            post(handlers::send::send_audio_message),
        )
        // Session control
        .route("/reconnect", post(handlers::session::reconnect))
        .route("/disconnect", post(handlers::session::disconnect))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
