//! Infrastructure implementations for chatgate.
//!
//! SQLite persistence behind the `chatgate-core` repository trait, the
//! HTTP/SSE client for the external connector sidecar, and the ffmpeg
//! voice-note transcoder.

pub mod connector;
pub mod sqlite;
pub mod transcode;
