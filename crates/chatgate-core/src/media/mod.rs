//! Media persistence and delivery.
//!
//! [`cache`] downloads and stores media bytes exactly once per message;
//! [`stream`] decides how cached files are served over HTTP, including
//! byte-range delivery for video.

pub mod cache;
pub mod stream;

pub use cache::MediaCache;
