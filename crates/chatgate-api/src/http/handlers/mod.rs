//! HTTP request handlers.

pub mod chats;
pub mod contacts;
pub mod media;
pub mod messages;
pub mod send;
pub mod session;
pub mod status;
