//! Repository trait definitions and in-memory implementation.

pub mod memory;
pub mod message;

pub use message::{message_context, MessageRepository};
