//! Shared domain types for chatgate.
//!
//! This crate contains the types used across the chatgate workspace:
//! message records, contact/chat snapshots, session state, configuration,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod contact;
pub mod error;
pub mod message;
pub mod session;
