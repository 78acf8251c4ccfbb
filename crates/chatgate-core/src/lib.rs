//! Domain services and trait seams for chatgate.
//!
//! This crate defines the "ports" the infrastructure layer implements
//! (`MessageRepository`, `ChatConnector`) and the services built on top of
//! them: the media cache, the media stream policy, the session lifecycle
//! manager, and the contact/chat directory. It depends only on
//! `chatgate-types` -- never on `chatgate-infra` or any database/IO crate
//! beyond tokio itself.

pub mod connector;
pub mod directory;
pub mod event;
pub mod media;
pub mod repository;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
