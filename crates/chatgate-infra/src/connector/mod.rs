//! Connector implementations.

pub mod sidecar;

pub use sidecar::SidecarConnector;
