//! Connection/session lifecycle management.

pub mod lifecycle;

pub use lifecycle::SessionLifecycle;
