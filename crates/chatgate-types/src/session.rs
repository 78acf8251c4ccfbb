//! Connection/session state shared between the lifecycle manager and readers.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Connection state of the underlying chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    AwaitingScan,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::AwaitingScan => write!(f, "awaiting_scan"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

/// Point-in-time view of the session owned by the lifecycle manager.
///
/// The challenge payload is present only while awaiting a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: ConnectionState,
    pub challenge: Option<String>,
}

impl SessionSnapshot {
    pub fn disconnected() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            challenge: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

/// Why the connector reported the session as ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectReason {
    /// The account owner logged the device out; all session artifacts
    /// must be destroyed before reinitializing.
    Logout,
    /// Any other reason (network drop, engine restart, ...).
    Other(String),
}

impl DisconnectReason {
    pub fn is_logout(&self) -> bool {
        matches!(self, DisconnectReason::Logout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot() {
        let s = SessionSnapshot::disconnected();
        assert_eq!(s.state, ConnectionState::Disconnected);
        assert!(s.challenge.is_none());
        assert!(!s.is_connected());
    }

    #[test]
    fn test_logout_reason() {
        assert!(DisconnectReason::Logout.is_logout());
        assert!(!DisconnectReason::Other("navigation".to_string()).is_logout());
    }
}
