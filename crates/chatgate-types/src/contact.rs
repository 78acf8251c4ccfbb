//! Contact and chat snapshot types.
//!
//! These mirror what the connector reports in its full contact/chat
//! snapshots. Filtering and projection over them happens in
//! `chatgate-core::directory`.

use serde::{Deserialize, Serialize};

/// A contact as reported by the connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    /// Full connector id, e.g. `4479…@c.us`.
    pub id: String,
    /// Address-book name, if the account owner saved one.
    #[serde(default)]
    pub name: Option<String>,
    /// Self-assigned display name.
    #[serde(default)]
    pub pushname: Option<String>,
    /// Bare phone number, digits only.
    #[serde(default)]
    pub number: Option<String>,
    /// Whether the account owner explicitly saved this contact.
    #[serde(default)]
    pub is_my_contact: bool,
    /// Group pseudo-contacts are excluded from contact listings.
    #[serde(default)]
    pub is_group: bool,
}

impl Contact {
    /// Best display name: saved name, falling back to pushname.
    pub fn display_name(&self) -> &str {
        non_empty(self.name.as_deref())
            .or_else(|| non_empty(self.pushname.as_deref()))
            .unwrap_or("")
    }

    /// True when the contact has any non-blank name to show.
    pub fn has_display_name(&self) -> bool {
        !self.display_name().is_empty()
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// A chat as reported by the connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Timestamp of the most recent message, seconds since epoch.
    #[serde(default)]
    pub last_message_time: Option<i64>,
    #[serde(default)]
    pub last_message_body: Option<String>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub is_group: bool,
    /// Participant ids; populated for group chats only.
    #[serde(default)]
    pub participants: Vec<String>,
}
