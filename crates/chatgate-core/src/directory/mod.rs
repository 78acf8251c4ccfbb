//! Contact and chat directory: filtered views over connector snapshots.
//!
//! Listings hide group pseudo-contacts, unsaved contacts, nameless
//! entries, and anything the exclusion policy flags as an automated
//! assistant. Search is deliberately wider than listing: it matches
//! every saved individual contact and does not apply the exclusion
//! policy, so a known-but-excluded contact can still be found by name.

use std::sync::Arc;

use chatgate_types::config::ExclusionPolicy;
use chatgate_types::contact::{ChatInfo, Contact};
use chatgate_types::error::ConnectorError;

use crate::connector::ChatConnector;

/// Filtered contact/chat views over the connector's snapshots.
pub struct DirectoryService<C> {
    connector: Arc<C>,
    policy: ExclusionPolicy,
}

impl<C: ChatConnector> DirectoryService<C> {
    pub fn new(connector: Arc<C>, policy: ExclusionPolicy) -> Self {
        Self { connector, policy }
    }

    /// Saved individual contacts with a display name, minus excluded ones.
    pub async fn list_contacts(&self) -> Result<Vec<Contact>, ConnectorError> {
        let contacts = self.connector.list_contacts().await?;
        Ok(contacts
            .into_iter()
            .filter(|c| self.is_listable(c))
            .collect())
    }

    /// Case-insensitive substring search over saved individual contacts.
    ///
    /// Matches name, pushname, number, and id. An empty query matches
    /// nothing. The exclusion policy does not apply here.
    pub async fn search_contacts(&self, query: &str) -> Result<Vec<Contact>, ConnectorError> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let contacts = self.connector.list_contacts().await?;
        Ok(contacts
            .into_iter()
            .filter(|c| !c.is_group && c.is_my_contact)
            .filter(|c| {
                let fields = [
                    c.name.as_deref(),
                    c.pushname.as_deref(),
                    c.number.as_deref(),
                    Some(c.id.as_str()),
                ];
                fields
                    .into_iter()
                    .flatten()
                    .any(|f| f.to_lowercase().contains(&query))
            })
            .collect())
    }

    /// Every chat the connector reports.
    pub async fn list_chats(&self) -> Result<Vec<ChatInfo>, ConnectorError> {
        self.connector.list_chats().await
    }

    /// Chats with at least one unread message.
    pub async fn unread_chats(&self) -> Result<Vec<ChatInfo>, ConnectorError> {
        let chats = self.connector.list_chats().await?;
        Ok(chats.into_iter().filter(|c| c.unread_count > 0).collect())
    }

    /// A single chat by id, if it exists.
    pub async fn get_chat(&self, chat_id: &str) -> Result<Option<ChatInfo>, ConnectorError> {
        self.connector.get_chat_by_id(chat_id).await
    }

    /// The one-on-one chat with a contact, if any exists.
    pub async fn direct_chat(&self, contact_id: &str) -> Result<Option<ChatInfo>, ConnectorError> {
        let chats = self.connector.list_chats().await?;
        Ok(chats
            .into_iter()
            .find(|c| !c.is_group && c.id == contact_id))
    }

    /// Every chat a contact appears in: the direct chat plus any group
    /// chat listing them as a participant.
    pub async fn contact_chats(&self, contact_id: &str) -> Result<Vec<ChatInfo>, ConnectorError> {
        let chats = self.connector.list_chats().await?;
        Ok(chats
            .into_iter()
            .filter(|c| {
                if c.is_group {
                    c.participants.iter().any(|p| p == contact_id)
                } else {
                    c.id == contact_id
                }
            })
            .collect())
    }

    fn is_listable(&self, contact: &Contact) -> bool {
        !contact.is_group
            && contact.is_my_contact
            && contact.has_display_name()
            && !self
                .policy
                .is_excluded(Some(contact.display_name()), contact.number.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockConnector;

    fn contact(id: &str, name: Option<&str>, number: &str) -> Contact {
        Contact {
            id: id.to_string(),
            name: name.map(String::from),
            pushname: None,
            number: Some(number.to_string()),
            is_my_contact: true,
            is_group: false,
        }
    }

    fn chat(id: &str, is_group: bool, unread: u32) -> ChatInfo {
        ChatInfo {
            id: id.to_string(),
            name: None,
            last_message_time: Some(1_700_000_000),
            last_message_body: None,
            unread_count: unread,
            is_group,
            participants: Vec::new(),
        }
    }

    fn directory(connector: MockConnector) -> DirectoryService<MockConnector> {
        DirectoryService::new(Arc::new(connector), ExclusionPolicy::default())
    }

    #[tokio::test]
    async fn listing_filters_groups_unsaved_and_excluded() {
        let mut connector = MockConnector::new();
        connector.contacts = vec![
            contact("alice@c.us", Some("Alice"), "447911000001"),
            contact("coach@c.us", Some("Business Coach Bot"), "447911000002"),
            contact("meta@c.us", Some("Helper"), "13135551234"),
            Contact {
                is_my_contact: false,
                ..contact("stranger@c.us", Some("Stranger"), "447911000003")
            },
            Contact {
                is_group: true,
                ..contact("group@g.us", Some("Family"), "447911000004")
            },
            contact("ghost@c.us", None, "447911000005"),
        ];

        let listed = directory(connector).list_contacts().await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["alice@c.us"]);
    }

    #[tokio::test]
    async fn search_ignores_exclusion_policy() {
        let mut connector = MockConnector::new();
        connector.contacts = vec![
            contact("alice@c.us", Some("Alice"), "447911000001"),
            contact("coach@c.us", Some("Business Coach Bot"), "447911000002"),
        ];

        let dir = directory(connector);
        let hits = dir.search_contacts("coach").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "coach@c.us");

        // Number and id are searchable too.
        assert_eq!(dir.search_contacts("447911000001").await.unwrap().len(), 1);
        assert_eq!(dir.search_contacts("ALICE").await.unwrap().len(), 1);
        assert!(dir.search_contacts("   ").await.unwrap().is_empty());
        assert!(dir.search_contacts("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unread_chats_filters_on_count() {
        let mut connector = MockConnector::new();
        connector.chats = vec![
            chat("a@c.us", false, 0),
            chat("b@c.us", false, 3),
            chat("g@g.us", true, 1),
        ];

        let unread = directory(connector).unread_chats().await.unwrap();
        let ids: Vec<&str> = unread.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b@c.us", "g@g.us"]);
    }

    #[tokio::test]
    async fn direct_chat_skips_groups_with_same_id() {
        let mut connector = MockConnector::new();
        connector.chats = vec![
            chat("alice@c.us", true, 0),
            chat("alice@c.us", false, 0),
            chat("bob@c.us", false, 0),
        ];

        let dir = directory(connector);
        let direct = dir.direct_chat("alice@c.us").await.unwrap().unwrap();
        assert!(!direct.is_group);
        assert!(dir.direct_chat("carol@c.us").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn contact_chats_includes_direct_and_groups() {
        let mut connector = MockConnector::new();
        let mut family = chat("family@g.us", true, 0);
        family.participants = vec!["alice@c.us".to_string(), "bob@c.us".to_string()];
        let mut work = chat("work@g.us", true, 0);
        work.participants = vec!["bob@c.us".to_string()];
        connector.chats = vec![chat("alice@c.us", false, 0), family, work];

        let chats = directory(connector).contact_chats("alice@c.us").await.unwrap();
        let ids: Vec<&str> = chats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["alice@c.us", "family@g.us"]);
    }
}
