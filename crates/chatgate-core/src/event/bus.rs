//! Broadcast event bus for distributing [`ConnectorEvent`]s to subscribers.
//!
//! Built on `tokio::sync::broadcast`. The connector implementation pumps
//! its callbacks/stream into the bus; the lifecycle manager and the
//! message-ingest loop each hold their own receiver. Publishing with no
//! active subscribers is a no-op.

use tokio::sync::broadcast;

use crate::connector::ConnectorEvent;

/// Multi-consumer bus for connector events.
///
/// Wraps a `tokio::sync::broadcast` channel. Cloning the bus clones the
/// sender, allowing multiple producers and consumers.
pub struct EventBus {
    sender: broadcast::Sender<ConnectorEvent>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectorEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no subscribers, the event is silently dropped.
    pub fn publish(&self, event: ConnectorEvent) {
        let _ = self.sender.send(event);
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_subscribe_delivers_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(ConnectorEvent::Ready);

        let received = rx.recv().await.unwrap();
        assert!(matches!(received, ConnectorEvent::Ready));
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive_event() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(ConnectorEvent::Authenticated);

        assert!(matches!(rx1.recv().await.unwrap(), ConnectorEvent::Authenticated));
        assert!(matches!(rx2.recv().await.unwrap(), ConnectorEvent::Authenticated));
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::new(16);
        bus.publish(ConnectorEvent::Ready);
        bus.publish(ConnectorEvent::Ready);
    }
}
