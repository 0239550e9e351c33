use crate::models::events::Event;
use crate::realtime::presence::PresenceRegistry;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Best-effort delivery of events to a user's open channels.
///
/// Topic is the target user id; delivery is at-most-once with no ack, retry
/// or offline queueing. The durable store is the source of truth: a client
/// that misses a push re-fetches through history and the notification feed.
/// Implementations for a shared backplane can replace [`LocalDispatcher`]
/// without touching callers.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn publish(&self, target_user: i64, event: Event);
}

/// In-process fan-out over the [`PresenceRegistry`].
pub struct LocalDispatcher {
    registry: Arc<PresenceRegistry>,
}

impl LocalDispatcher {
    pub fn new(registry: Arc<PresenceRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Dispatcher for LocalDispatcher {
    async fn publish(&self, target_user: i64, event: Event) {
        let channels = self.registry.channels_for(target_user);
        if channels.is_empty() {
            debug!(user_id = target_user, "No open channels, push skipped");
            return;
        }
        for channel in channels {
            // A closed channel here means the socket task is tearing down
            // and will unregister itself; the event is still durable.
            if channel.send(event.clone()).is_err() {
                debug!(user_id = target_user, "Push to closed channel dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Dispatcher, LocalDispatcher};
    use crate::models::events::Event;
    use crate::models::messages::Message;
    use crate::realtime::presence::PresenceRegistry;
    use chrono::Utc;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn test_event() -> Event {
        Event::NewMessage(Message {
            message_id: 1,
            sender_id: 1,
            sender_name: "mira".to_string(),
            receiver_id: 2,
            content: "Hello".to_string(),
            attachment: None,
            unread: true,
            created_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn publish_reaches_every_open_channel() {
        let registry = Arc::new(PresenceRegistry::new());
        let dispatcher = LocalDispatcher::new(registry.clone());
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        registry.register(2, tx1);
        registry.register(2, tx2);

        dispatcher.publish(2, test_event()).await;

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn publish_to_offline_user_is_a_silent_noop() {
        let registry = Arc::new(PresenceRegistry::new());
        let dispatcher = LocalDispatcher::new(registry);
        dispatcher.publish(99, test_event()).await;
    }

    #[tokio::test]
    async fn publish_after_unregister_delivers_nothing() {
        let registry = Arc::new(PresenceRegistry::new());
        let dispatcher = LocalDispatcher::new(registry.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let channel_id = registry.register(2, tx);
        registry.unregister(2, channel_id);

        dispatcher.publish(2, test_event()).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropped_receiver_does_not_poison_other_channels() {
        let registry = Arc::new(PresenceRegistry::new());
        let dispatcher = LocalDispatcher::new(registry.clone());
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        registry.register(2, tx_dead);
        registry.register(2, tx_live);
        drop(rx_dead);

        dispatcher.publish(2, test_event()).await;
        assert!(rx_live.try_recv().is_ok());
    }
}
