use crate::models::events::Event;
use hashbrown::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

pub type EventSender = UnboundedSender<Event>;

/// Tracks which users currently hold open delivery channels.
///
/// A user may hold several channels at once (one per tab/device); the entry
/// for a user exists only while at least one channel is registered. This is
/// process-local state, owned by the server and injected where needed; it is
/// constructed at startup and dropped at shutdown.
pub struct PresenceRegistry {
    channels: Mutex<HashMap<i64, HashMap<Uuid, EventSender>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Associates a new channel with `user_id` and returns its handle id.
    pub fn register(&self, user_id: i64, sender: EventSender) -> Uuid {
        let channel_id = Uuid::new_v4();
        let mut channels = self.channels.lock().unwrap();
        channels
            .entry(user_id)
            .or_default()
            .insert(channel_id, sender);
        channel_id
    }

    /// Removes a single channel. When it was the user's last channel the
    /// user transitions to offline implicitly; there is no offline state.
    pub fn unregister(&self, user_id: i64, channel_id: Uuid) {
        let mut channels = self.channels.lock().unwrap();
        if let Some(user_channels) = channels.get_mut(&user_id) {
            user_channels.remove(&channel_id);
            if user_channels.is_empty() {
                channels.remove(&user_id);
            }
        }
    }

    /// Snapshot of the user's open channels, possibly empty.
    pub fn channels_for(&self, user_id: i64) -> Vec<EventSender> {
        let channels = self.channels.lock().unwrap();
        channels
            .get(&user_id)
            .map(|user_channels| user_channels.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_online(&self, user_id: i64) -> bool {
        self.channels.lock().unwrap().contains_key(&user_id)
    }

    /// Number of distinct users with at least one open channel.
    pub fn online_count(&self) -> usize {
        self.channels.lock().unwrap().len()
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
