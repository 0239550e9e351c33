use crate::models::messages::Message;
use crate::models::notifications::Notification;
use serde::{Deserialize, Serialize};

/// Event pushed to a user's open channels. The tag values are part of the
/// client contract: clients subscribe to `newMessage` and `newNotification`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum Event {
    NewMessage(Message),
    NewNotification(Notification),
}

#[cfg(test)]
mod tests {
    use super::Event;
    use crate::models::notifications::Notification;
    use chrono::Utc;

    #[test]
    fn event_tags_match_client_contract() {
        let event = Event::NewNotification(Notification {
            notification_id: 1,
            user_id: 2,
            sender_id: 3,
            sender_name: "ari".to_string(),
            message: "New message from ari".to_string(),
            sender_avatar: None,
            unread: true,
            created_at: Utc::now(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "newNotification");
        assert_eq!(json["data"]["sender_name"], "ari");
    }
}
