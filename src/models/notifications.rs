use crate::entities::notifications::Notification as NotificationEntity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: i64,
    pub user_id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub message: String,
    pub sender_avatar: Option<String>,
    pub unread: bool,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationEntity> for Notification {
    fn from(value: NotificationEntity) -> Self {
        Self {
            notification_id: value.id,
            user_id: value.user_id,
            sender_id: value.sender_id,
            sender_name: value.sender_name,
            message: value.message,
            sender_avatar: value.sender_avatar,
            unread: value.unread,
            created_at: value.created_at,
        }
    }
}
