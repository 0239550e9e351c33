use crate::entities::messages::Message as MessageEntity;
use crate::models::users::UserDisplay;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attachment {
    pub stored_name: String,
    pub original_name: String,
    pub path: String,
    pub kind: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub receiver_id: i64,
    pub content: String,
    pub attachment: Option<Attachment>,
    pub unread: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MessageEntity> for Message {
    fn from(value: MessageEntity) -> Self {
        let attachment = match (value.attachment_name, value.attachment_path) {
            (Some(stored_name), Some(path)) => Some(Attachment {
                original_name: value
                    .attachment_original_name
                    .unwrap_or_else(|| stored_name.clone()),
                stored_name,
                path,
                kind: value.attachment_kind,
            }),
            _ => None,
        };
        Self {
            message_id: value.id,
            sender_id: value.sender_id,
            sender_name: value.sender_name,
            receiver_id: value.receiver_id,
            content: value.content,
            attachment,
            unread: value.unread,
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct ConversationEntry {
    pub peer: UserDisplay,
    pub last_message: Message,
}

#[derive(Serialize)]
pub struct MessageHistory {
    pub messages: Vec<Message>,
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
}

impl MessageHistory {
    pub fn total_pages(total_count: usize, page_size: usize) -> usize {
        total_count.div_ceil(page_size)
    }
}
