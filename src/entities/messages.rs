use chrono::{DateTime, Utc};

/// Attachment metadata recorded alongside a message at insert time.
pub struct NewAttachment {
    pub stored_name: String,
    pub original_name: String,
    pub path: String,
    pub kind: Option<String>,
}

#[derive(sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub receiver_id: i64,
    pub content: String,
    pub attachment_name: Option<String>,
    pub attachment_original_name: Option<String>,
    pub attachment_path: Option<String>,
    pub attachment_kind: Option<String>,
    pub unread: bool,
    pub created_at: DateTime<Utc>,
}
