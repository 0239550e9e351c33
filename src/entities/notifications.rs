use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub message: String,
    pub sender_avatar: Option<String>,
    pub unread: bool,
    pub created_at: DateTime<Utc>,
}
