use crate::common::context::Context;
use crate::entities::messages::{Message, NewAttachment};
use chrono::Utc;

const READ_FIELDS: &str = r#"
m.id, m.sender_id, users.username AS sender_name, m.receiver_id, m.content,
m.attachment_name, m.attachment_original_name, m.attachment_path,
m.attachment_kind, m.unread, m.created_at"#;

const FROM_JOINED: &str = "FROM messages m INNER JOIN users ON m.sender_id = users.id";

pub async fn create<C: Context>(
    ctx: &C,
    sender_id: i64,
    receiver_id: i64,
    content: &str,
    attachment: Option<&NewAttachment>,
) -> sqlx::Result<Message> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO messages (sender_id, receiver_id, content, attachment_name, ",
        "attachment_original_name, attachment_path, attachment_kind, unread, created_at) ",
        "VALUES (?, ?, ?, ?, ?, ?, ?, TRUE, ?)"
    );
    let result = sqlx::query(QUERY)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .bind(attachment.map(|a| a.stored_name.as_str()))
        .bind(attachment.map(|a| a.original_name.as_str()))
        .bind(attachment.map(|a| a.path.as_str()))
        .bind(attachment.and_then(|a| a.kind.as_deref()))
        .bind(Utc::now())
        .execute(ctx.db())
        .await?;
    fetch_one(ctx, result.last_insert_rowid()).await
}

pub async fn fetch_one<C: Context>(ctx: &C, message_id: i64) -> sqlx::Result<Message> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " ",
        FROM_JOINED,
        " WHERE m.id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(message_id)
        .fetch_one(ctx.db())
        .await
}

/// One reverse-chronological page of the conversation between `user_a` and
/// `user_b`. Ordering is by insertion id, which also breaks timestamp ties.
pub async fn fetch_page<C: Context>(
    ctx: &C,
    user_a: i64,
    user_b: i64,
    limit: usize,
    offset: usize,
) -> sqlx::Result<Vec<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " ",
        FROM_JOINED,
        " WHERE (m.sender_id = ? AND m.receiver_id = ?)",
        " OR (m.sender_id = ? AND m.receiver_id = ?)",
        " ORDER BY m.id DESC LIMIT ? OFFSET ?"
    );
    sqlx::query_as(QUERY)
        .bind(user_a)
        .bind(user_b)
        .bind(user_b)
        .bind(user_a)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(ctx.db())
        .await
}

pub async fn count_conversation<C: Context>(
    ctx: &C,
    user_a: i64,
    user_b: i64,
) -> sqlx::Result<i64> {
    const QUERY: &str = const_str::concat!(
        "SELECT COUNT(*) FROM messages",
        " WHERE (sender_id = ? AND receiver_id = ?)",
        " OR (sender_id = ? AND receiver_id = ?)"
    );
    sqlx::query_scalar(QUERY)
        .bind(user_a)
        .bind(user_b)
        .bind(user_b)
        .bind(user_a)
        .fetch_one(ctx.db())
        .await
}

pub async fn mark_read<C: Context>(ctx: &C, message_id: i64) -> sqlx::Result<()> {
    const QUERY: &str = "UPDATE messages SET unread = FALSE WHERE id = ?";
    sqlx::query(QUERY)
        .bind(message_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}

/// The most recent message for each distinct peer of `user_id`, newest
/// conversation first. `MAX(id)` picks the last write on timestamp ties.
pub async fn fetch_latest_per_peer<C: Context>(ctx: &C, user_id: i64) -> sqlx::Result<Vec<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " ",
        FROM_JOINED,
        " WHERE m.id IN (",
        "SELECT MAX(id) FROM messages WHERE sender_id = ?1 OR receiver_id = ?1 ",
        "GROUP BY CASE WHEN sender_id = ?1 THEN receiver_id ELSE sender_id END",
        ") ORDER BY m.id DESC"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .fetch_all(ctx.db())
        .await
}

pub async fn unread_counts<C: Context>(ctx: &C, receiver_id: i64) -> sqlx::Result<Vec<(i64, i64)>> {
    const QUERY: &str = const_str::concat!(
        "SELECT sender_id, COUNT(*) FROM messages",
        " WHERE receiver_id = ? AND unread IS TRUE GROUP BY sender_id"
    );
    sqlx::query_as(QUERY)
        .bind(receiver_id)
        .fetch_all(ctx.db())
        .await
}

pub async fn fetch_by_attachment_name<C: Context>(
    ctx: &C,
    stored_name: &str,
) -> sqlx::Result<Option<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " ",
        FROM_JOINED,
        " WHERE m.attachment_name = ?"
    );
    sqlx::query_as(QUERY)
        .bind(stored_name)
        .fetch_optional(ctx.db())
        .await
}
