use crate::common::context::Context;
use crate::entities::notifications::Notification;
use chrono::Utc;

const READ_FIELDS: &str = r#"
n.id, n.user_id, n.sender_id, users.username AS sender_name,
n.message, n.sender_avatar, n.unread, n.created_at"#;

const FROM_JOINED: &str = "FROM notifications n INNER JOIN users ON n.sender_id = users.id";

pub async fn create<C: Context>(
    ctx: &C,
    user_id: i64,
    sender_id: i64,
    message: &str,
    sender_avatar: Option<&str>,
) -> sqlx::Result<Notification> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO notifications (user_id, sender_id, message, sender_avatar, unread, created_at) ",
        "VALUES (?, ?, ?, ?, TRUE, ?)"
    );
    let result = sqlx::query(QUERY)
        .bind(user_id)
        .bind(sender_id)
        .bind(message)
        .bind(sender_avatar)
        .bind(Utc::now())
        .execute(ctx.db())
        .await?;
    fetch_one(ctx, result.last_insert_rowid()).await
}

pub async fn fetch_one<C: Context>(ctx: &C, notification_id: i64) -> sqlx::Result<Notification> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " ",
        FROM_JOINED,
        " WHERE n.id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(notification_id)
        .fetch_one(ctx.db())
        .await
}

/// Most-recent-first feed for a user, capped at `limit`.
pub async fn fetch_feed<C: Context>(
    ctx: &C,
    user_id: i64,
    limit: usize,
) -> sqlx::Result<Vec<Notification>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " ",
        FROM_JOINED,
        " WHERE n.user_id = ? ORDER BY n.id DESC LIMIT ?"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(ctx.db())
        .await
}

pub async fn mark_read<C: Context>(ctx: &C, notification_id: i64) -> sqlx::Result<()> {
    const QUERY: &str = "UPDATE notifications SET unread = FALSE WHERE id = ?";
    sqlx::query(QUERY)
        .bind(notification_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}

/// Deletes everything but the newest `keep` notifications per user.
pub async fn prune<C: Context>(ctx: &C, keep: usize) -> sqlx::Result<u64> {
    const QUERY: &str = const_str::concat!(
        "DELETE FROM notifications WHERE id NOT IN (",
        "SELECT id FROM notifications AS recent ",
        "WHERE recent.user_id = notifications.user_id ",
        "ORDER BY recent.id DESC LIMIT ?",
        ")"
    );
    let result = sqlx::query(QUERY)
        .bind(keep as i64)
        .execute(ctx.db())
        .await?;
    Ok(result.rows_affected())
}
