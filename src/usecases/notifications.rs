use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::events::Event;
use crate::models::notifications::Notification;
use crate::repositories::notifications;
use crate::usecases::users;

pub const FEED_LIMIT_DEFAULT: usize = 10;
pub const FEED_LIMIT_MAX: usize = 50;

/// Persists a derived alert for `target_user` and pushes it to their open
/// channels. The notification is independent of the originating message;
/// it survives even if the message is later edited or removed elsewhere.
pub async fn notify<C: Context>(
    ctx: &C,
    target_user: i64,
    sender_id: i64,
) -> ServiceResult<Notification> {
    let sender = users::fetch_one(ctx, sender_id).await?;
    let summary = format!("New message from {}", sender.username);
    let entity =
        notifications::create(ctx, target_user, sender_id, &summary, sender.avatar.as_deref())
            .await?;
    let notification = Notification::from(entity);
    ctx.dispatcher()
        .publish(target_user, Event::NewNotification(notification.clone()))
        .await;
    Ok(notification)
}

/// Bounded most-recent-first feed. Older notifications are not retrievable
/// through this interface.
pub async fn feed_for<C: Context>(
    ctx: &C,
    user_id: i64,
    limit: Option<usize>,
) -> ServiceResult<Vec<Notification>> {
    let limit = limit
        .unwrap_or(FEED_LIMIT_DEFAULT)
        .clamp(1, FEED_LIMIT_MAX);
    match notifications::fetch_feed(ctx, user_id, limit).await {
        Ok(entities) => Ok(entities.into_iter().map(Notification::from).collect()),
        Err(e) => unexpected(e),
    }
}

/// Idempotent; re-marking an already-read notification is a no-op success.
pub async fn mark_read<C: Context>(ctx: &C, notification_id: i64) -> ServiceResult<Notification> {
    notifications::mark_read(ctx, notification_id).await?;
    match notifications::fetch_one(ctx, notification_id).await {
        Ok(entity) => Ok(Notification::from(entity)),
        Err(sqlx::Error::RowNotFound) => Err(AppError::NotificationsNotFound),
        Err(e) => unexpected(e),
    }
}
