use crate::api::{AuthedUser, RequestContext};
use crate::common::error::ServiceResponse;
use crate::models::notifications::Notification;
use crate::usecases::notifications;
use axum::Json;
use axum::extract::{Path, Query};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct FeedArgs {
    pub limit: Option<usize>,
}

/// `GET /api/v1/notifications` — bounded most-recent-first feed.
pub async fn feed(
    ctx: RequestContext,
    AuthedUser(user_id): AuthedUser,
    Query(args): Query<FeedArgs>,
) -> ServiceResponse<Vec<Notification>> {
    let feed = notifications::feed_for(&ctx, user_id, args.limit).await?;
    Ok(Json(feed))
}

pub async fn mark_read(
    ctx: RequestContext,
    Path(notification_id): Path<i64>,
) -> ServiceResponse<Notification> {
    let notification = notifications::mark_read(&ctx, notification_id).await?;
    Ok(Json(notification))
}
