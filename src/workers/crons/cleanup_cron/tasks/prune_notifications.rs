use crate::common::context::Context;
use crate::repositories::notifications;

/// The feed is a fixed-size most-recent window; everything older than the
/// newest `NOTIFICATION_RETENTION` per user is unreachable through the API
/// and gets dropped here.
pub const NOTIFICATION_RETENTION: usize = 50;

pub async fn prune_notifications<C: Context>(ctx: &C) -> anyhow::Result<u64> {
    let removed = notifications::prune(ctx, NOTIFICATION_RETENTION).await?;
    Ok(removed)
}
