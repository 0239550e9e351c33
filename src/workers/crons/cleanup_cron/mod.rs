pub mod tasks;

use crate::common::init;
use crate::cron_tasks;
use crate::settings::AppSettings;
use tasks::prune_notifications::prune_notifications;

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let ctx = init::initialize_state(settings).await?;
    cron_tasks! {
        &ctx,
        prune_notifications,
    }
    Ok(())
}
