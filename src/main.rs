use clientdesk_chat::api;
use clientdesk_chat::common::init;
use clientdesk_chat::settings::AppSettings;
use clientdesk_chat::workers::crons;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppSettings::get();
    init::initialize_logging(settings);
    match settings.app_component.as_str() {
        "api" => api::serve(settings).await,
        "cleanup-cron" => crons::cleanup_cron::serve(settings).await,
        _ => panic!("Unknown app component"),
    }
}
