use crate::common::state::AppState;
use crate::realtime::dispatcher::{Dispatcher, LocalDispatcher};
use crate::realtime::presence::PresenceRegistry;
use crate::settings::AppSettings;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL DEFAULT 'client',
    avatar TEXT
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sender_id INTEGER NOT NULL REFERENCES users (id),
    receiver_id INTEGER NOT NULL REFERENCES users (id),
    content TEXT NOT NULL DEFAULT '',
    attachment_name TEXT,
    attachment_original_name TEXT,
    attachment_path TEXT,
    attachment_kind TEXT,
    unread BOOLEAN NOT NULL DEFAULT TRUE,
    created_at DATETIME NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_messages_receiver_unread
    ON messages (receiver_id, unread);
CREATE INDEX IF NOT EXISTS idx_messages_pair
    ON messages (sender_id, receiver_id, id);

CREATE TABLE IF NOT EXISTS notifications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users (id),
    sender_id INTEGER NOT NULL REFERENCES users (id),
    message TEXT NOT NULL,
    sender_avatar TEXT,
    unread BOOLEAN NOT NULL DEFAULT TRUE,
    created_at DATETIME NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_notifications_user
    ON notifications (user_id, id);
"#;

pub fn initialize_logging(settings: &AppSettings) {
    tracing_subscriber::fmt()
        .with_max_level(settings.level)
        .with_timer(tracing_subscriber::fmt::time())
        .with_level(true)
        .compact()
        .init();
}

pub async fn initialize_state(settings: &AppSettings) -> anyhow::Result<AppState> {
    let db = initialize_db(settings).await?;
    let presence = Arc::new(PresenceRegistry::new());
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(LocalDispatcher::new(presence.clone()));
    Ok(AppState {
        db,
        presence,
        dispatcher,
    })
}

pub async fn initialize_db(settings: &AppSettings) -> anyhow::Result<Pool<Sqlite>> {
    let db = SqlitePoolOptions::new()
        .acquire_timeout(settings.db_wait_timeout)
        .max_connections(settings.db_max_connections as _)
        .connect(&settings.database_url)
        .await?;
    run_migrations(&db).await?;
    Ok(db)
}

pub async fn run_migrations(db: &Pool<Sqlite>) -> sqlx::Result<()> {
    sqlx::raw_sql(SCHEMA).execute(db).await?;
    Ok(())
}
