use crate::common::context::Context;
use crate::common::error::AppError;
use crate::common::init;
use crate::common::state::AppState;
use crate::realtime::dispatcher::Dispatcher;
use crate::settings::AppSettings;
use axum::Router;
use axum::extract::{DefaultBodyLimit, FromRequestParts};
use axum::http::request::Parts;
use axum::routing::{get, post, put};
use sqlx::{Pool, Sqlite};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub mod chat;
pub mod notifications;
pub mod ws;

/// Room multipart encoding leaves on top of the raw attachment ceiling.
const BODY_LIMIT_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct RequestContext {
    pub db: Pool<Sqlite>,
    pub dispatcher: Arc<dyn Dispatcher>,
}

/// Caller identity, resolved by the upstream auth gateway and forwarded as
/// the `X-User-Id` header. Authentication itself lives outside this core.
pub struct AuthedUser(pub i64);

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/v1", v1_router())
}

fn v1_router() -> Router<AppState> {
    Router::new()
        .route("/chat/messages", post(chat::send_message))
        .route("/chat/messages/{peer_id}", get(chat::history))
        .route("/chat/messages/{message_id}/read", put(chat::mark_read))
        .route("/chat/conversations", get(chat::conversations))
        .route("/chat/unread-counts/{user_id}", get(chat::unread_counts))
        .route("/chat/files/{stored_name}", get(chat::download_attachment))
        .route("/chat/online", get(chat::online_count))
        .route("/chat/online/{user_id}", get(chat::online_status))
        .route("/notifications", get(notifications::feed))
        .route(
            "/notifications/{notification_id}/read",
            put(notifications::mark_read),
        )
        .route("/ws", get(ws::controller))
}

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let state = init::initialize_state(settings).await?;
    let app = router()
        .layer(DefaultBodyLimit::max(
            settings.upload_max_bytes + BODY_LIMIT_OVERHEAD,
        ))
        .with_state(state);

    let addr = SocketAddr::new(settings.app_host, settings.app_port);
    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self {
            db: state.db.clone(),
            dispatcher: state.dispatcher.clone(),
        })
    }
}

impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i64>().ok())
            .ok_or(AppError::Unauthorized)?;
        Ok(Self(user_id))
    }
}

impl Context for RequestContext {
    fn db(&self) -> &Pool<Sqlite> {
        &self.db
    }

    fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
        &self.dispatcher
    }
}
