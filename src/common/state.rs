use crate::common::context::Context;
use crate::realtime::dispatcher::Dispatcher;
use crate::realtime::presence::PresenceRegistry;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub presence: Arc<PresenceRegistry>,
    pub dispatcher: Arc<dyn Dispatcher>,
}

impl Context for AppState {
    fn db(&self) -> &Pool<Sqlite> {
        &self.db
    }

    fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
        &self.dispatcher
    }
}
