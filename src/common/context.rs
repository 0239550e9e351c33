use crate::realtime::dispatcher::Dispatcher;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;

pub trait Context: Sync + Send {
    fn db(&self) -> &Pool<Sqlite>;
    fn dispatcher(&self) -> &Arc<dyn Dispatcher>;
}
