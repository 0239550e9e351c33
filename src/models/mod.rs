pub mod events;
pub mod messages;
pub mod notifications;
pub mod presences;
pub mod users;
