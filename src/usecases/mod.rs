pub mod messages;
pub mod notifications;
pub mod uploads;
pub mod users;
