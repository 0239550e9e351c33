pub mod prune_notifications;
