use clientdesk_chat::common::error::AppError;
use clientdesk_chat::common::init;
use clientdesk_chat::common::state::AppState;
use clientdesk_chat::entities::messages::NewAttachment;
use clientdesk_chat::models::events::Event;
use clientdesk_chat::realtime::dispatcher::{Dispatcher, LocalDispatcher};
use clientdesk_chat::realtime::presence::PresenceRegistry;
use clientdesk_chat::usecases::{messages, notifications};
use clientdesk_chat::workers::crons::cleanup_cron::tasks::prune_notifications::{
    NOTIFICATION_RETENTION, prune_notifications,
};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tokio::sync::mpsc;

const ALICE: i64 = 1;
const BOB: i64 = 2;
const CARA: i64 = 3;

async fn test_state() -> AppState {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    init::run_migrations(&db).await.expect("migrations failed");
    sqlx::query(
        "INSERT INTO users (id, username, role, avatar) VALUES \
         (1, 'alice', 'manager', 'avatars/alice.png'), \
         (2, 'bob', 'client', NULL), \
         (3, 'cara', 'client', NULL)",
    )
    .execute(&db)
    .await
    .expect("user seed failed");

    let presence = Arc::new(PresenceRegistry::new());
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(LocalDispatcher::new(presence.clone()));
    AppState {
        db,
        presence,
        dispatcher,
    }
}

async fn message_count(state: &AppState) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM messages")
        .fetch_one(&state.db)
        .await
        .unwrap()
}

#[tokio::test]
async fn send_then_history_includes_message_last() {
    let state = test_state().await;
    messages::send(&state, ALICE, BOB, "first", None).await.unwrap();
    let sent = messages::send(&state, ALICE, BOB, "second", None).await.unwrap();

    let history = messages::history(&state, ALICE, BOB, 1, None).await.unwrap();
    assert_eq!(history.total_count, 2);
    let last = history.messages.last().unwrap();
    assert_eq!(last.message_id, sent.message_id);
    assert_eq!(last.content, "second");
    assert_eq!(last.sender_name, "alice");
    assert!(last.unread);
}

#[tokio::test]
async fn empty_send_fails_and_persists_nothing() {
    let state = test_state().await;
    let result = messages::send(&state, ALICE, BOB, "   ", None).await;
    assert!(matches!(result, Err(AppError::MessagesMissingContent)));
    assert_eq!(message_count(&state).await, 0);
}

#[tokio::test]
async fn send_to_unknown_receiver_fails_and_persists_nothing() {
    let state = test_state().await;
    let result = messages::send(&state, ALICE, 999, "hello?", None).await;
    assert!(matches!(result, Err(AppError::UsersNotFound)));
    assert_eq!(message_count(&state).await, 0);
}

#[tokio::test]
async fn attachment_only_message_is_valid() {
    let state = test_state().await;
    let attachment = NewAttachment {
        stored_name: "3e1b0c.pdf".to_string(),
        original_name: "contract.pdf".to_string(),
        path: "uploads/3e1b0c.pdf".to_string(),
        kind: Some("document".to_string()),
    };
    let message = messages::send(&state, ALICE, BOB, "", Some(attachment)).await.unwrap();

    assert_eq!(message.content, "");
    let attachment = message.attachment.expect("attachment missing");
    assert_eq!(attachment.original_name, "contract.pdf");
    assert_eq!(attachment.stored_name, "3e1b0c.pdf");
    assert_eq!(attachment.kind.as_deref(), Some("document"));
}

#[tokio::test]
async fn mark_read_is_idempotent() {
    let state = test_state().await;
    let sent = messages::send(&state, ALICE, BOB, "read me", None).await.unwrap();
    assert!(sent.unread);

    let first = messages::mark_read(&state, sent.message_id).await.unwrap();
    assert!(!first.unread);
    let second = messages::mark_read(&state, sent.message_id).await.unwrap();
    assert!(!second.unread);
}

#[tokio::test]
async fn mark_read_unknown_message_is_not_found() {
    let state = test_state().await;
    let result = messages::mark_read(&state, 4242).await;
    assert!(matches!(result, Err(AppError::MessagesNotFound)));
}

#[tokio::test]
async fn unread_counts_follow_read_receipts() {
    let state = test_state().await;
    let mut ids = Vec::new();
    for i in 0..3 {
        let sent = messages::send(&state, BOB, ALICE, &format!("ping {i}"), None)
            .await
            .unwrap();
        ids.push(sent.message_id);
    }
    messages::send(&state, CARA, ALICE, "hi", None).await.unwrap();

    let counts = messages::unread_counts(&state, ALICE).await.unwrap();
    assert_eq!(counts.get(&BOB), Some(&3));
    assert_eq!(counts.get(&CARA), Some(&1));

    for id in ids {
        messages::mark_read(&state, id).await.unwrap();
    }
    let counts = messages::unread_counts(&state, ALICE).await.unwrap();
    assert_eq!(counts.get(&BOB), None);
    assert_eq!(counts.get(&CARA), Some(&1));
}

#[tokio::test]
async fn history_is_symmetric_in_participants() {
    let state = test_state().await;
    messages::send(&state, ALICE, BOB, "from alice", None).await.unwrap();
    messages::send(&state, BOB, ALICE, "from bob", None).await.unwrap();
    messages::send(&state, ALICE, CARA, "other conversation", None).await.unwrap();

    let ab = messages::history(&state, ALICE, BOB, 1, None).await.unwrap();
    let ba = messages::history(&state, BOB, ALICE, 1, None).await.unwrap();

    let ab_ids: Vec<i64> = ab.messages.iter().map(|m| m.message_id).collect();
    let ba_ids: Vec<i64> = ba.messages.iter().map(|m| m.message_id).collect();
    assert_eq!(ab_ids, ba_ids);
    assert_eq!(ab.total_count, 2);
}

#[tokio::test]
async fn pagination_covers_all_messages_without_duplicates() {
    let state = test_state().await;
    for i in 0..45 {
        messages::send(&state, ALICE, BOB, &format!("message {i}"), None)
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    let mut lengths = Vec::new();
    for page in 1..=3 {
        let history = messages::history(&state, ALICE, BOB, page, Some(20)).await.unwrap();
        assert_eq!(history.page, page);
        assert_eq!(history.total_pages, 3);
        assert_eq!(history.total_count, 45);
        // Each page is internally chronological.
        for pair in history.messages.windows(2) {
            assert!(pair[0].message_id < pair[1].message_id);
        }
        lengths.push(history.messages.len());
        seen.extend(history.messages.iter().map(|m| m.message_id));
    }

    assert_eq!(lengths, vec![20, 20, 5]);
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 45);
}

#[tokio::test]
async fn invalid_page_values_are_rejected() {
    let state = test_state().await;
    assert!(matches!(
        messages::history(&state, ALICE, BOB, 0, None).await,
        Err(AppError::ConversationsInvalidPage)
    ));
    assert!(matches!(
        messages::history(&state, ALICE, BOB, 1, Some(0)).await,
        Err(AppError::ConversationsInvalidPage)
    ));
    assert!(matches!(
        messages::history(&state, ALICE, BOB, 1, Some(10_000)).await,
        Err(AppError::ConversationsInvalidPage)
    ));
}

#[tokio::test]
async fn conversations_carry_only_the_latest_message_per_peer() {
    let state = test_state().await;
    messages::send(&state, ALICE, BOB, "old", None).await.unwrap();
    messages::send(&state, BOB, ALICE, "newer", None).await.unwrap();
    messages::send(&state, CARA, ALICE, "from cara", None).await.unwrap();

    let conversations = messages::conversations_for(&state, ALICE).await.unwrap();
    assert_eq!(conversations.len(), 2);
    // Newest conversation first.
    assert_eq!(conversations[0].peer.username, "cara");
    assert_eq!(conversations[0].last_message.content, "from cara");
    assert_eq!(conversations[1].peer.username, "bob");
    assert_eq!(conversations[1].last_message.content, "newer");
}

#[tokio::test]
async fn online_receiver_gets_message_and_notification_pushed() {
    let state = test_state().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.presence.register(BOB, tx);

    let sent = messages::send(&state, ALICE, BOB, "Hello", None).await.unwrap();
    messages::fan_out(&state, &sent).await.unwrap();

    match rx.try_recv().unwrap() {
        Event::NewMessage(message) => {
            assert_eq!(message.message_id, sent.message_id);
            assert_eq!(message.content, "Hello");
            assert!(message.attachment.is_none());
            assert!(message.unread);
        }
        other => panic!("expected newMessage first, got {other:?}"),
    }
    match rx.try_recv().unwrap() {
        Event::NewNotification(notification) => {
            assert_eq!(notification.user_id, BOB);
            assert_eq!(notification.sender_id, ALICE);
            assert_eq!(notification.message, "New message from alice");
            assert_eq!(notification.sender_avatar.as_deref(), Some("avatars/alice.png"));
        }
        other => panic!("expected newNotification second, got {other:?}"),
    }
}

#[tokio::test]
async fn sender_channels_receive_their_own_message() {
    let state = test_state().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.presence.register(ALICE, tx);

    let sent = messages::send(&state, ALICE, BOB, "echo", None).await.unwrap();
    messages::fan_out(&state, &sent).await.unwrap();

    assert!(matches!(rx.try_recv().unwrap(), Event::NewMessage(_)));
}

#[tokio::test]
async fn offline_receiver_catches_up_through_pull() {
    let state = test_state().await;

    let sent = messages::send(&state, ALICE, BOB, "Hello", None).await.unwrap();
    // No channels registered: fan-out is a silent no-op on the push side.
    messages::fan_out(&state, &sent).await.unwrap();

    let history = messages::history(&state, BOB, ALICE, 1, None).await.unwrap();
    assert_eq!(history.messages.len(), 1);
    assert_eq!(history.messages[0].content, "Hello");

    let feed = notifications::feed_for(&state, BOB, None).await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].sender_name, "alice");
    assert!(feed[0].unread);
}

#[tokio::test]
async fn notification_feed_is_bounded_and_newest_first() {
    let state = test_state().await;
    for _ in 0..15 {
        notifications::notify(&state, BOB, ALICE).await.unwrap();
    }

    let feed = notifications::feed_for(&state, BOB, None).await.unwrap();
    assert_eq!(feed.len(), 10);
    for pair in feed.windows(2) {
        assert!(pair[0].notification_id > pair[1].notification_id);
    }

    // An oversized limit is clamped, not honored.
    let capped = notifications::feed_for(&state, BOB, Some(10_000)).await.unwrap();
    assert_eq!(capped.len(), 15);
}

#[tokio::test]
async fn notification_mark_read_is_idempotent() {
    let state = test_state().await;
    let notification = notifications::notify(&state, BOB, ALICE).await.unwrap();
    assert!(notification.unread);

    let first = notifications::mark_read(&state, notification.notification_id).await.unwrap();
    assert!(!first.unread);
    let second = notifications::mark_read(&state, notification.notification_id).await.unwrap();
    assert!(!second.unread);

    assert!(matches!(
        notifications::mark_read(&state, 4242).await,
        Err(AppError::NotificationsNotFound)
    ));
}

#[tokio::test]
async fn prune_keeps_the_newest_notifications_per_user() {
    let state = test_state().await;
    for _ in 0..NOTIFICATION_RETENTION + 10 {
        notifications::notify(&state, BOB, ALICE).await.unwrap();
    }
    notifications::notify(&state, CARA, ALICE).await.unwrap();

    let removed = prune_notifications(&state).await.unwrap();
    assert_eq!(removed, 10);

    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ?")
            .bind(BOB)
            .fetch_one(&state.db)
            .await
            .unwrap();
    assert_eq!(remaining as usize, NOTIFICATION_RETENTION);

    // The survivors are the newest ones, and other users are untouched.
    let feed = notifications::feed_for(&state, BOB, Some(1)).await.unwrap();
    let newest: i64 = sqlx::query_scalar("SELECT MAX(id) FROM notifications WHERE user_id = ?")
        .bind(BOB)
        .fetch_one(&state.db)
        .await
        .unwrap();
    assert_eq!(feed[0].notification_id, newest);
    let cara_feed = notifications::feed_for(&state, CARA, None).await.unwrap();
    assert_eq!(cara_feed.len(), 1);
}
