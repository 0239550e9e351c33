use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::messages::NewAttachment;
use crate::models::events::Event;
use crate::models::messages::{ConversationEntry, Message, MessageHistory};
use crate::repositories::messages;
use crate::usecases::{notifications, users};
use hashbrown::HashMap;

pub const PAGE_SIZE_DEFAULT: usize = 20;
pub const PAGE_SIZE_MAX: usize = 100;

/// Persists one message. Exactly the durable half of a send: fan-out to
/// live channels and notification derivation happen in [`fan_out`], off the
/// request path, so a persisted message is always reported as sent even if
/// no push goes out.
pub async fn send<C: Context>(
    ctx: &C,
    sender_id: i64,
    receiver_id: i64,
    content: &str,
    attachment: Option<NewAttachment>,
) -> ServiceResult<Message> {
    let content = content.trim();
    if content.is_empty() && attachment.is_none() {
        return Err(AppError::MessagesMissingContent);
    }
    users::fetch_one(ctx, receiver_id).await?;

    let entity = messages::create(ctx, sender_id, receiver_id, content, attachment.as_ref())
        .await?;
    Ok(Message::from(entity))
}

/// Pushes a persisted message to both participants and derives the
/// receiver's notification. Best-effort: callers run this in a spawned task
/// and only log failures. A crash between the message write and the
/// notification write leaves a message without a notification; pull
/// retrieval still reflects the durable truth.
pub async fn fan_out<C: Context>(ctx: &C, message: &Message) -> ServiceResult<()> {
    let dispatcher = ctx.dispatcher();
    dispatcher
        .publish(message.receiver_id, Event::NewMessage(message.clone()))
        .await;
    dispatcher
        .publish(message.sender_id, Event::NewMessage(message.clone()))
        .await;
    notifications::notify(ctx, message.receiver_id, message.sender_id).await?;
    Ok(())
}

/// One page of the conversation between `user_a` and `user_b`, in
/// chronological order. The conversation key is the unordered pair, so
/// swapping the two users returns the identical message set.
pub async fn history<C: Context>(
    ctx: &C,
    user_a: i64,
    user_b: i64,
    page: usize,
    page_size: Option<usize>,
) -> ServiceResult<MessageHistory> {
    let page_size = page_size.unwrap_or(PAGE_SIZE_DEFAULT);
    if page == 0 || page_size == 0 || page_size > PAGE_SIZE_MAX {
        return Err(AppError::ConversationsInvalidPage);
    }

    let total_count = messages::count_conversation(ctx, user_a, user_b).await? as usize;
    let offset = (page - 1) * page_size;
    let mut page_messages = messages::fetch_page(ctx, user_a, user_b, page_size, offset).await?;
    // Fetched newest-first for stable pagination; delivered oldest-first.
    page_messages.reverse();

    Ok(MessageHistory {
        messages: page_messages.into_iter().map(Message::from).collect(),
        page,
        total_pages: MessageHistory::total_pages(total_count, page_size),
        total_count,
    })
}

/// Idempotent read receipt.
pub async fn mark_read<C: Context>(ctx: &C, message_id: i64) -> ServiceResult<Message> {
    messages::mark_read(ctx, message_id).await?;
    match messages::fetch_one(ctx, message_id).await {
        Ok(entity) => Ok(Message::from(entity)),
        Err(sqlx::Error::RowNotFound) => Err(AppError::MessagesNotFound),
        Err(e) => unexpected(e),
    }
}

/// One entry per distinct peer the user has exchanged messages with, each
/// carrying only the most recent message, newest conversation first.
pub async fn conversations_for<C: Context>(
    ctx: &C,
    user_id: i64,
) -> ServiceResult<Vec<ConversationEntry>> {
    let latest = messages::fetch_latest_per_peer(ctx, user_id).await?;
    let mut entries = Vec::with_capacity(latest.len());
    for entity in latest {
        let peer_id = if entity.sender_id == user_id {
            entity.receiver_id
        } else {
            entity.sender_id
        };
        let peer = users::fetch_one(ctx, peer_id).await?;
        entries.push(ConversationEntry {
            peer,
            last_message: Message::from(entity),
        });
    }
    Ok(entries)
}

/// Per-sender unread counts for a recipient. Pull-based and recomputed on
/// every call; the server never pushes incremental count deltas.
pub async fn unread_counts<C: Context>(
    ctx: &C,
    receiver_id: i64,
) -> ServiceResult<HashMap<i64, i64>> {
    match messages::unread_counts(ctx, receiver_id).await {
        Ok(counts) => Ok(counts.into_iter().collect()),
        Err(e) => unexpected(e),
    }
}
