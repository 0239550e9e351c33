use crate::api::{AuthedUser, RequestContext};
use crate::common::error::{AppError, ServiceResponse, ServiceResult};
use crate::common::state::AppState;
use crate::models::messages::{ConversationEntry, Message, MessageHistory};
use crate::models::presences::{OnlineCountResponse, OnlineStatusResponse};
use crate::repositories;
use crate::settings::AppSettings;
use crate::usecases::{messages, uploads};
use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use hashbrown::HashMap;
use serde::Deserialize;
use tracing::warn;

/// `POST /api/v1/chat/messages`
///
/// Multipart form: `receiver_id`, optional `content`, optional `file` (with
/// optional `file_kind`). Returns 201 once the message is durable; live
/// fan-out and notification derivation run in a detached task so a push
/// failure can never fail the send.
pub async fn send_message(
    ctx: RequestContext,
    AuthedUser(sender_id): AuthedUser,
    multipart: Multipart,
) -> ServiceResult<(StatusCode, Json<Message>)> {
    let settings = AppSettings::get();
    let form = SendMessageForm::read(multipart, settings.upload_max_bytes).await?;
    let receiver_id = form.receiver_id.ok_or(AppError::MessagesMissingReceiver)?;

    let attachment = match form.file {
        Some((original_name, data)) => Some(
            uploads::store_attachment(
                &settings.upload_dir,
                settings.upload_max_bytes,
                &original_name,
                form.file_kind,
                &data,
            )
            .await?,
        ),
        None => None,
    };

    let message = messages::send(
        &ctx,
        sender_id,
        receiver_id,
        form.content.as_deref().unwrap_or_default(),
        attachment,
    )
    .await?;

    let pushed = message.clone();
    tokio::spawn(async move {
        if let Err(e) = messages::fan_out(&ctx, &pushed).await {
            warn!(
                message_id = pushed.message_id,
                "Message fan-out failed: {}",
                e.as_str()
            );
        }
    });

    Ok((StatusCode::CREATED, Json(message)))
}

#[derive(Deserialize)]
pub struct HistoryArgs {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// `GET /api/v1/chat/messages/{peer_id}` — one chronological page of the
/// conversation between the caller and `peer_id`.
pub async fn history(
    ctx: RequestContext,
    AuthedUser(user_id): AuthedUser,
    Path(peer_id): Path<i64>,
    Query(args): Query<HistoryArgs>,
) -> ServiceResponse<MessageHistory> {
    let page = args.page.unwrap_or(1);
    let history = messages::history(&ctx, user_id, peer_id, page, args.page_size).await?;
    Ok(Json(history))
}

pub async fn conversations(
    ctx: RequestContext,
    AuthedUser(user_id): AuthedUser,
) -> ServiceResponse<Vec<ConversationEntry>> {
    let conversations = messages::conversations_for(&ctx, user_id).await?;
    Ok(Json(conversations))
}

pub async fn unread_counts(
    ctx: RequestContext,
    Path(user_id): Path<i64>,
) -> ServiceResponse<HashMap<i64, i64>> {
    let counts = messages::unread_counts(&ctx, user_id).await?;
    Ok(Json(counts))
}

pub async fn mark_read(
    ctx: RequestContext,
    Path(message_id): Path<i64>,
) -> ServiceResponse<Message> {
    let message = messages::mark_read(&ctx, message_id).await?;
    Ok(Json(message))
}

/// `GET /api/v1/chat/files/{stored_name}` — attachment download. The
/// Content-Disposition filename is the uploader's original name, never the
/// randomized on-disk one.
pub async fn download_attachment(
    ctx: RequestContext,
    Path(stored_name): Path<String>,
) -> ServiceResult<Response> {
    uploads::validate_stored_name(&stored_name)?;
    let message = repositories::messages::fetch_by_attachment_name(&ctx, &stored_name)
        .await?
        .ok_or(AppError::FilesNotFound)?;
    let original_name = message
        .attachment_original_name
        .unwrap_or_else(|| stored_name.clone());

    let settings = AppSettings::get();
    let data = uploads::read_attachment(&settings.upload_dir, &stored_name).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        original_name.replace(['"', '\r', '\n'], "_")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

pub async fn online_status(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Json<OnlineStatusResponse> {
    Json(OnlineStatusResponse {
        user_id,
        online: state.presence.is_online(user_id),
    })
}

pub async fn online_count(State(state): State<AppState>) -> Json<OnlineCountResponse> {
    Json(OnlineCountResponse {
        online: state.presence.online_count(),
    })
}

struct SendMessageForm {
    receiver_id: Option<i64>,
    content: Option<String>,
    file: Option<(String, Vec<u8>)>,
    file_kind: Option<String>,
}

impl SendMessageForm {
    async fn read(mut multipart: Multipart, max_file_bytes: usize) -> ServiceResult<Self> {
        let mut form = Self {
            receiver_id: None,
            content: None,
            file: None,
            file_kind: None,
        };
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| AppError::DecodingRequestFailed)?
        {
            match field.name() {
                Some("receiver_id") => {
                    let value = field
                        .text()
                        .await
                        .map_err(|_| AppError::DecodingRequestFailed)?;
                    form.receiver_id =
                        Some(value.parse().map_err(|_| AppError::MessagesMissingReceiver)?);
                }
                Some("content") => {
                    form.content = Some(
                        field
                            .text()
                            .await
                            .map_err(|_| AppError::DecodingRequestFailed)?,
                    );
                }
                Some("file_kind") => {
                    form.file_kind = Some(
                        field
                            .text()
                            .await
                            .map_err(|_| AppError::DecodingRequestFailed)?,
                    );
                }
                Some("file") => {
                    let original_name = field.file_name().unwrap_or("attachment").to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|_| AppError::UploadsTooLarge)?;
                    if data.len() > max_file_bytes {
                        return Err(AppError::UploadsTooLarge);
                    }
                    form.file = Some((original_name, data.to_vec()));
                }
                _ => {}
            }
        }
        Ok(form)
    }
}
