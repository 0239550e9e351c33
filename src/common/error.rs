use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

pub type ServiceResult<T> = Result<T, AppError>;
pub type ServiceResponse<T> = ServiceResult<Json<T>>;

#[track_caller]
pub fn unexpected<T, E: Into<anyhow::Error>>(e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!("An unexpected error has occurred at {caller}: {}", e.into());
    Err(AppError::Unexpected)
}

#[derive(Debug)]
pub enum AppError {
    Unexpected,
    Unauthorized,
    DecodingRequestFailed,

    MessagesMissingContent,
    MessagesMissingReceiver,
    MessagesNotFound,

    ConversationsInvalidPage,

    NotificationsNotFound,

    UsersNotFound,

    UploadsTooLarge,

    FilesInvalidName,
    FilesNotFound,
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    #[track_caller]
    fn from(e: E) -> Self {
        unexpected::<(), E>(e).unwrap_err()
    }
}

impl AppError {
    pub const fn as_str(&self) -> &str {
        self.code()
    }

    pub const fn code(&self) -> &'static str {
        match self {
            AppError::Unexpected => "unexpected",
            AppError::Unauthorized => "unauthorized",
            AppError::DecodingRequestFailed => "decoding_request_failed",

            AppError::MessagesMissingContent => "messages.missing_content",
            AppError::MessagesMissingReceiver => "messages.missing_receiver",
            AppError::MessagesNotFound => "messages.not_found",

            AppError::ConversationsInvalidPage => "conversations.invalid_page",

            AppError::NotificationsNotFound => "notifications.not_found",

            AppError::UsersNotFound => "users.not_found",

            AppError::UploadsTooLarge => "uploads.too_large",

            AppError::FilesInvalidName => "files.invalid_name",
            AppError::FilesNotFound => "files.not_found",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            AppError::Unexpected => "An unexpected error has occurred.",
            AppError::Unauthorized => "You are not authorized to perform this action.",
            AppError::DecodingRequestFailed => "Failed to decode request",

            AppError::MessagesMissingContent => {
                "A message must contain text or an attachment. It has not been sent."
            }
            AppError::MessagesMissingReceiver => "A receiver is required to send a message.",
            AppError::MessagesNotFound => "This message does not exist.",

            AppError::ConversationsInvalidPage => "Invalid page or page size.",

            AppError::NotificationsNotFound => "This notification does not exist.",

            AppError::UsersNotFound => "This user does not exist.",

            AppError::UploadsTooLarge => "The attachment exceeds the maximum allowed size.",

            AppError::FilesInvalidName => "Invalid file name.",
            AppError::FilesNotFound => "File not found.",
        }
    }

    pub const fn http_status_code(&self) -> StatusCode {
        match self {
            AppError::DecodingRequestFailed
            | AppError::MessagesMissingContent
            | AppError::MessagesMissingReceiver
            | AppError::ConversationsInvalidPage
            | AppError::FilesInvalidName => StatusCode::BAD_REQUEST,

            AppError::Unauthorized => StatusCode::UNAUTHORIZED,

            AppError::MessagesNotFound
            | AppError::NotificationsNotFound
            | AppError::UsersNotFound
            | AppError::FilesNotFound => StatusCode::NOT_FOUND,

            AppError::UploadsTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            AppError::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn response_parts(&self) -> (StatusCode, Json<ErrorResponse>) {
        let status = self.http_status_code();
        let response = ErrorResponse {
            code: self.code(),
            message: self.message(),
        };
        (status, Json(response))
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.response_parts().into_response()
    }
}
