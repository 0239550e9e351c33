use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::users::UserDisplay;
use crate::repositories::users;

/// Resolves a user id to its display fields (username, avatar). The user
/// directory itself is owned by the surrounding application; this core only
/// reads it.
pub async fn fetch_one<C: Context>(ctx: &C, user_id: i64) -> ServiceResult<UserDisplay> {
    match users::fetch_one(ctx, user_id).await {
        Ok(user) => Ok(UserDisplay::from(user)),
        Err(sqlx::Error::RowNotFound) => Err(AppError::UsersNotFound),
        Err(e) => unexpected(e),
    }
}
