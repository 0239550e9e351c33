use crate::entities::users::User as UserEntity;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct UserDisplay {
    pub user_id: i64,
    pub username: String,
    pub avatar: Option<String>,
}

impl From<UserEntity> for UserDisplay {
    fn from(value: UserEntity) -> Self {
        Self {
            user_id: value.id,
            username: value.username,
            avatar: value.avatar,
        }
    }
}
