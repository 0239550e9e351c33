use serde::Serialize;

#[derive(Serialize)]
pub struct OnlineStatusResponse {
    pub user_id: i64,
    pub online: bool,
}

#[derive(Serialize)]
pub struct OnlineCountResponse {
    pub online: usize,
}
