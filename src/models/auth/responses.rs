use crate::models::users::entities::User;
use serde::Serialize;

// 登录响应：令牌 + 身份摘要
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub user_id: i64,
    pub username: String,
    pub is_teacher: bool,
    pub user: User,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub user: User,
}
