use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode,
    users::{entities::RoleSet, requests::CreateUserRequest},
};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password_simple, validate_username};

use super::AuthService;

pub async fn handle_register(
    service: &AuthService,
    create_request: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    match register(&storage, create_request).await {
        Ok(response) | Err(response) => Ok(response),
    }
}

async fn register(
    storage: &Arc<dyn Storage>,
    mut create_request: CreateUserRequest,
) -> Result<HttpResponse, HttpResponse> {
    validate_request(&create_request)?;
    ensure_unique(storage, &create_request).await?;

    // 未指定角色时默认为学生
    if create_request.roles.is_empty() {
        create_request.roles = RoleSet::student();
    }

    create_request.password = hash_password(&create_request.password).map_err(|e| {
        register_failed(format!("密码哈希失败: {e}"))
    })?;

    let user = storage
        .create_user(create_request)
        .await
        .map_err(|e| register_failed(format!("注册失败: {e}")))?;

    tracing::info!("User {} registered with roles [{}]", user.username, user.roles);
    Ok(HttpResponse::Created().json(ApiResponse::success(user, "注册成功")))
}

fn validate_request(req: &CreateUserRequest) -> Result<(), HttpResponse> {
    let checks = [
        (validate_username(&req.username), ErrorCode::UserNameInvalid),
        (validate_email(&req.email), ErrorCode::UserEmailInvalid),
    ];
    for (result, code) in checks {
        if let Err(msg) = result {
            return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg)));
        }
    }

    validate_password_simple(&req.password).map_err(|msg| {
        HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg))
    })
}

async fn ensure_unique(
    storage: &Arc<dyn Storage>,
    req: &CreateUserRequest,
) -> Result<(), HttpResponse> {
    let by_name = storage
        .get_user_by_username(&req.username)
        .await
        .map_err(|e| register_failed(format!("Register failed: {e}")))?;
    if by_name.is_some() {
        return Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserNameAlreadyExists,
            "Username already exists",
        )));
    }

    let by_email = storage
        .get_user_by_email(&req.email)
        .await
        .map_err(|e| register_failed(format!("Register failed: {e}")))?;
    if by_email.is_some() {
        return Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserEmailAlreadyExists,
            "Email already exists",
        )));
    }

    Ok(())
}

fn register_failed(message: String) -> HttpResponse {
    HttpResponse::InternalServerError()
        .json(ApiResponse::error_empty(ErrorCode::RegisterFailed, message))
}
