use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use crate::models::auth::requests::RegisterRequest;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::NewUser;
use crate::models::users::responses::UserResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::system::DynamicConfig;
use crate::services::{bad_request, storage_error};
use crate::utils::password::hash_password;
use crate::utils::validate::{
    validate_email, validate_full_name, validate_password_simple, validate_username,
};

use super::AuthService;

/// 校验并组装新账号，注册与管理员建号共用
pub(crate) fn build_new_user(
    username: &str,
    email: &str,
    password: &str,
    full_name: &str,
    role: UserRole,
) -> Result<NewUser, HttpResponse> {
    let username = username.trim();
    validate_username(username).map_err(|msg| bad_request(ErrorCode::UserNameInvalid, msg))?;

    let email = email.trim().to_lowercase();
    validate_email(&email).map_err(|msg| bad_request(ErrorCode::UserEmailInvalid, msg))?;

    validate_password_simple(password)
        .map_err(|msg| bad_request(ErrorCode::UserPasswordInvalid, msg))?;

    let full_name =
        validate_full_name(full_name).map_err(|msg| bad_request(ErrorCode::ValidationFailed, msg))?;

    let password_hash = hash_password(password).map_err(|e| {
        HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            format!("Password hashing failed: {e}"),
        ))
    })?;

    Ok(NewUser {
        username: username.to_string(),
        email,
        password_hash,
        full_name,
        role,
    })
}

/// 唯一约束冲突统一返回 409
pub(crate) fn user_create_error(err: crate::errors::LearnHubError) -> HttpResponse {
    if err.is_conflict() {
        HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserAlreadyExists,
            "Username or email already exists",
        ))
    } else {
        storage_error(err, "Failed to create user")
    }
}

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if !DynamicConfig::allow_registration().await {
        warn!("Registration attempt while registration is closed");
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::RegistrationClosed,
            "Registration is currently closed",
        )));
    }

    let new_user = match build_new_user(
        &register_request.username,
        &register_request.email,
        &register_request.password,
        &register_request.full_name,
        UserRole::User,
    ) {
        Ok(new_user) => new_user,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);
    match storage.create_user(new_user).await {
        Ok(user) => {
            info!("New student registered: {}", user.username);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                UserResponse { user },
                "Registration successful",
            )))
        }
        Err(e) => Ok(user_create_error(e)),
    }
}
