use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use crate::middlewares::RequireJWT;
use crate::models::auth::requests::UpdateProfileRequest;
use crate::models::users::requests::UserUpdate;
use crate::models::users::responses::UserResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{bad_request, current_user, not_found, storage_error};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validate::{validate_full_name, validate_password_simple};

use super::AuthService;

pub async fn handle_update_profile(
    service: &AuthService,
    update_data: UpdateProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let current = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let full_name = match update_data.full_name.as_deref().map(validate_full_name) {
        Some(Ok(name)) => Some(name),
        Some(Err(msg)) => return Ok(bad_request(ErrorCode::ValidationFailed, msg)),
        None => None,
    };

    // 空字符串表示清除头像
    let avatar_url = update_data
        .avatar_url
        .map(|url| Some(url.trim().to_string()).filter(|u| !u.is_empty()));

    // 修改密码必须校验当前密码；缓存中的用户不含哈希，需重新加载
    let password_hash = match update_data.new_password {
        Some(new_password) => {
            let Some(current_password) = update_data.current_password else {
                return Ok(bad_request(
                    ErrorCode::UserPasswordInvalid,
                    "Current password is required to set a new password",
                ));
            };
            let stored = match storage.get_user_by_id(current.id).await {
                Ok(Some(user)) => user,
                Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "User not found")),
                Err(e) => return Ok(storage_error(e, "Failed to load user")),
            };
            if !verify_password(&current_password, &stored.password_hash) {
                return Ok(bad_request(
                    ErrorCode::AuthFailed,
                    "Current password is incorrect",
                ));
            }
            if let Err(msg) = validate_password_simple(&new_password) {
                return Ok(bad_request(ErrorCode::UserPasswordInvalid, msg));
            }
            match hash_password(&new_password) {
                Ok(hash) => Some(hash),
                Err(e) => return Ok(storage_error(e, "Password hashing failed")),
            }
        }
        None => None,
    };
    let password_changed = password_hash.is_some();

    // 普通用户不能修改角色与状态
    let update = UserUpdate {
        full_name,
        avatar_url,
        password_hash,
        ..Default::default()
    };

    match storage.update_user(current.id, update).await {
        Ok(Some(user)) => {
            // 缓存中的旧资料一并失效
            RequireJWT::evict_user(&service.get_cache(request), user.id).await;
            if password_changed {
                info!("User {} changed their password", user.username);
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserResponse { user },
                "Profile updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(storage_error(e, "Failed to update profile")),
    }
}
