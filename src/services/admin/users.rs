use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::AdminService;
use crate::middlewares::RequireJWT;
use crate::models::common::pagination::ADMIN_PAGE_SIZE;
use crate::models::users::entities::{User, UserRole, UserStatus};
use crate::models::users::requests::{
    BulkLockRequest, CreateUserRequest, UpdateUserRequest, UserExportParams, UserListParams,
    UserListQuery, UserUpdate,
};
use crate::models::users::responses::{UserDetailResponse, UserResponse};
use crate::models::{ApiResponse, BulkOperationResponse, ErrorCode};
use crate::services::auth::register::{build_new_user, user_create_error};
use crate::services::export::{self, Sheet};
use crate::services::{bad_request, conflict, current_user, not_found, storage_error};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_full_name, validate_password_simple};

pub async fn list_users(
    service: &AdminService,
    role: UserRole,
    params: UserListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let (page, size) = params.pagination.normalized(ADMIN_PAGE_SIZE);
    let storage = service.get_storage(request);

    let query = UserListQuery {
        page,
        size,
        role: Some(role),
        status: params.status,
        search: params.search,
    };
    match storage.list_users_with_pagination(query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询用户列表失败")),
    }
}

pub async fn get_user(
    service: &AdminService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match storage.get_user_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => return Ok(storage_error(e, "查询用户失败")),
    };
    match storage.get_user_activity_counts(id).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserDetailResponse { user, stats },
            "查询成功",
        ))),
        Err(e) => Ok(storage_error(e, "统计用户数据失败")),
    }
}

pub async fn create_user(
    service: &AdminService,
    body: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let new_user = match build_new_user(
        &body.username,
        &body.email,
        &body.password,
        &body.full_name,
        body.role,
    ) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.create_user(new_user).await {
        Ok(user) => {
            info!("Admin created {} account {}", user.role, user.username);
            Ok(HttpResponse::Created().json(ApiResponse::success(UserResponse { user }, "User created")))
        }
        Err(e) => Ok(user_create_error(e)),
    }
}

/// 校验管理员提交的修改；管理员不能降级或锁定自己
fn build_update(
    admin: &User,
    id: i64,
    body: UpdateUserRequest,
) -> Result<UserUpdate, HttpResponse> {
    if id == admin.id {
        if body.role.is_some_and(|r| r != UserRole::Admin) {
            return Err(bad_request(ErrorCode::BadRequest, "You cannot change your own role"));
        }
        if body.status == Some(UserStatus::Locked) {
            return Err(bad_request(ErrorCode::BadRequest, "You cannot lock your own account"));
        }
    }

    let email = match body.email {
        Some(email) => {
            let email = email.trim().to_lowercase();
            validate_email(&email).map_err(|msg| bad_request(ErrorCode::UserEmailInvalid, msg))?;
            Some(email)
        }
        None => None,
    };
    let full_name = body
        .full_name
        .as_deref()
        .map(validate_full_name)
        .transpose()
        .map_err(|msg| bad_request(ErrorCode::ValidationFailed, msg))?;
    let password_hash = match body.password {
        Some(password) => {
            validate_password_simple(&password)
                .map_err(|msg| bad_request(ErrorCode::UserPasswordInvalid, msg))?;
            let hash = hash_password(&password).map_err(|e| {
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Password hashing failed: {e}"),
                ))
            })?;
            Some(hash)
        }
        None => None,
    };

    Ok(UserUpdate {
        email,
        full_name,
        role: body.role,
        status: body.status,
        password_hash,
        ..Default::default()
    })
}

pub async fn update_user(
    service: &AdminService,
    id: i64,
    body: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let admin = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let update = match build_update(&admin, id, body) {
        Ok(update) => update,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.update_user(id, update).await {
        Ok(Some(user)) => {
            RequireJWT::evict_user(&service.get_cache(request), user.id).await;
            info!("Admin {} updated user {}", admin.id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse { user }, "User updated")))
        }
        Ok(None) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) if e.is_conflict() => Ok(conflict(
            ErrorCode::UserAlreadyExists,
            "Email already in use",
        )),
        Err(e) => Ok(storage_error(e, "更新用户失败")),
    }
}

/// 有选课记录的学生、名下有课程的教师不可删除
pub async fn delete_user(
    service: &AdminService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let admin = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if id == admin.id {
        return Ok(bad_request(
            ErrorCode::CanNotDeleteCurrentUser,
            "Cannot delete current user",
        ));
    }
    let storage = service.get_storage(request);

    let user = match storage.get_user_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => return Ok(storage_error(e, "查询用户失败")),
    };
    let counts = match storage.get_user_activity_counts(id).await {
        Ok(counts) => counts,
        Err(e) => return Ok(storage_error(e, "统计用户数据失败")),
    };
    if user.role == UserRole::User && counts.enrollment_count > 0 {
        warn!("Refused to delete student {} with enrollments", id);
        return Ok(conflict(
            ErrorCode::UserHasDependents,
            "Student has enrollments and cannot be deleted",
        ));
    }
    if user.role.can_teach() && counts.course_count > 0 {
        warn!("Refused to delete teacher {} owning courses", id);
        return Ok(conflict(
            ErrorCode::UserHasDependents,
            "Teacher owns courses and cannot be deleted",
        ));
    }

    match storage.delete_user(id).await {
        Ok(true) => {
            RequireJWT::evict_user(&service.get_cache(request), id).await;
            info!("Admin {} deleted user {}", admin.id, id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("User deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(storage_error(e, "删除用户失败")),
    }
}

/// active <-> locked，锁定后立即失效其会话
pub async fn toggle_lock(
    service: &AdminService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let admin = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if id == admin.id {
        return Ok(bad_request(ErrorCode::BadRequest, "You cannot lock your own account"));
    }
    let storage = service.get_storage(request);

    let user = match storage.get_user_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => return Ok(storage_error(e, "查询用户失败")),
    };
    let update = UserUpdate {
        status: Some(user.status.toggled()),
        ..Default::default()
    };

    match storage.update_user(id, update).await {
        Ok(Some(user)) => {
            RequireJWT::evict_user(&service.get_cache(request), id).await;
            info!("Admin {} set user {} to {}", admin.id, id, user.status);
            Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse { user }, "User status updated")))
        }
        Ok(None) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(storage_error(e, "更新用户状态失败")),
    }
}

/// 学生升级为教师
pub async fn promote(
    service: &AdminService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_user_by_id(id).await {
        Ok(Some(user)) if user.role == UserRole::User => {}
        Ok(Some(user)) => {
            return Ok(conflict(
                ErrorCode::InvalidStateTransition,
                format!("User is already a {}", user.role),
            ));
        }
        Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => return Ok(storage_error(e, "查询用户失败")),
    }

    let update = UserUpdate {
        role: Some(UserRole::Teacher),
        ..Default::default()
    };
    match storage.update_user(id, update).await {
        Ok(Some(user)) => {
            RequireJWT::evict_user(&service.get_cache(request), id).await;
            info!("User {} promoted to teacher", id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse { user }, "User promoted to teacher")))
        }
        Ok(None) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(storage_error(e, "更新用户角色失败")),
    }
}

/// 批量锁定 / 解锁，跳过当前管理员
pub async fn bulk_lock(
    service: &AdminService,
    body: BulkLockRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let admin = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let status = if body.lock {
        UserStatus::Locked
    } else {
        UserStatus::Active
    };
    let storage = service.get_storage(request);

    let affected = match storage.set_users_status(&body.ids, status, admin.id).await {
        Ok(affected) => affected,
        Err(e) => return Ok(storage_error(e, "批量更新用户状态失败")),
    };

    let cache = service.get_cache(request);
    for id in body.ids.iter().filter(|id| **id != admin.id) {
        RequireJWT::evict_user(&cache, *id).await;
    }

    let skipped = body.ids.into_iter().filter(|id| *id == admin.id).collect();
    info!("Admin {} set {} users to {}", admin.id, affected, status);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        BulkOperationResponse { affected, skipped },
        "Users updated",
    )))
}

fn user_sheet(users: &[User]) -> Sheet {
    let mut sheet = Sheet::new(
        "Users",
        &[
            "ID",
            "Username",
            "Email",
            "Full name",
            "Role",
            "Status",
            "Registered at",
            "Last login",
        ],
    );
    for user in users {
        sheet.push(vec![
            user.id.into(),
            user.username.as_str().into(),
            user.email.as_str().into(),
            user.full_name.as_str().into(),
            user.role.as_str().into(),
            user.status.as_str().into(),
            user.created_at.format("%Y-%m-%d %H:%M:%S").to_string().into(),
            user.last_login
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default()
                .into(),
        ]);
    }
    sheet
}

pub async fn export_users(
    service: &AdminService,
    params: UserExportParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let query = UserListQuery {
        role: params.role,
        status: params.status,
        search: params.search,
        ..Default::default()
    };
    match storage.list_users_for_export(query).await {
        Ok(users) => {
            info!("Exporting {} users as {}", users.len(), params.format);
            Ok(export::download("users", params.format, &[user_sheet(&users)]))
        }
        Err(e) => Ok(storage_error(e, "导出用户失败")),
    }
}
