use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AdminService;
use crate::models::system::{SettingListResponse, UpdateSettingRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::system::DynamicConfig;
use crate::services::{bad_request, current_user, not_found, storage_error};

pub async fn list_settings(service: &AdminService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_all_settings().await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SettingListResponse { items },
            "查询成功",
        ))),
        Err(e) => Ok(storage_error(e, "查询系统设置失败")),
    }
}

/// 按声明的类型校验后写库，并刷新内存中的动态配置
pub async fn update_setting(
    service: &AdminService,
    key: String,
    body: UpdateSettingRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let admin = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let setting = match storage.get_setting(&key).await {
        Ok(Some(setting)) => setting,
        Ok(None) => return Ok(not_found(ErrorCode::SettingNotFound, "Setting not found")),
        Err(e) => return Ok(storage_error(e, "查询系统设置失败")),
    };
    let value = match setting.value_type.normalize(&body.value) {
        Ok(value) => value,
        Err(msg) => return Ok(bad_request(ErrorCode::ValidationFailed, msg)),
    };

    match storage.update_setting(&key, &value, admin.id).await {
        Ok(Some(updated)) => {
            DynamicConfig::update(&updated.key, &updated.value).await;
            info!("Admin {} set {} = {}", admin.id, updated.key, updated.value);
            Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "Setting updated")))
        }
        Ok(None) => Ok(not_found(ErrorCode::SettingNotFound, "Setting not found")),
        Err(e) => Ok(storage_error(e, "更新系统设置失败")),
    }
}
