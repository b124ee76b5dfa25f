use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::NotificationService;
use crate::models::notifications::MarkAllReadResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::websocket::ConnectionManager;
use crate::services::{current_user, not_found, storage_error};
use crate::storage::Storage;

/// 已读状态变化后刷新其他标签页的未读数
async fn sync_unread(storage: &Arc<dyn Storage>, user_id: i64) {
    if !ConnectionManager::get().is_online(user_id) {
        return;
    }
    match storage.count_unread_notifications(user_id).await {
        Ok(count) => {
            ConnectionManager::get().push_unread_count(user_id, count);
        }
        Err(e) => debug!("Skipping unread sync for user {user_id}: {e}"),
    }
}

/// 只能操作自己的通知，他人的通知按不存在处理
pub async fn mark_read(
    service: &NotificationService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.mark_notification_read(id, user.id).await {
        Ok(true) => {
            sync_unread(&storage, user.id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("已标记为已读")))
        }
        Ok(false) => Ok(not_found(ErrorCode::NotificationNotFound, "Notification not found")),
        Err(e) => Ok(storage_error(e, "标记通知失败")),
    }
}

pub async fn mark_all_read(
    service: &NotificationService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.mark_all_notifications_read(user.id).await {
        Ok(marked_count) => {
            ConnectionManager::get().push_unread_count(user.id, 0);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                MarkAllReadResponse { marked_count },
                "已全部标记为已读",
            )))
        }
        Err(e) => Ok(storage_error(e, "标记通知失败")),
    }
}

pub async fn delete_notification(
    service: &NotificationService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.delete_notification(id, user.id).await {
        Ok(true) => {
            sync_unread(&storage, user.id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("通知已删除")))
        }
        Ok(false) => Ok(not_found(ErrorCode::NotificationNotFound, "Notification not found")),
        Err(e) => Ok(storage_error(e, "删除通知失败")),
    }
}
