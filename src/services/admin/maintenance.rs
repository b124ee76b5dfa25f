use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::AdminService;
use crate::config::AppConfig;
use crate::models::common::pagination::ADMIN_PAGE_SIZE;
use crate::models::system::BackupStatus;
use crate::models::{ApiResponse, PaginationQuery};
use crate::services::storage_error;

/// 每次尝试都会留下备份记录，失败时记录原因
pub async fn backup(service: &AdminService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let backup_dir = &AppConfig::get().maintenance.backup_dir;

    match storage.create_backup(backup_dir).await {
        Ok(record) => {
            match record.status {
                BackupStatus::Success => info!("Backup written to {}", record.location),
                BackupStatus::Failed => warn!(
                    "Backup attempt failed: {}",
                    record.note.as_deref().unwrap_or("unknown reason")
                ),
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(record, "Backup finished")))
        }
        Err(e) => Ok(storage_error(e, "创建备份失败")),
    }
}

pub async fn list_backups(
    service: &AdminService,
    query: PaginationQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let (page, size) = query.normalized(ADMIN_PAGE_SIZE);
    let storage = service.get_storage(request);

    match storage.list_backups(page, size).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询备份记录失败")),
    }
}
