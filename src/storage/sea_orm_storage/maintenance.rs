//! 备份与维护

use std::path::Path;

use super::SeaOrmStorage;
use crate::entity::backup_records::{ActiveModel, Column, Entity as BackupRecords};
use crate::errors::{LearnHubError, Result};
use crate::models::{
    PaginationInfo,
    system::{BackupListResponse, BackupRecord, BackupStatus},
};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseBackend, EntityTrait, PaginatorTrait, QueryOrder,
    Set,
};
use tracing::{error, info, warn};

impl SeaOrmStorage {
    pub(crate) fn database_backend_impl(&self) -> &'static str {
        match self.db.get_database_backend() {
            DatabaseBackend::Sqlite => "sqlite",
            DatabaseBackend::Postgres => "postgres",
            DatabaseBackend::MySql => "mysql",
            _ => "unknown",
        }
    }

    /// SQLite 通过 VACUUM INTO 写出一致性副本；其他数据库只记录一条失败记录
    pub(crate) async fn create_backup_impl(&self, backup_dir: &str) -> Result<BackupRecord> {
        let now = chrono::Utc::now();
        let file_name = format!("learnhub-{}.db", now.format("%Y%m%d-%H%M%S"));
        let location = Path::new(backup_dir)
            .join(&file_name)
            .to_string_lossy()
            .into_owned();

        let (status, note) = if self.db.get_database_backend() != DatabaseBackend::Sqlite {
            warn!("当前数据库不支持内置备份: {}", self.database_backend_impl());
            (
                BackupStatus::Failed,
                Some(format!(
                    "Backups for {} are delegated to the database server",
                    self.database_backend_impl()
                )),
            )
        } else if let Err(e) = tokio::fs::create_dir_all(backup_dir).await {
            error!("创建备份目录失败: {e}");
            (
                BackupStatus::Failed,
                Some(format!("Failed to create backup directory: {e}")),
            )
        } else {
            let escaped = location.replace('\'', "''");
            match self
                .db
                .execute_unprepared(&format!("VACUUM INTO '{escaped}'"))
                .await
            {
                Ok(_) => {
                    info!("数据库已备份到 {location}");
                    (BackupStatus::Success, None)
                }
                Err(e) => {
                    error!("数据库备份失败: {e}");
                    (BackupStatus::Failed, Some(e.to_string()))
                }
            }
        };

        let model = ActiveModel {
            file_name: Set(file_name),
            location: Set(location),
            status: Set(status.to_string()),
            note: Set(note),
            created_at: Set(now.timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| LearnHubError::database_operation(format!("记录备份失败: {e}")))?;

        Ok(model.into_backup())
    }

    pub(crate) async fn list_backups_impl(&self, page: u64, size: u64) -> Result<BackupListResponse> {
        let page = page.max(1);
        let size = size.clamp(1, 100);

        let paginator = BackupRecords::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询备份总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询备份页数失败: {e}")))?;
        let records = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询备份列表失败: {e}")))?;

        Ok(BackupListResponse {
            items: records.into_iter().map(|m| m.into_backup()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }
}
