//! 备份记录

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "backup_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub file_name: String,
    pub location: String,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_backup(self) -> crate::models::system::BackupRecord {
        use crate::models::system::{BackupRecord, BackupStatus};
        use chrono::{DateTime, Utc};

        BackupRecord {
            id: self.id,
            file_name: self.file_name,
            location: self.location,
            status: self
                .status
                .parse::<BackupStatus>()
                .unwrap_or(BackupStatus::Failed),
            note: self.note,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
