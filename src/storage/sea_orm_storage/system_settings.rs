//! 系统设置存储实现

use sea_orm::{ActiveModelTrait, EntityTrait, Order, QueryOrder, Set};

use crate::entity::prelude::SystemSettings;
use crate::errors::{LearnHubError, Result};
use crate::models::system::SystemSetting;

use super::SeaOrmStorage;

impl SeaOrmStorage {
    /// 获取所有设置
    pub(crate) async fn list_all_settings_impl(&self) -> Result<Vec<SystemSetting>> {
        let settings = SystemSettings::find()
            .order_by(crate::entity::system_settings::Column::Key, Order::Asc)
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("获取设置列表失败: {e}")))?;

        Ok(settings.into_iter().map(|s| s.into_setting()).collect())
    }

    /// 通过 key 获取设置
    pub(crate) async fn get_setting_impl(&self, key: &str) -> Result<Option<SystemSetting>> {
        let setting = SystemSettings::find_by_id(key.to_string())
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("获取设置失败: {e}")))?;

        Ok(setting.map(|s| s.into_setting()))
    }

    /// 更新设置，key 不存在时返回 None；值的校验由调用方完成
    pub(crate) async fn update_setting_impl(
        &self,
        key: &str,
        value: &str,
        updated_by: i64,
    ) -> Result<Option<SystemSetting>> {
        let Some(existing) = SystemSettings::find_by_id(key.to_string())
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("获取设置失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut active_model: crate::entity::system_settings::ActiveModel = existing.into();
        active_model.value = Set(value.to_string());
        active_model.updated_at = Set(chrono::Utc::now().timestamp());
        active_model.updated_by = Set(Some(updated_by));

        let updated = active_model
            .update(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("更新设置失败: {e}")))?;

        Ok(Some(updated.into_setting()))
    }
}
