//! 系统设置与维护

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::PaginationInfo;

crate::models::string_enum! {
    /// 配置值类型
    #[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
    pub enum SettingValueType {
        String => "string",
        Integer => "integer",
        Boolean => "boolean",
        Email => "email",
    }
}

impl SettingValueType {
    /// 校验并规范化配置值
    pub fn normalize(&self, raw: &str) -> Result<String, String> {
        let value = raw.trim();
        match self {
            SettingValueType::String => Ok(value.to_string()),
            SettingValueType::Integer => value
                .parse::<i64>()
                .map(|v| v.to_string())
                .map_err(|_| format!("'{value}' is not an integer")),
            SettingValueType::Boolean => match value.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok("true".to_string()),
                "false" | "0" | "no" | "off" => Ok("false".to_string()),
                _ => Err(format!("'{value}' is not a boolean")),
            },
            SettingValueType::Email => crate::utils::validate::validate_email(value)
                .map(|_| value.to_string())
                .map_err(|e| e.to_string()),
        }
    }
}

/// 已知配置键
pub mod keys {
    pub const SITE_NAME: &str = "site.name";
    pub const SITE_DESCRIPTION: &str = "site.description";
    pub const SITE_CONTACT_EMAIL: &str = "site.contact_email";
    pub const SITE_MAINTENANCE_MODE: &str = "site.maintenance_mode";
    pub const SITE_ALLOW_REGISTRATION: &str = "site.allow_registration";
    pub const JWT_ACCESS_TOKEN_EXPIRY: &str = "jwt.access_token_expiry";
    pub const JWT_REFRESH_TOKEN_EXPIRY: &str = "jwt.refresh_token_expiry";
    pub const JWT_REFRESH_TOKEN_REMEMBER_ME_EXPIRY: &str = "jwt.refresh_token_remember_me_expiry";
    pub const CORS_MAX_AGE: &str = "cors.max_age";
}

/// 系统设置实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct SystemSetting {
    pub key: String,
    pub value: String,
    pub value_type: SettingValueType,
    pub description: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub updated_by: Option<i64>,
}

/// 更新配置请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct UpdateSettingRequest {
    pub value: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct SettingListResponse {
    pub items: Vec<SystemSetting>,
}

/// 前端公开可读的站点信息
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct PublicSiteSettings {
    pub site_name: String,
    pub site_description: String,
    pub contact_email: String,
    pub allow_registration: bool,
    pub maintenance_mode: bool,
    pub environment: String,
    pub version: String,
}

crate::models::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
    pub enum BackupStatus {
        Success => "success",
        Failed => "failed",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct BackupRecord {
    pub id: i64,
    pub file_name: String,
    pub location: String,
    pub status: BackupStatus,
    pub note: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct BackupListResponse {
    pub items: Vec<BackupRecord>,
    pub pagination: PaginationInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_values() {
        assert_eq!(SettingValueType::Integer.normalize(" 60 ").unwrap(), "60");
        assert!(SettingValueType::Integer.normalize("sixty").is_err());
    }

    #[test]
    fn test_boolean_values() {
        assert_eq!(SettingValueType::Boolean.normalize("YES").unwrap(), "true");
        assert_eq!(SettingValueType::Boolean.normalize("0").unwrap(), "false");
        assert!(SettingValueType::Boolean.normalize("maybe").is_err());
    }

    #[test]
    fn test_email_values() {
        assert!(SettingValueType::Email.normalize("ops@example.com").is_ok());
        assert!(SettingValueType::Email.normalize("not-an-email").is_err());
    }

    #[test]
    fn test_string_values_are_trimmed() {
        assert_eq!(SettingValueType::String.normalize("  LearnHub ").unwrap(), "LearnHub");
    }
}
