//! 存储层与启动流程的错误类型
//!
//! HTTP 层通过 `services::storage_error` 把它们映射为统一的 JSON 信封。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_learnhub_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum LearnHubError {
            $($variant(String),)*
        }

        impl LearnHubError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(LearnHubError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(LearnHubError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(LearnHubError::$variant(msg) => msg,)*
                }
            }
        }

        paste::paste! {
            impl LearnHubError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        LearnHubError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_learnhub_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    DatabaseConfig("E002", "Database Configuration Error"),
    DatabaseConnection("E003", "Database Connection Error"),
    DatabaseOperation("E004", "Database Operation Error"),
    FileOperation("E005", "File Operation Error"),
    Validation("E006", "Validation Error"),
    NotFound("E007", "Resource Not Found"),
    Serialization("E008", "Serialization Error"),
    Conflict("E009", "Conflict"),
    DateParse("E010", "Date Parse Error"),
    Authentication("E011", "Authentication Error"),
    Authorization("E012", "Authorization Error"),
    Export("E013", "Export Error"),
}

impl LearnHubError {
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 带上下文转换数据库错误，唯一约束冲突归为 Conflict
    pub fn from_db(context: &str, err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                LearnHubError::Conflict(format!("{context}: {detail}"))
            }
            _ => LearnHubError::DatabaseOperation(format!("{context}: {err}")),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, LearnHubError::Conflict(_))
    }
}

impl fmt::Display for LearnHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LearnHubError {}

impl From<sea_orm::DbErr> for LearnHubError {
    fn from(err: sea_orm::DbErr) -> Self {
        LearnHubError::from_db("database", err)
    }
}

impl From<std::io::Error> for LearnHubError {
    fn from(err: std::io::Error) -> Self {
        LearnHubError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LearnHubError {
    fn from(err: serde_json::Error) -> Self {
        LearnHubError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for LearnHubError {
    fn from(err: chrono::ParseError) -> Self {
        LearnHubError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LearnHubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LearnHubError::cache_connection("test").code(), "E001");
        assert_eq!(LearnHubError::database_config("test").code(), "E002");
        assert_eq!(LearnHubError::validation("test").code(), "E006");
        assert_eq!(LearnHubError::conflict("test").code(), "E009");
        assert_eq!(LearnHubError::export("test").code(), "E013");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            LearnHubError::not_found("test").error_type(),
            "Resource Not Found"
        );
        assert_eq!(
            LearnHubError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = LearnHubError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_format_simple() {
        let err = LearnHubError::export("sheet failed");
        let formatted = err.format_simple();
        assert!(formatted.contains("Export Error"));
        assert!(formatted.contains("sheet failed"));
    }

    #[test]
    fn test_db_error_keeps_context() {
        let err = LearnHubError::from_db(
            "Failed to create course",
            sea_orm::DbErr::Custom("boom".into()),
        );
        assert!(!err.is_conflict());
        assert!(err.message().starts_with("Failed to create course"));
    }
}
