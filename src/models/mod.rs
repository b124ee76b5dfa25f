//! 业务数据模型
//!
//! 与 `entity` 中的数据库实体分离，负责 API 的请求/响应结构与 TS 类型导出。

/// 生成以字符串形式存储和传输的枚举
///
/// 自动生成 Display、FromStr、反序列化（带可读错误信息）以及 `as_str()`。
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, ts_rs::TS)]
        $(#[$meta])*
        pub enum $name {
            $(#[serde(rename = $value)] $variant,)+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    _ => Err(format!(
                        "无效的{}: '{s}'. 支持: {}",
                        stringify!($name),
                        [$($value),+].join(", ")
                    )),
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use string_enum;

pub mod assignments;
pub mod auth;
pub mod categories;
pub mod common;
pub mod courses;
pub mod learning;
pub mod live;
pub mod notifications;
pub mod payments;
pub mod reports;
pub mod system;
pub mod users;

pub use common::{
    ApiResponse, BulkOperationResponse, ExportFormat, IdsRequest, PaginatedResponse,
    PaginationInfo, PaginationQuery, ReasonRequest,
};

/// 进程启动时间，用于计算运行时长
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 响应中的数字错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 请求错误
    BadRequest = 1000,
    ValidationFailed = 1001,
    UserNameInvalid = 1002,
    UserEmailInvalid = 1003,
    UserPasswordInvalid = 1004,

    // 认证
    Unauthorized = 1010,
    AuthFailed = 1011,
    AccountLocked = 1012,
    RegistrationClosed = 1013,

    // 授权
    Forbidden = 1020,
    CoursePermissionDenied = 1021,

    // 资源不存在
    NotFound = 1030,
    UserNotFound = 1031,
    CourseNotFound = 1032,
    CategoryNotFound = 1033,
    LessonNotFound = 1034,
    QuizNotFound = 1035,
    QuestionNotFound = 1036,
    PaymentNotFound = 1037,
    NotificationNotFound = 1038,
    LiveRoomNotFound = 1039,
    SettingNotFound = 1040,
    AssignmentNotFound = 1041,
    SubmissionNotFound = 1042,

    // 冲突与业务规则
    Conflict = 1050,
    UserAlreadyExists = 1051,
    CategoryAlreadyExists = 1052,
    CategoryInUse = 1053,
    CourseHasPayments = 1054,
    UserHasDependents = 1055,
    AlreadyEnrolled = 1056,
    PaymentAlreadyProcessed = 1057,
    PaymentAlreadyOpen = 1058,
    LiveRoomEnded = 1059,
    LiveRoomFull = 1060,
    CanNotDeleteCurrentUser = 1061,
    InvalidStateTransition = 1062,
    CourseNotAvailable = 1063,

    PaymentRequired = 1070,
    RateLimitExceeded = 1080,
    ExportFailed = 1090,

    InternalServerError = 5000,
}

impl ErrorCode {
    pub fn is_success(self) -> bool {
        self == ErrorCode::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;

    #[test]
    fn test_string_enum_round_trip_and_error() {
        assert_eq!("teacher".parse::<UserRole>(), Ok(UserRole::Teacher));
        assert_eq!(UserRole::Admin.to_string(), "admin");

        let err = "root".parse::<UserRole>().unwrap_err();
        assert!(err.contains("user, teacher, admin"));
    }

    #[test]
    fn test_string_enum_deserialize() {
        let role: UserRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, UserRole::User);
        assert!(serde_json::from_str::<UserRole>("\"student\"").is_err());
        assert_eq!(serde_json::to_string(&UserRole::Teacher).unwrap(), "\"teacher\"");
    }

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::RateLimitExceeded as i32, 1080);
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Conflict.is_success());
    }
}
