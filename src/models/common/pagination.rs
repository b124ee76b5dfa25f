use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 普通列表默认每页条数
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// 管理后台列表默认每页条数
pub const ADMIN_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

// 分页查询参数，size 缺省为 0，由调用方按区域决定默认值
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct PaginationQuery {
    #[serde(
        default = "default_page",
        deserialize_with = "deserialize_string_to_i64"
    )]
    pub page: i64,
    #[serde(default, deserialize_with = "deserialize_string_to_i64")]
    pub size: i64,
}

impl PaginationQuery {
    /// 归一化页码与条数：page >= 1，size 落在 1..=100
    pub fn normalized(&self, default_size: i64) -> (u64, u64) {
        let page = self.page.max(1);
        let size = if self.size <= 0 {
            default_size
        } else {
            self.size
        };
        (page as u64, size.clamp(1, MAX_PAGE_SIZE) as u64)
    }
}

// 分页响应信息
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct PaginationInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PaginationInfo {
    pub fn new(page: u64, size: u64, total: u64, total_pages: u64) -> Self {
        Self {
            page: page as i64,
            page_size: size as i64,
            total: total as i64,
            total_pages: total_pages as i64,
        }
    }
}

// 分页列表响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct PaginatedResponse<T: TS> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

// 自定义反序列化函数，支持字符串到i64的转换
fn deserialize_string_to_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{Error, Unexpected, Visitor};
    use std::fmt;

    struct I64Visitor;

    impl<'de> Visitor<'de> for I64Visitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer or a string containing an integer")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            i64::try_from(value).map_err(|_| Error::invalid_value(Unexpected::Unsigned(value), &self))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            value
                .trim()
                .parse()
                .map_err(|_| Error::invalid_value(Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(I64Visitor)
}

fn default_page() -> i64 {
    1
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self { page: 1, size: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(flatten)]
        pagination: PaginationQuery,
    }

    #[test]
    fn test_parse_from_query_string() {
        let parsed: Wrapper = serde_urlencoded_like("page=3&size=25");
        assert_eq!(parsed.pagination.page, 3);
        assert_eq!(parsed.pagination.size, 25);
    }

    #[test]
    fn test_defaults_when_missing() {
        let parsed: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.normalized(DEFAULT_PAGE_SIZE), (1, 10));
        assert_eq!(parsed.normalized(ADMIN_PAGE_SIZE), (1, 20));
    }

    #[test]
    fn test_normalize_clamps() {
        let q = PaginationQuery { page: -4, size: 1000 };
        assert_eq!(q.normalized(DEFAULT_PAGE_SIZE), (1, 100));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<PaginationQuery>(r#"{"page":"abc"}"#).is_err());
    }

    fn serde_urlencoded_like<T: serde::de::DeserializeOwned>(query: &str) -> T {
        actix_web::web::Query::<T>::from_query(query)
            .expect("query should parse")
            .into_inner()
    }
}
