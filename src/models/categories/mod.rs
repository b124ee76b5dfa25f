//! 课程分类

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::{PaginationInfo, PaginationQuery};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/category.ts")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 带课程数量的分类
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/category.ts")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    #[ts(flatten)]
    pub category: Category,
    pub course_count: i64,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/category.ts")]
pub struct CategoryListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

/// 删除分类的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryDeleteOutcome {
    Deleted,
    NotFound,
    /// 仍有课程引用该分类
    InUse(i64),
}

#[derive(Debug, Clone, Default)]
pub struct CategoryListQuery {
    pub page: u64,
    pub size: u64,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/category.ts")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/category.ts")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/category.ts")]
pub struct CategoryListResponse {
    pub items: Vec<CategoryWithCount>,
    pub pagination: PaginationInfo,
}

/// 公开目录中的全部分类
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/category.ts")]
pub struct CategoryCatalogResponse {
    pub items: Vec<CategoryWithCount>,
}

/// 分类名称规则：去除首尾空白后 1..=100 个字符
pub fn validate_category_name(name: &str) -> Result<String, &'static str> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err("Category name is required");
    }
    if len > 100 {
        return Err("Category name must be at most 100 characters");
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_name_rules() {
        assert_eq!(validate_category_name("  Rust  ").unwrap(), "Rust");
        assert!(validate_category_name("   ").is_err());
        assert!(validate_category_name(&"x".repeat(101)).is_err());
        assert!(validate_category_name(&"名".repeat(100)).is_ok());
    }
}
