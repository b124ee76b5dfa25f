use std::collections::HashMap;

use serde::Deserialize;
use ts_rs::TS;

use super::entities::{CourseSort, CourseStatus};
use super::quiz::QuestionRequest;
use crate::models::common::PaginationQuery;

// 管理后台课程列表
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<CourseStatus>,
    pub search: Option<String>,
}

// 公开目录
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CatalogListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub sort: CourseSort,
}

/// 教师搜索关键字上限
pub const MAX_TEACHER_KEYWORD_CHARS: usize = 100;
/// 联想至少需要的字符数
pub const MIN_SUGGEST_CHARS: usize = 2;

// 公开教师搜索
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct TeacherSearchParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub keyword: Option<String>,
}

impl TeacherSearchParams {
    pub fn keyword(&self) -> Result<Option<String>, String> {
        let keyword = self
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());
        match keyword {
            Some(k) if k.chars().count() > MAX_TEACHER_KEYWORD_CHARS => Err(format!(
                "Keyword must be at most {MAX_TEACHER_KEYWORD_CHARS} characters"
            )),
            other => Ok(other.map(str::to_string)),
        }
    }
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct TeacherSuggestParams {
    #[serde(default)]
    pub term: String,
}

impl TeacherSuggestParams {
    /// 过短或过长的输入不查询
    pub fn term(&self) -> Option<&str> {
        let term = self.term.trim();
        let len = term.chars().count();
        (MIN_SUGGEST_CHARS..=MAX_TEACHER_KEYWORD_CHARS)
            .contains(&len)
            .then_some(term)
    }
}

/// 存储层课程列表查询
#[derive(Debug, Clone, Default)]
pub struct CourseListQuery {
    pub page: u64,
    pub size: u64,
    pub status: Option<CourseStatus>,
    pub teacher_id: Option<i64>,
    pub category_id: Option<i64>,
    /// 匹配标题或教师姓名
    pub search: Option<String>,
    /// 匹配标题或简介（公开目录）
    pub text_search: Option<String>,
    pub sort: CourseSort,
}

/// 新建课程；管理员必须指定 teacher_id，教师则固定为自己
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub thumbnail_url: Option<String>,
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub thumbnail_url: Option<String>,
    pub teacher_id: Option<i64>,
    pub category_ids: Option<Vec<i64>>,
}

/// 存储层新建课程
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub teacher_id: i64,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub thumbnail_url: Option<String>,
    pub status: CourseStatus,
    pub category_ids: Vec<i64>,
}

/// 存储层更新课程，None 表示不修改
#[derive(Debug, Clone, Default)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub thumbnail_url: Option<String>,
    pub teacher_id: Option<i64>,
    pub status: Option<CourseStatus>,
    pub reject_reason: Option<Option<String>>,
    pub category_ids: Option<Vec<i64>>,
}

pub const MAX_TITLE_CHARS: usize = 200;

pub(crate) fn clean_title(title: &str) -> Result<String, String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("Title is required".to_string());
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(format!("Title must be at most {MAX_TITLE_CHARS} characters"));
    }
    Ok(title.to_string())
}

fn check_price(price: i64) -> Result<i64, String> {
    if price < 0 {
        return Err("Price cannot be negative".to_string());
    }
    Ok(price)
}

impl CreateCourseRequest {
    /// 校验后组装存储层课程，教师与初始状态由调用方决定
    pub fn into_new_course(self, teacher_id: i64, status: CourseStatus) -> Result<NewCourse, String> {
        Ok(NewCourse {
            teacher_id,
            title: clean_title(&self.title)?,
            description: self.description.trim().to_string(),
            price: check_price(self.price)?,
            thumbnail_url: self
                .thumbnail_url
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),
            status,
            category_ids: self.category_ids,
        })
    }
}

impl UpdateCourseRequest {
    /// 空字符串的封面表示清除
    pub fn into_update(self) -> Result<CourseUpdate, String> {
        Ok(CourseUpdate {
            title: self.title.as_deref().map(clean_title).transpose()?,
            description: self.description.map(|d| d.trim().to_string()),
            price: self.price.map(check_price).transpose()?,
            thumbnail_url: self.thumbnail_url.map(|u| u.trim().to_string()),
            teacher_id: self.teacher_id,
            category_ids: self.category_ids,
            ..Default::default()
        })
    }
}

impl CreateLessonRequest {
    pub fn validate(&self) -> Result<(), String> {
        clean_title(&self.title)?;
        if self.duration_minutes < 0 {
            return Err("Duration cannot be negative".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CreateLessonRequest {
    pub title: String,
    pub content: String,
    pub duration_minutes: i32,
    pub video_url: Option<String>,
    #[serde(default)]
    pub video_required: bool,
    /// 缺省时排在最后
    pub position: Option<i32>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub duration_minutes: Option<i32>,
    pub video_url: Option<String>,
    pub video_required: Option<bool>,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct CreateQuizRequest {
    pub title: String,
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub questions: Vec<QuestionRequest>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct UpdateQuizRequest {
    pub title: Option<String>,
    pub duration_minutes: Option<i32>,
}

/// 提交答案，键为题目 ID，值为 A..=D
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct SubmitQuizRequest {
    pub answers: HashMap<i64, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(title: &str, price: i64) -> CreateCourseRequest {
        CreateCourseRequest {
            title: title.to_string(),
            description: " Intro ".to_string(),
            price,
            thumbnail_url: Some("  ".to_string()),
            teacher_id: None,
            category_ids: vec![1, 2],
        }
    }

    #[test]
    fn test_new_course_is_trimmed() {
        let course = create("  Rust Basics ", 0)
            .into_new_course(7, CourseStatus::Pending)
            .unwrap();
        assert_eq!(course.title, "Rust Basics");
        assert_eq!(course.description, "Intro");
        assert_eq!(course.thumbnail_url, None);
        assert_eq!(course.teacher_id, 7);
    }

    #[test]
    fn test_course_rules() {
        assert!(create("   ", 0).into_new_course(1, CourseStatus::Active).is_err());
        assert!(create("Paid", -1).into_new_course(1, CourseStatus::Active).is_err());
        assert!(create(&"t".repeat(201), 0).into_new_course(1, CourseStatus::Active).is_err());

        let update = UpdateCourseRequest {
            price: Some(-5),
            ..Default::default()
        };
        assert!(update.into_update().is_err());
    }

    #[test]
    fn test_teacher_search_inputs() {
        let search = |keyword: Option<&str>| TeacherSearchParams {
            pagination: PaginationQuery { page: 1, size: 0 },
            keyword: keyword.map(str::to_string),
        };
        assert_eq!(search(Some("  ada ")).keyword().unwrap().as_deref(), Some("ada"));
        assert_eq!(search(Some("   ")).keyword().unwrap(), None);
        assert!(search(Some(&"x".repeat(101))).keyword().is_err());

        let suggest = |term: &str| TeacherSuggestParams { term: term.to_string() };
        assert_eq!(suggest(" ad ").term(), Some("ad"));
        assert_eq!(suggest("a").term(), None);
    }
}
