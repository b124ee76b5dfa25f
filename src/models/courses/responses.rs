use serde::Serialize;
use ts_rs::TS;

use super::entities::{Course, CourseCounts, CourseSummary, Lesson, LessonOutline};
use super::quiz::{PublicQuestion, Question, QuestionOutcome, Quiz, QuizResult};
use crate::models::categories::Category;
use crate::models::common::PaginationInfo;
use crate::models::users::entities::UserSummary;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseListResponse {
    pub items: Vec<CourseSummary>,
    pub pagination: PaginationInfo,
}

/// 管理端 / 教师端课程详情
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseDetailResponse {
    pub course: Course,
    pub teacher: Option<UserSummary>,
    pub categories: Vec<Category>,
    pub counts: CourseCounts,
}

/// 公开目录中的课程详情
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CatalogCourseDetail {
    pub course: Course,
    pub teacher_name: String,
    pub categories: Vec<Category>,
    pub lessons: Vec<LessonOutline>,
    pub quiz_count: i64,
    pub enrollment_count: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct LessonListResponse {
    pub items: Vec<Lesson>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizDetailResponse {
    pub quiz: Quiz,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct TakeQuizResponse {
    pub quiz: Quiz,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizSubmissionResponse {
    pub result: QuizResult,
    pub answers: Vec<QuestionOutcome>,
}

/// 教师查看某测验的成绩
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizResultWithStudent {
    #[serde(flatten)]
    #[ts(flatten)]
    pub result: QuizResult,
    pub student: UserSummary,
}

/// 学生查看自己的成绩
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct MyQuizResult {
    #[serde(flatten)]
    #[ts(flatten)]
    pub result: QuizResult,
    pub quiz_title: String,
    pub course_id: i64,
    pub course_title: String,
}

/// 公开的教师主页
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct TeacherProfileResponse {
    pub teacher: UserSummary,
    pub courses: Vec<CourseSummary>,
    pub course_count: i64,
    pub follower_count: i64,
}

/// 教师搜索结果：附最热门的几门上架课程
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct TeacherSearchItem {
    pub teacher: UserSummary,
    pub active_course_count: i64,
    pub top_courses: Vec<CourseSummary>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct TeacherSearchResponse {
    pub items: Vec<TeacherSearchItem>,
    pub pagination: PaginationInfo,
}

/// 搜索框联想
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct TeacherSuggestion {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub active_course_count: i64,
}
