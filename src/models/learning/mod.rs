//! 选课、学习进度、收藏与关注

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::PaginationInfo;
use crate::models::courses::entities::{Course, CourseSummary, Lesson};
use crate::models::courses::responses::MyQuizResult;
use crate::models::users::entities::UserSummary;

crate::models::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
    pub enum EnrollmentStatus {
        Active => "active",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct Enrollment {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub status: EnrollmentStatus,
    /// 0.0..=100.0
    pub progress: f64,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
}

impl Enrollment {
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct LessonProgress {
    pub id: i64,
    pub lesson_id: i64,
    pub user_id: i64,
    pub watched_seconds: f64,
    pub completed: bool,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// 课程进度 = 已完成课时 / 总课时 * 100，封顶 100
pub fn compute_progress(completed_lessons: u64, total_lessons: u64) -> f64 {
    if total_lessons == 0 {
        return 0.0;
    }
    let ratio = completed_lessons as f64 / total_lessons as f64 * 100.0;
    ((ratio * 100.0).round() / 100.0).min(100.0)
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct LessonProgressRequest {
    #[serde(default)]
    pub watched_seconds: f64,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct LessonProgressResponse {
    pub lesson_progress: LessonProgress,
    pub course_progress: f64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct MyCourseItem {
    pub enrollment: Enrollment,
    pub course: Course,
    pub teacher_name: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct MyCourseListResponse {
    pub items: Vec<MyCourseItem>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct CourseProgressResponse {
    pub enrollment: Enrollment,
    pub total_lessons: i64,
    pub completed_lessons: i64,
    pub lessons: Vec<LessonProgress>,
}

/// 开关类操作（收藏、关注）的结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct ToggleResponse {
    pub enabled: bool,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct FavoriteListResponse {
    pub items: Vec<CourseSummary>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct FollowEntry {
    pub user: UserSummary,
    pub followed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct FollowListResponse {
    pub items: Vec<FollowEntry>,
    pub pagination: PaginationInfo,
}

/// 教师查看课程学员
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct CourseStudent {
    pub student: UserSummary,
    pub email: String,
    pub enrollment: Enrollment,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct CourseStudentListResponse {
    pub items: Vec<CourseStudent>,
    pub pagination: PaginationInfo,
}

/// 已选课程中的课时，含正文
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct LessonItem {
    #[serde(flatten)]
    #[ts(flatten)]
    pub lesson: Lesson,
    pub completed: bool,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct CourseLessonsResponse {
    pub course_id: i64,
    pub items: Vec<LessonItem>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct LessonDetailResponse {
    pub lesson: Lesson,
    pub progress: Option<LessonProgress>,
}

/// 学生个人看板
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/learning.ts")]
pub struct StudentDashboard {
    pub enrollment_count: i64,
    pub favorite_count: i64,
    pub following_count: i64,
    pub average_progress: f64,
    pub completed_courses: i64,
    pub in_progress_courses: i64,
    pub not_started_courses: i64,
    pub quiz_count: i64,
    pub average_quiz_score: f64,
    pub total_spent: i64,
    pub pending_payments: i64,
    pub recent_enrollments: Vec<MyCourseItem>,
    pub recent_quiz_results: Vec<MyQuizResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_progress() {
        assert_eq!(compute_progress(0, 0), 0.0);
        assert_eq!(compute_progress(1, 4), 25.0);
        assert_eq!(compute_progress(1, 3), 33.33);
        assert_eq!(compute_progress(3, 3), 100.0);
        // 课时被删除后完成数可能超过总数
        assert_eq!(compute_progress(5, 3), 100.0);
    }
}
