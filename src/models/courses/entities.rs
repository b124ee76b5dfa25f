use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::models::string_enum! {
    /// 课程审核状态
    #[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
    pub enum CourseStatus {
        Pending => "pending",
        Active => "active",
        Rejected => "rejected",
    }
}

crate::models::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
    pub enum CourseSort {
        Newest => "newest",
        Popular => "popular",
        Title => "title",
    }
}

impl Default for CourseSort {
    fn default() -> Self {
        CourseSort::Newest
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Course {
    pub id: i64,
    pub teacher_id: i64,
    pub title: String,
    pub description: String,
    /// 最小货币单位
    pub price: i64,
    pub thumbnail_url: Option<String>,
    pub status: CourseStatus,
    pub reject_reason: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Course {
    pub fn is_active(&self) -> bool {
        self.status == CourseStatus::Active
    }

    pub fn is_free(&self) -> bool {
        self.price == 0
    }
}

/// 列表项：课程附带教师姓名与有效选课人数
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseSummary {
    #[serde(flatten)]
    #[ts(flatten)]
    pub course: Course,
    pub teacher_name: String,
    pub enrollment_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Lesson {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub content: String,
    pub duration_minutes: i32,
    pub video_url: Option<String>,
    /// 需要看完视频才算完成
    pub video_required: bool,
    pub position: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 公开目录中的课时大纲，不含正文
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct LessonOutline {
    pub id: i64,
    pub title: String,
    pub duration_minutes: i32,
    pub position: i32,
}

impl From<&Lesson> for LessonOutline {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id,
            title: lesson.title.clone(),
            duration_minutes: lesson.duration_minutes,
            position: lesson.position,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseCounts {
    pub lesson_count: i64,
    pub quiz_count: i64,
    pub enrollment_count: i64,
}

/// 删除课程的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseDeleteOutcome {
    Deleted,
    NotFound,
    /// 存在成功支付记录，禁止删除
    HasPayments,
}
