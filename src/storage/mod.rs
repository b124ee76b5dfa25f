use std::sync::Arc;

use crate::models::{
    PaginatedResponse,
    assignments::{
        Assignment, AssignmentSummary, AssignmentUpdate, MyAssignmentItem, MySubmission,
        NewAssignment, Submission, SubmissionWithStudent,
    },
    categories::{Category, CategoryDeleteOutcome, CategoryListQuery, CategoryListResponse, CategoryWithCount},
    courses::{
        entities::{Course, CourseCounts, CourseDeleteOutcome, Lesson},
        quiz::{NewQuestion, NewQuizResult, Question, QuestionRequest, Quiz, QuizResult, QuizSummary},
        requests::{CourseListQuery, CourseUpdate, CreateLessonRequest, NewCourse, UpdateLessonRequest},
        responses::{
            CourseListResponse, MyQuizResult, QuizResultWithStudent, TeacherSearchResponse,
            TeacherSuggestion,
        },
    },
    learning::{
        CourseStudentListResponse, Enrollment, FavoriteListResponse, FollowListResponse,
        LessonProgress, MyCourseListResponse, StudentDashboard,
    },
    live::{JoinOutcome, LiveRoom, LiveRoomListResponse, LiveRoomStatus, LiveRoomSummary, NewLiveRoom},
    notifications::{NewNotification, Notification, NotificationListResponse},
    payments::{
        Payment, PaymentApproval, PaymentDetail, PaymentListQuery, PaymentListResponse,
        PaymentStatus, PaymentTotals, PaymentTransition,
    },
    reports::{
        AdminDashboard, CoursePerformance, CourseStats, DashboardWindow, HealthCounts,
        HomeStatistics, RevenueEntry, TeacherDashboard,
    },
    system::{BackupListResponse, BackupRecord, SystemSetting},
    users::{
        entities::{User, UserStatus},
        requests::{NewUser, UserListQuery, UserUpdate},
        responses::{UserActivityCounts, UserListResponse},
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户（登录）
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 导出用，不分页
    async fn list_users_for_export(&self, query: UserListQuery) -> Result<Vec<User>>;
    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<Option<User>>;
    async fn delete_user(&self, id: i64) -> Result<bool>;
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 批量设置状态，跳过 skip_id
    async fn set_users_status(&self, ids: &[i64], status: UserStatus, skip_id: i64) -> Result<u64>;
    async fn count_users(&self) -> Result<u64>;
    async fn get_user_activity_counts(&self, id: i64) -> Result<UserActivityCounts>;

    /// 分类
    async fn create_category(&self, name: String, description: Option<String>) -> Result<Category>;
    async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>>;
    async fn list_categories_with_pagination(
        &self,
        query: CategoryListQuery,
    ) -> Result<CategoryListResponse>;
    // 公开目录：全部分类及其上架课程数
    async fn list_categories_with_active_counts(&self) -> Result<Vec<CategoryWithCount>>;
    async fn update_category(
        &self,
        id: i64,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Option<Category>>;
    async fn delete_category(&self, id: i64) -> Result<CategoryDeleteOutcome>;

    /// 课程
    async fn create_course(&self, course: NewCourse) -> Result<Course>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    async fn list_courses_with_pagination(&self, query: CourseListQuery) -> Result<CourseListResponse>;
    async fn update_course(&self, id: i64, update: CourseUpdate) -> Result<Option<Course>>;
    async fn delete_course(&self, id: i64) -> Result<CourseDeleteOutcome>;
    async fn get_course_categories(&self, course_id: i64) -> Result<Vec<Category>>;
    async fn get_course_counts(&self, course_id: i64) -> Result<CourseCounts>;

    /// 课时
    async fn create_lesson(&self, course_id: i64, lesson: CreateLessonRequest) -> Result<Lesson>;
    async fn get_lesson_by_id(&self, id: i64) -> Result<Option<Lesson>>;
    async fn list_lessons(&self, course_id: i64) -> Result<Vec<Lesson>>;
    async fn update_lesson(&self, id: i64, update: UpdateLessonRequest) -> Result<Option<Lesson>>;
    async fn delete_lesson(&self, id: i64) -> Result<bool>;

    /// 测验
    // 单事务插入测验及全部题目，任一题目不合法则整体回滚
    async fn create_quiz(
        &self,
        course_id: i64,
        title: String,
        duration_minutes: i32,
        questions: Vec<QuestionRequest>,
    ) -> Result<(Quiz, Vec<Question>)>;
    async fn get_quiz_by_id(&self, id: i64) -> Result<Option<Quiz>>;
    async fn list_quizzes(&self, course_id: i64) -> Result<Vec<QuizSummary>>;
    async fn update_quiz(
        &self,
        id: i64,
        title: Option<String>,
        duration_minutes: Option<i32>,
    ) -> Result<Option<Quiz>>;
    async fn delete_quiz(&self, id: i64) -> Result<bool>;
    async fn list_questions(&self, quiz_id: i64) -> Result<Vec<Question>>;
    async fn add_question(&self, quiz_id: i64, question: NewQuestion) -> Result<Question>;
    async fn get_question_by_id(&self, id: i64) -> Result<Option<Question>>;
    async fn delete_question(&self, id: i64) -> Result<bool>;
    async fn create_quiz_result(&self, result: NewQuizResult) -> Result<QuizResult>;
    async fn list_quiz_results(
        &self,
        quiz_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<QuizResultWithStudent>>;
    async fn list_user_quiz_results(
        &self,
        user_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<MyQuizResult>>;

    /// 作业
    async fn create_assignment(&self, course_id: i64, assignment: NewAssignment) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    async fn list_assignments(&self, course_id: i64) -> Result<Vec<AssignmentSummary>>;
    async fn update_assignment(&self, id: i64, update: AssignmentUpdate) -> Result<Option<Assignment>>;
    // 连同全部提交一起删除
    async fn delete_assignment(&self, id: i64) -> Result<bool>;
    // 每次提交新增一个版本
    async fn create_submission(
        &self,
        assignment: &Assignment,
        user_id: i64,
        content: String,
    ) -> Result<Submission>;
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    async fn list_assignment_submissions(
        &self,
        assignment_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<SubmissionWithStudent>>;
    async fn list_user_submissions(
        &self,
        user_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<MySubmission>>;
    async fn list_my_assignments(&self, user_id: i64, course_id: i64) -> Result<Vec<MyAssignmentItem>>;
    async fn grade_submission(
        &self,
        id: i64,
        grade: f64,
        feedback: Option<String>,
        graded_by: i64,
    ) -> Result<Option<Submission>>;

    /// 课程关注
    // 已关注返回 false
    async fn follow_course(&self, user_id: i64, course_id: i64) -> Result<bool>;
    async fn unfollow_course(&self, user_id: i64, course_id: i64) -> Result<bool>;
    async fn list_followed_courses(&self, user_id: i64, page: u64, size: u64) -> Result<CourseListResponse>;
    async fn list_course_followers(&self, course_id: i64, page: u64, size: u64) -> Result<FollowListResponse>;

    /// 教师搜索
    async fn search_teachers(
        &self,
        keyword: Option<String>,
        page: u64,
        size: u64,
    ) -> Result<TeacherSearchResponse>;
    async fn suggest_teachers(&self, term: &str, limit: u64) -> Result<Vec<TeacherSuggestion>>;

    /// 学习
    async fn get_enrollment(&self, user_id: i64, course_id: i64) -> Result<Option<Enrollment>>;
    // 新建或重新激活选课记录
    async fn enroll_user(&self, user_id: i64, course_id: i64) -> Result<Enrollment>;
    async fn list_user_enrollments(
        &self,
        user_id: i64,
        page: u64,
        size: u64,
    ) -> Result<MyCourseListResponse>;
    async fn list_course_students(
        &self,
        course_id: i64,
        page: u64,
        size: u64,
    ) -> Result<CourseStudentListResponse>;
    // 写入课时进度并重算课程进度
    async fn record_lesson_progress(
        &self,
        user_id: i64,
        lesson: &Lesson,
        watched_seconds: f64,
        completed: bool,
    ) -> Result<(LessonProgress, f64)>;
    async fn list_lesson_progress(&self, user_id: i64, course_id: i64) -> Result<Vec<LessonProgress>>;
    async fn toggle_favorite(&self, user_id: i64, course_id: i64) -> Result<bool>;
    async fn list_favorites(&self, user_id: i64, page: u64, size: u64) -> Result<FavoriteListResponse>;
    async fn toggle_follow(&self, follower_id: i64, teacher_id: i64) -> Result<bool>;
    async fn list_following(&self, user_id: i64, page: u64, size: u64) -> Result<FollowListResponse>;
    async fn list_followers(&self, teacher_id: i64, page: u64, size: u64) -> Result<FollowListResponse>;
    async fn get_student_dashboard(&self, user_id: i64) -> Result<StudentDashboard>;

    /// 通知接收者
    async fn list_enrolled_student_ids(&self, course_id: i64) -> Result<Vec<i64>>;
    async fn list_follower_ids(&self, teacher_id: i64) -> Result<Vec<i64>>;
    // 选了该教师任一课程的学生
    async fn list_teacher_student_ids(&self, teacher_id: i64) -> Result<Vec<i64>>;

    /// 支付
    async fn create_payment(
        &self,
        user_id: i64,
        course_id: i64,
        amount: i64,
        method: String,
    ) -> Result<Payment>;
    async fn get_payment_by_id(&self, id: i64) -> Result<Option<Payment>>;
    async fn get_payment_detail(&self, id: i64) -> Result<Option<PaymentDetail>>;
    // 是否存在 success / pending / waiting_confirm 的支付
    async fn has_blocking_payment(&self, user_id: i64, course_id: i64) -> Result<bool>;
    async fn list_payments_with_pagination(&self, query: PaymentListQuery) -> Result<PaymentListResponse>;
    async fn list_payments_for_export(&self, query: PaymentListQuery) -> Result<Vec<PaymentDetail>>;
    // 单事务：支付置为 success 并确保存在有效选课
    async fn approve_payment(&self, id: i64) -> Result<PaymentApproval>;
    // 仅当当前状态属于 from 时改为 to
    async fn transition_payment(
        &self,
        id: i64,
        from: &[PaymentStatus],
        to: PaymentStatus,
        note: Option<String>,
    ) -> Result<PaymentTransition>;
    async fn get_payment_totals(&self, user_id: i64) -> Result<PaymentTotals>;
    async fn delete_failed_payments_before(&self, before_ts: i64) -> Result<u64>;

    /// 通知
    async fn create_notifications(&self, items: Vec<NewNotification>) -> Result<Vec<Notification>>;
    async fn list_notifications(
        &self,
        user_id: i64,
        unread_only: bool,
        page: u64,
        size: u64,
    ) -> Result<NotificationListResponse>;
    async fn count_unread_notifications(&self, user_id: i64) -> Result<i64>;
    async fn mark_notification_read(&self, id: i64, user_id: i64) -> Result<bool>;
    async fn mark_all_notifications_read(&self, user_id: i64) -> Result<i64>;
    async fn delete_notification(&self, id: i64, user_id: i64) -> Result<bool>;

    /// 统计
    async fn get_admin_dashboard(&self, window: DashboardWindow) -> Result<AdminDashboard>;
    async fn get_health_counts(&self) -> Result<HealthCounts>;
    async fn get_home_statistics(&self, month_start: i64) -> Result<HomeStatistics>;
    // [from_ts, to_ts) 区间内的成功支付，可按教师过滤
    async fn list_revenue_entries(
        &self,
        from_ts: i64,
        to_ts: i64,
        teacher_id: Option<i64>,
    ) -> Result<Vec<RevenueEntry>>;
    async fn get_teacher_dashboard(&self, teacher_id: i64) -> Result<TeacherDashboard>;
    async fn list_course_performance(&self, teacher_id: i64) -> Result<Vec<CoursePerformance>>;
    async fn get_course_stats(&self, course_id: i64) -> Result<CourseStats>;

    /// 系统设置
    async fn list_all_settings(&self) -> Result<Vec<SystemSetting>>;
    async fn get_setting(&self, key: &str) -> Result<Option<SystemSetting>>;
    async fn update_setting(
        &self,
        key: &str,
        value: &str,
        updated_by: i64,
    ) -> Result<Option<SystemSetting>>;

    /// 维护
    fn database_backend(&self) -> &'static str;
    async fn create_backup(&self, backup_dir: &str) -> Result<BackupRecord>;
    async fn list_backups(&self, page: u64, size: u64) -> Result<BackupListResponse>;

    /// 直播
    async fn create_live_room(&self, room: NewLiveRoom) -> Result<LiveRoom>;
    async fn get_live_room(&self, id: &str) -> Result<Option<LiveRoomSummary>>;
    async fn list_live_rooms(
        &self,
        status: Option<LiveRoomStatus>,
        teacher_id: Option<i64>,
        page: u64,
        size: u64,
    ) -> Result<LiveRoomListResponse>;
    async fn join_live_room(&self, room_id: &str, user_id: i64) -> Result<JoinOutcome>;
    async fn leave_live_room(&self, room_id: &str, user_id: i64) -> Result<bool>;
    async fn is_live_participant(&self, room_id: &str, user_id: i64) -> Result<bool>;
    // 结束直播并清空参与者
    async fn end_live_room(&self, room_id: &str) -> Result<Option<LiveRoom>>;
    async fn count_active_live_rooms(&self) -> Result<i64>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
