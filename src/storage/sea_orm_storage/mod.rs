//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod categories;
mod course_follows;
mod courses;
mod learning;
mod lessons;
mod live_rooms;
mod maintenance;
mod notifications;
mod payments;
mod quizzes;
mod reports;
mod system_settings;
mod teachers;
#[cfg(test)]
mod tests;
mod users;

use crate::config::AppConfig;
use crate::errors::{LearnHubError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(storage)
    }

    /// 使用已有连接并执行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }

    /// 测试用内存库；每个连接各自独立，只能用单连接
    #[cfg(test)]
    pub(crate) async fn in_memory() -> Result<Self> {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(options)
            .await
            .map_err(|e| LearnHubError::database_connection(format!("内存数据库连接失败: {e}")))?;
        Self::from_connection(db).await
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| LearnHubError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| LearnHubError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| LearnHubError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 推断数据库类型
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") || url.starts_with("sqlite::memory:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(LearnHubError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

use crate::models::{
    PaginatedResponse,
    assignments::{
        Assignment, AssignmentSummary, AssignmentUpdate, MyAssignmentItem, MySubmission,
        NewAssignment, Submission, SubmissionWithStudent,
    },
    categories::{
        Category, CategoryDeleteOutcome, CategoryListQuery, CategoryListResponse,
        CategoryWithCount,
    },
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn list_users_for_export(&self, query: UserListQuery) -> Result<Vec<User>> {
        self.list_users_for_export_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn set_users_status(&self, ids: &[i64], status: UserStatus, skip_id: i64) -> Result<u64> {
        self.set_users_status_impl(ids, status, skip_id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn get_user_activity_counts(&self, id: i64) -> Result<UserActivityCounts> {
        self.get_user_activity_counts_impl(id).await
    }

    async fn create_category(&self, name: String, description: Option<String>) -> Result<Category> {
        self.create_category_impl(name, description).await
    }

    async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        self.get_category_by_id_impl(id).await
    }

    async fn list_categories_with_pagination(
        &self,
        query: CategoryListQuery,
    ) -> Result<CategoryListResponse> {
        self.list_categories_with_pagination_impl(query).await
    }

    async fn list_categories_with_active_counts(&self) -> Result<Vec<CategoryWithCount>> {
        self.list_categories_with_active_counts_impl().await
    }

    async fn update_category(
        &self,
        id: i64,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Option<Category>> {
        self.update_category_impl(id, name, description).await
    }

    async fn delete_category(&self, id: i64) -> Result<CategoryDeleteOutcome> {
        self.delete_category_impl(id).await
    }

    async fn create_course(&self, course: NewCourse) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        self.list_courses_with_pagination_impl(query).await
    }

    async fn update_course(&self, id: i64, update: CourseUpdate) -> Result<Option<Course>> {
        self.update_course_impl(id, update).await
    }

    async fn delete_course(&self, id: i64) -> Result<CourseDeleteOutcome> {
        self.delete_course_impl(id).await
    }

    async fn get_course_categories(&self, course_id: i64) -> Result<Vec<Category>> {
        self.get_course_categories_impl(course_id).await
    }

    async fn get_course_counts(&self, course_id: i64) -> Result<CourseCounts> {
        self.get_course_counts_impl(course_id).await
    }

    async fn create_lesson(&self, course_id: i64, lesson: CreateLessonRequest) -> Result<Lesson> {
        self.create_lesson_impl(course_id, lesson).await
    }

    async fn get_lesson_by_id(&self, id: i64) -> Result<Option<Lesson>> {
        self.get_lesson_by_id_impl(id).await
    }

    async fn list_lessons(&self, course_id: i64) -> Result<Vec<Lesson>> {
        self.list_lessons_impl(course_id).await
    }

    async fn update_lesson(&self, id: i64, update: UpdateLessonRequest) -> Result<Option<Lesson>> {
        self.update_lesson_impl(id, update).await
    }

    async fn delete_lesson(&self, id: i64) -> Result<bool> {
        self.delete_lesson_impl(id).await
    }

    async fn create_quiz(
        &self,
        course_id: i64,
        title: String,
        duration_minutes: i32,
        questions: Vec<QuestionRequest>,
    ) -> Result<(Quiz, Vec<Question>)> {
        self.create_quiz_impl(course_id, title, duration_minutes, questions).await
    }

    async fn get_quiz_by_id(&self, id: i64) -> Result<Option<Quiz>> {
        self.get_quiz_by_id_impl(id).await
    }

    async fn list_quizzes(&self, course_id: i64) -> Result<Vec<QuizSummary>> {
        self.list_quizzes_impl(course_id).await
    }

    async fn update_quiz(
        &self,
        id: i64,
        title: Option<String>,
        duration_minutes: Option<i32>,
    ) -> Result<Option<Quiz>> {
        self.update_quiz_impl(id, title, duration_minutes).await
    }

    async fn delete_quiz(&self, id: i64) -> Result<bool> {
        self.delete_quiz_impl(id).await
    }

    async fn list_questions(&self, quiz_id: i64) -> Result<Vec<Question>> {
        self.list_questions_impl(quiz_id).await
    }

    async fn add_question(&self, quiz_id: i64, question: NewQuestion) -> Result<Question> {
        self.add_question_impl(quiz_id, question).await
    }

    async fn get_question_by_id(&self, id: i64) -> Result<Option<Question>> {
        self.get_question_by_id_impl(id).await
    }

    async fn delete_question(&self, id: i64) -> Result<bool> {
        self.delete_question_impl(id).await
    }

    async fn create_quiz_result(&self, result: NewQuizResult) -> Result<QuizResult> {
        self.create_quiz_result_impl(result).await
    }

    async fn list_quiz_results(
        &self,
        quiz_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<QuizResultWithStudent>> {
        self.list_quiz_results_impl(quiz_id, page, size).await
    }

    async fn list_user_quiz_results(
        &self,
        user_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<MyQuizResult>> {
        self.list_user_quiz_results_impl(user_id, page, size).await
    }

    async fn get_enrollment(&self, user_id: i64, course_id: i64) -> Result<Option<Enrollment>> {
        self.get_enrollment_impl(user_id, course_id).await
    }

    async fn enroll_user(&self, user_id: i64, course_id: i64) -> Result<Enrollment> {
        self.enroll_user_impl(user_id, course_id).await
    }

    async fn list_user_enrollments(
        &self,
        user_id: i64,
        page: u64,
        size: u64,
    ) -> Result<MyCourseListResponse> {
        self.list_user_enrollments_impl(user_id, page, size).await
    }

    async fn list_course_students(
        &self,
        course_id: i64,
        page: u64,
        size: u64,
    ) -> Result<CourseStudentListResponse> {
        self.list_course_students_impl(course_id, page, size).await
    }

    async fn record_lesson_progress(
        &self,
        user_id: i64,
        lesson: &Lesson,
        watched_seconds: f64,
        completed: bool,
    ) -> Result<(LessonProgress, f64)> {
        self.record_lesson_progress_impl(user_id, lesson, watched_seconds, completed).await
    }

    async fn list_lesson_progress(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Vec<LessonProgress>> {
        self.list_lesson_progress_impl(user_id, course_id).await
    }

    async fn toggle_favorite(&self, user_id: i64, course_id: i64) -> Result<bool> {
        self.toggle_favorite_impl(user_id, course_id).await
    }

    async fn list_favorites(
        &self,
        user_id: i64,
        page: u64,
        size: u64,
    ) -> Result<FavoriteListResponse> {
        self.list_favorites_impl(user_id, page, size).await
    }

    async fn toggle_follow(&self, follower_id: i64, teacher_id: i64) -> Result<bool> {
        self.toggle_follow_impl(follower_id, teacher_id).await
    }

    async fn list_following(
        &self,
        user_id: i64,
        page: u64,
        size: u64,
    ) -> Result<FollowListResponse> {
        self.list_following_impl(user_id, page, size).await
    }

    async fn list_followers(
        &self,
        teacher_id: i64,
        page: u64,
        size: u64,
    ) -> Result<FollowListResponse> {
        self.list_followers_impl(teacher_id, page, size).await
    }

    async fn get_student_dashboard(&self, user_id: i64) -> Result<StudentDashboard> {
        self.get_student_dashboard_impl(user_id).await
    }

    async fn list_enrolled_student_ids(&self, course_id: i64) -> Result<Vec<i64>> {
        self.list_enrolled_student_ids_impl(course_id).await
    }

    async fn list_follower_ids(&self, teacher_id: i64) -> Result<Vec<i64>> {
        self.list_follower_ids_impl(teacher_id).await
    }

    async fn list_teacher_student_ids(&self, teacher_id: i64) -> Result<Vec<i64>> {
        self.list_teacher_student_ids_impl(teacher_id).await
    }

    async fn create_payment(
        &self,
        user_id: i64,
        course_id: i64,
        amount: i64,
        method: String,
    ) -> Result<Payment> {
        self.create_payment_impl(user_id, course_id, amount, method).await
    }

    async fn get_payment_by_id(&self, id: i64) -> Result<Option<Payment>> {
        self.get_payment_by_id_impl(id).await
    }

    async fn get_payment_detail(&self, id: i64) -> Result<Option<PaymentDetail>> {
        self.get_payment_detail_impl(id).await
    }

    async fn has_blocking_payment(&self, user_id: i64, course_id: i64) -> Result<bool> {
        self.has_blocking_payment_impl(user_id, course_id).await
    }

    async fn list_payments_with_pagination(
        &self,
        query: PaymentListQuery,
    ) -> Result<PaymentListResponse> {
        self.list_payments_with_pagination_impl(query).await
    }

    async fn list_payments_for_export(
        &self,
        query: PaymentListQuery,
    ) -> Result<Vec<PaymentDetail>> {
        self.list_payments_for_export_impl(query).await
    }

    async fn approve_payment(&self, id: i64) -> Result<PaymentApproval> {
        self.approve_payment_impl(id).await
    }

    async fn transition_payment(
        &self,
        id: i64,
        from: &[PaymentStatus],
        to: PaymentStatus,
        note: Option<String>,
    ) -> Result<PaymentTransition> {
        self.transition_payment_impl(id, from, to, note).await
    }

    async fn get_payment_totals(&self, user_id: i64) -> Result<PaymentTotals> {
        self.get_payment_totals_impl(user_id).await
    }

    async fn delete_failed_payments_before(&self, before_ts: i64) -> Result<u64> {
        self.delete_failed_payments_before_impl(before_ts).await
    }

    async fn create_notifications(&self, items: Vec<NewNotification>) -> Result<Vec<Notification>> {
        self.create_notifications_impl(items).await
    }

    async fn list_notifications(
        &self,
        user_id: i64,
        unread_only: bool,
        page: u64,
        size: u64,
    ) -> Result<NotificationListResponse> {
        self.list_notifications_impl(user_id, unread_only, page, size).await
    }

    async fn count_unread_notifications(&self, user_id: i64) -> Result<i64> {
        self.count_unread_notifications_impl(user_id).await
    }

    async fn mark_notification_read(&self, id: i64, user_id: i64) -> Result<bool> {
        self.mark_notification_read_impl(id, user_id).await
    }

    async fn mark_all_notifications_read(&self, user_id: i64) -> Result<i64> {
        self.mark_all_notifications_read_impl(user_id).await
    }

    async fn delete_notification(&self, id: i64, user_id: i64) -> Result<bool> {
        self.delete_notification_impl(id, user_id).await
    }

    async fn get_admin_dashboard(&self, window: DashboardWindow) -> Result<AdminDashboard> {
        self.get_admin_dashboard_impl(window).await
    }

    async fn get_health_counts(&self) -> Result<HealthCounts> {
        self.get_health_counts_impl().await
    }

    async fn list_revenue_entries(
        &self,
        from_ts: i64,
        to_ts: i64,
        teacher_id: Option<i64>,
    ) -> Result<Vec<RevenueEntry>> {
        self.list_revenue_entries_impl(from_ts, to_ts, teacher_id).await
    }

    async fn get_teacher_dashboard(&self, teacher_id: i64) -> Result<TeacherDashboard> {
        self.get_teacher_dashboard_impl(teacher_id).await
    }

    async fn list_course_performance(&self, teacher_id: i64) -> Result<Vec<CoursePerformance>> {
        self.list_course_performance_impl(teacher_id).await
    }

    async fn get_course_stats(&self, course_id: i64) -> Result<CourseStats> {
        self.get_course_stats_impl(course_id).await
    }

    async fn list_all_settings(&self) -> Result<Vec<SystemSetting>> {
        self.list_all_settings_impl().await
    }

    async fn get_setting(&self, key: &str) -> Result<Option<SystemSetting>> {
        self.get_setting_impl(key).await
    }

    async fn update_setting(
        &self,
        key: &str,
        value: &str,
        updated_by: i64,
    ) -> Result<Option<SystemSetting>> {
        self.update_setting_impl(key, value, updated_by).await
    }

    fn database_backend(&self) -> &'static str {
        self.database_backend_impl()
    }

    async fn create_backup(&self, backup_dir: &str) -> Result<BackupRecord> {
        self.create_backup_impl(backup_dir).await
    }

    async fn list_backups(&self, page: u64, size: u64) -> Result<BackupListResponse> {
        self.list_backups_impl(page, size).await
    }

    async fn create_live_room(&self, room: NewLiveRoom) -> Result<LiveRoom> {
        self.create_live_room_impl(room).await
    }

    async fn get_live_room(&self, id: &str) -> Result<Option<LiveRoomSummary>> {
        self.get_live_room_impl(id).await
    }

    async fn list_live_rooms(
        &self,
        status: Option<LiveRoomStatus>,
        teacher_id: Option<i64>,
        page: u64,
        size: u64,
    ) -> Result<LiveRoomListResponse> {
        self.list_live_rooms_impl(status, teacher_id, page, size).await
    }

    async fn join_live_room(&self, room_id: &str, user_id: i64) -> Result<JoinOutcome> {
        self.join_live_room_impl(room_id, user_id).await
    }

    async fn leave_live_room(&self, room_id: &str, user_id: i64) -> Result<bool> {
        self.leave_live_room_impl(room_id, user_id).await
    }

    async fn is_live_participant(&self, room_id: &str, user_id: i64) -> Result<bool> {
        self.is_live_participant_impl(room_id, user_id).await
    }

    async fn end_live_room(&self, room_id: &str) -> Result<Option<LiveRoom>> {
        self.end_live_room_impl(room_id).await
    }

    async fn count_active_live_rooms(&self) -> Result<i64> {
        self.count_active_live_rooms_impl().await
    }

    async fn create_assignment(&self, course_id: i64, assignment: NewAssignment) -> Result<Assignment> {
        self.create_assignment_impl(course_id, assignment).await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn list_assignments(&self, course_id: i64) -> Result<Vec<AssignmentSummary>> {
        self.list_assignments_impl(course_id).await
    }

    async fn update_assignment(&self, id: i64, update: AssignmentUpdate) -> Result<Option<Assignment>> {
        self.update_assignment_impl(id, update).await
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool> {
        self.delete_assignment_impl(id).await
    }

    async fn create_submission(
        &self,
        assignment: &Assignment,
        user_id: i64,
        content: String,
    ) -> Result<Submission> {
        self.create_submission_impl(assignment, user_id, content).await
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn list_assignment_submissions(
        &self,
        assignment_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<SubmissionWithStudent>> {
        self.list_assignment_submissions_impl(assignment_id, page, size)
            .await
    }

    async fn list_user_submissions(
        &self,
        user_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<MySubmission>> {
        self.list_user_submissions_impl(user_id, page, size).await
    }

    async fn list_my_assignments(&self, user_id: i64, course_id: i64) -> Result<Vec<MyAssignmentItem>> {
        self.list_my_assignments_impl(user_id, course_id).await
    }

    async fn grade_submission(
        &self,
        id: i64,
        grade: f64,
        feedback: Option<String>,
        graded_by: i64,
    ) -> Result<Option<Submission>> {
        self.grade_submission_impl(id, grade, feedback, graded_by)
            .await
    }

    async fn follow_course(&self, user_id: i64, course_id: i64) -> Result<bool> {
        self.follow_course_impl(user_id, course_id).await
    }

    async fn unfollow_course(&self, user_id: i64, course_id: i64) -> Result<bool> {
        self.unfollow_course_impl(user_id, course_id).await
    }

    async fn list_followed_courses(&self, user_id: i64, page: u64, size: u64) -> Result<CourseListResponse> {
        self.list_followed_courses_impl(user_id, page, size).await
    }

    async fn list_course_followers(&self, course_id: i64, page: u64, size: u64) -> Result<FollowListResponse> {
        self.list_course_followers_impl(course_id, page, size).await
    }

    async fn search_teachers(
        &self,
        keyword: Option<String>,
        page: u64,
        size: u64,
    ) -> Result<TeacherSearchResponse> {
        self.search_teachers_impl(keyword, page, size).await
    }

    async fn suggest_teachers(&self, term: &str, limit: u64) -> Result<Vec<TeacherSuggestion>> {
        self.suggest_teachers_impl(term, limit).await
    }

    async fn get_home_statistics(&self, month_start: i64) -> Result<HomeStatistics> {
        self.get_home_statistics_impl(month_start).await
    }
}
