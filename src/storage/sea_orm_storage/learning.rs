//! 选课、学习进度、收藏与关注存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::enrollments::{
    ActiveModel as EnrollmentActiveModel, Column as EnrollmentColumn, Entity as Enrollments,
    Model as EnrollmentModel,
};
use crate::entity::favorite_courses::{
    ActiveModel as FavoriteActiveModel, Column as FavoriteColumn, Entity as FavoriteCourses,
};
use crate::entity::follows::{
    ActiveModel as FollowActiveModel, Column as FollowColumn, Entity as Follows,
};
use crate::entity::lesson_progress::{
    ActiveModel as ProgressActiveModel, Column as ProgressColumn, Entity as LessonProgressEntity,
};
use crate::entity::lessons::{Column as LessonColumn, Entity as Lessons};
use crate::entity::payments::{Column as PaymentColumn, Entity as Payments};
use crate::entity::quiz_results::{Column as ResultColumn, Entity as QuizResults};
use crate::errors::{LearnHubError, Result};
use crate::models::{
    PaginationInfo,
    courses::entities::{Course, Lesson},
    learning::{
        CourseStudent, CourseStudentListResponse, Enrollment, EnrollmentStatus,
        FavoriteListResponse, FollowEntry, FollowListResponse, LessonProgress, MyCourseItem,
        MyCourseListResponse, StudentDashboard, compute_progress,
    },
    payments::PaymentStatus,
    users::entities::UserSummary,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 确保存在有效选课：不存在则新建，已取消则重新激活
pub(super) async fn ensure_active_enrollment<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    course_id: i64,
) -> std::result::Result<EnrollmentModel, DbErr> {
    let existing = Enrollments::find()
        .filter(EnrollmentColumn::UserId.eq(user_id))
        .filter(EnrollmentColumn::CourseId.eq(course_id))
        .one(conn)
        .await?;

    match existing {
        Some(model) if model.status == EnrollmentStatus::Active.to_string() => Ok(model),
        Some(model) => {
            let mut active: EnrollmentActiveModel = model.into();
            active.status = Set(EnrollmentStatus::Active.to_string());
            active.enrolled_at = Set(chrono::Utc::now().timestamp());
            active.update(conn).await
        }
        None => {
            EnrollmentActiveModel {
                user_id: Set(user_id),
                course_id: Set(course_id),
                status: Set(EnrollmentStatus::Active.to_string()),
                progress: Set(0.0),
                enrolled_at: Set(chrono::Utc::now().timestamp()),
                ..Default::default()
            }
            .insert(conn)
            .await
        }
    }
}

fn unknown_user(id: i64) -> UserSummary {
    UserSummary {
        id,
        username: String::new(),
        full_name: String::new(),
        avatar_url: None,
    }
}

impl SeaOrmStorage {
    pub async fn get_enrollment_impl(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>> {
        let result = Enrollments::find()
            .filter(EnrollmentColumn::UserId.eq(user_id))
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询选课失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    pub async fn enroll_user_impl(&self, user_id: i64, course_id: i64) -> Result<Enrollment> {
        let model = ensure_active_enrollment(&self.db, user_id, course_id)
            .await
            .map_err(|e| LearnHubError::from_db("选课失败", e))?;

        Ok(model.into_enrollment())
    }

    /// 我的课程（仅有效选课），按选课时间倒序
    pub async fn list_user_enrollments_impl(
        &self,
        user_id: i64,
        page: u64,
        size: u64,
    ) -> Result<MyCourseListResponse> {
        let page = page.max(1);
        let size = size.clamp(1, 100);

        let paginator = Enrollments::find()
            .filter(EnrollmentColumn::UserId.eq(user_id))
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.to_string()))
            .order_by_desc(EnrollmentColumn::EnrolledAt)
            .order_by_desc(EnrollmentColumn::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询选课总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询选课页数失败: {e}")))?;
        let enrollments = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询选课列表失败: {e}")))?;

        let items = self.attach_courses(enrollments).await?;

        Ok(MyCourseListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    async fn attach_courses(&self, enrollments: Vec<EnrollmentModel>) -> Result<Vec<MyCourseItem>> {
        let course_ids: Vec<i64> = enrollments.iter().map(|e| e.course_id).collect();
        let courses: HashMap<i64, Course> = Courses::find()
            .filter(CourseColumn::Id.is_in(course_ids))
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课程失败: {e}")))?
            .into_iter()
            .map(|m| (m.id, m.into_course()))
            .collect();
        let teachers = self
            .user_summaries(courses.values().map(|c| c.teacher_id).collect())
            .await?;

        Ok(enrollments
            .into_iter()
            .filter_map(|e| {
                let course = courses.get(&e.course_id)?.clone();
                let teacher_name = teachers
                    .get(&course.teacher_id)
                    .map(|t| t.full_name.clone())
                    .unwrap_or_default();
                Some(MyCourseItem {
                    enrollment: e.into_enrollment(),
                    course,
                    teacher_name,
                })
            })
            .collect())
    }

    pub async fn list_course_students_impl(
        &self,
        course_id: i64,
        page: u64,
        size: u64,
    ) -> Result<CourseStudentListResponse> {
        let page = page.max(1);
        let size = size.clamp(1, 100);

        let paginator = Enrollments::find()
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .order_by_desc(EnrollmentColumn::EnrolledAt)
            .order_by_desc(EnrollmentColumn::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询学员总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询学员页数失败: {e}")))?;
        let enrollments = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询学员列表失败: {e}")))?;

        let user_ids: Vec<i64> = enrollments.iter().map(|e| e.user_id).collect();
        let users = self.users_by_ids(user_ids).await?;

        let items = enrollments
            .into_iter()
            .map(|e| {
                let (student, email) = match users.get(&e.user_id) {
                    Some(u) => (u.summary(), u.email.clone()),
                    None => (unknown_user(e.user_id), String::new()),
                };
                CourseStudent {
                    student,
                    email,
                    enrollment: e.into_enrollment(),
                }
            })
            .collect();

        Ok(CourseStudentListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 写入课时进度并重算课程进度；completed 一旦为 true 不会被撤销
    pub async fn record_lesson_progress_impl(
        &self,
        user_id: i64,
        lesson: &Lesson,
        watched_seconds: f64,
        completed: bool,
    ) -> Result<(LessonProgress, f64)> {
        let lesson_id = lesson.id;
        let course_id = lesson.course_id;
        let now = chrono::Utc::now().timestamp();

        let (progress, course_progress) = self
            .db
            .transaction::<_, (LessonProgress, f64), DbErr>(|txn| {
                Box::pin(async move {
                    let existing = LessonProgressEntity::find()
                        .filter(ProgressColumn::LessonId.eq(lesson_id))
                        .filter(ProgressColumn::UserId.eq(user_id))
                        .one(txn)
                        .await?;

                    let saved = match existing {
                        Some(model) => {
                            let was_completed = model.completed;
                            let watched = model.watched_seconds.max(watched_seconds);
                            let mut active: ProgressActiveModel = model.into();
                            active.watched_seconds = Set(watched);
                            if completed && !was_completed {
                                active.completed = Set(true);
                                active.completed_at = Set(Some(now));
                            }
                            active.update(txn).await?
                        }
                        None => {
                            ProgressActiveModel {
                                lesson_id: Set(lesson_id),
                                user_id: Set(user_id),
                                watched_seconds: Set(watched_seconds.max(0.0)),
                                completed: Set(completed),
                                completed_at: Set(completed.then_some(now)),
                                ..Default::default()
                            }
                            .insert(txn)
                            .await?
                        }
                    };

                    let lesson_ids: Vec<i64> = Lessons::find()
                        .select_only()
                        .column(LessonColumn::Id)
                        .filter(LessonColumn::CourseId.eq(course_id))
                        .into_tuple::<i64>()
                        .all(txn)
                        .await?;
                    let total = lesson_ids.len() as u64;
                    let done = LessonProgressEntity::find()
                        .filter(ProgressColumn::UserId.eq(user_id))
                        .filter(ProgressColumn::Completed.eq(true))
                        .filter(ProgressColumn::LessonId.is_in(lesson_ids))
                        .count(txn)
                        .await?;
                    let course_progress = compute_progress(done, total);

                    Enrollments::update_many()
                        .col_expr(
                            EnrollmentColumn::Progress,
                            sea_orm::sea_query::Expr::value(course_progress),
                        )
                        .filter(EnrollmentColumn::UserId.eq(user_id))
                        .filter(EnrollmentColumn::CourseId.eq(course_id))
                        .exec(txn)
                        .await?;

                    Ok((saved.into_progress(), course_progress))
                })
            })
            .await
            .map_err(|e| LearnHubError::database_operation(format!("记录学习进度失败: {e}")))?;

        Ok((progress, course_progress))
    }

    pub async fn list_lesson_progress_impl(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Vec<LessonProgress>> {
        let lesson_ids: Vec<i64> = Lessons::find()
            .select_only()
            .column(LessonColumn::Id)
            .filter(LessonColumn::CourseId.eq(course_id))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课时失败: {e}")))?;

        let rows = LessonProgressEntity::find()
            .filter(ProgressColumn::UserId.eq(user_id))
            .filter(ProgressColumn::LessonId.is_in(lesson_ids))
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询学习进度失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_progress()).collect())
    }

    /// 返回切换后的收藏状态
    pub async fn toggle_favorite_impl(&self, user_id: i64, course_id: i64) -> Result<bool> {
        let deleted = FavoriteCourses::delete_many()
            .filter(FavoriteColumn::UserId.eq(user_id))
            .filter(FavoriteColumn::CourseId.eq(course_id))
            .exec(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("取消收藏失败: {e}")))?;
        if deleted.rows_affected > 0 {
            return Ok(false);
        }

        FavoriteActiveModel {
            user_id: Set(user_id),
            course_id: Set(course_id),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| LearnHubError::from_db("收藏课程失败", e))?;

        Ok(true)
    }

    pub async fn list_favorites_impl(
        &self,
        user_id: i64,
        page: u64,
        size: u64,
    ) -> Result<FavoriteListResponse> {
        let page = page.max(1);
        let size = size.clamp(1, 100);

        let paginator = FavoriteCourses::find()
            .filter(FavoriteColumn::UserId.eq(user_id))
            .order_by_desc(FavoriteColumn::CreatedAt)
            .order_by_desc(FavoriteColumn::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询收藏总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询收藏页数失败: {e}")))?;
        let favorites = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询收藏列表失败: {e}")))?;

        let course_ids: Vec<i64> = favorites.iter().map(|f| f.course_id).collect();
        let mut by_id: HashMap<i64, Course> = Courses::find()
            .filter(CourseColumn::Id.is_in(course_ids.clone()))
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课程失败: {e}")))?
            .into_iter()
            .map(|m| (m.id, m.into_course()))
            .collect();
        // 保持收藏时间顺序
        let ordered: Vec<Course> = course_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();

        Ok(FavoriteListResponse {
            items: self.summarize_courses(ordered).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 返回切换后的关注状态
    pub async fn toggle_follow_impl(&self, follower_id: i64, teacher_id: i64) -> Result<bool> {
        let deleted = Follows::delete_many()
            .filter(FollowColumn::FollowerId.eq(follower_id))
            .filter(FollowColumn::TeacherId.eq(teacher_id))
            .exec(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("取消关注失败: {e}")))?;
        if deleted.rows_affected > 0 {
            return Ok(false);
        }

        FollowActiveModel {
            follower_id: Set(follower_id),
            teacher_id: Set(teacher_id),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| LearnHubError::from_db("关注教师失败", e))?;

        Ok(true)
    }

    /// following = true 时列出 user_id 关注的教师，否则列出关注 user_id 的用户
    async fn list_follows(
        &self,
        user_id: i64,
        following: bool,
        page: u64,
        size: u64,
    ) -> Result<FollowListResponse> {
        let page = page.max(1);
        let size = size.clamp(1, 100);

        let filter = if following {
            FollowColumn::FollowerId.eq(user_id)
        } else {
            FollowColumn::TeacherId.eq(user_id)
        };
        let paginator = Follows::find()
            .filter(filter)
            .order_by_desc(FollowColumn::CreatedAt)
            .order_by_desc(FollowColumn::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询关注总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询关注页数失败: {e}")))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询关注列表失败: {e}")))?;

        let other = |row: &crate::entity::follows::Model| {
            if following {
                row.teacher_id
            } else {
                row.follower_id
            }
        };
        let users = self.user_summaries(rows.iter().map(other).collect()).await?;

        let items = rows
            .iter()
            .map(|row| {
                let id = other(row);
                FollowEntry {
                    user: users.get(&id).cloned().unwrap_or_else(|| unknown_user(id)),
                    followed_at: chrono::DateTime::<chrono::Utc>::from_timestamp(row.created_at, 0)
                        .unwrap_or_default(),
                }
            })
            .collect();

        Ok(FollowListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_following_impl(
        &self,
        user_id: i64,
        page: u64,
        size: u64,
    ) -> Result<FollowListResponse> {
        self.list_follows(user_id, true, page, size).await
    }

    pub async fn list_followers_impl(
        &self,
        teacher_id: i64,
        page: u64,
        size: u64,
    ) -> Result<FollowListResponse> {
        self.list_follows(teacher_id, false, page, size).await
    }

    pub async fn get_student_dashboard_impl(&self, user_id: i64) -> Result<StudentDashboard> {
        let progresses: Vec<f64> = Enrollments::find()
            .select_only()
            .column(EnrollmentColumn::Progress)
            .filter(EnrollmentColumn::UserId.eq(user_id))
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.to_string()))
            .into_tuple::<f64>()
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询选课进度失败: {e}")))?;

        let favorite_count = FavoriteCourses::find()
            .filter(FavoriteColumn::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计收藏失败: {e}")))?;
        let following_count = Follows::find()
            .filter(FollowColumn::FollowerId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计关注失败: {e}")))?;

        let scores: Vec<f64> = QuizResults::find()
            .select_only()
            .column(ResultColumn::Score)
            .filter(ResultColumn::UserId.eq(user_id))
            .into_tuple::<f64>()
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询测验成绩失败: {e}")))?;

        let payments: Vec<(i64, String)> = Payments::find()
            .select_only()
            .column(PaymentColumn::Amount)
            .column(PaymentColumn::Status)
            .filter(PaymentColumn::UserId.eq(user_id))
            .into_tuple::<(i64, String)>()
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询支付记录失败: {e}")))?;

        let total_spent = payments
            .iter()
            .filter(|(_, s)| s == PaymentStatus::Success.as_str())
            .map(|(amount, _)| amount)
            .sum();
        let pending_payments = payments
            .iter()
            .filter(|(_, s)| {
                s.parse::<PaymentStatus>()
                    .map(|status| status.is_open())
                    .unwrap_or(false)
            })
            .count() as i64;

        let recent_enrollments = self.list_user_enrollments_impl(user_id, 1, 5).await?.items;
        let recent_quiz_results = self.list_user_quiz_results_impl(user_id, 1, 5).await?.items;

        Ok(StudentDashboard {
            enrollment_count: progresses.len() as i64,
            favorite_count: favorite_count as i64,
            following_count: following_count as i64,
            average_progress: average(&progresses),
            completed_courses: progresses.iter().filter(|p| **p >= 100.0).count() as i64,
            in_progress_courses: progresses
                .iter()
                .filter(|p| **p > 0.0 && **p < 100.0)
                .count() as i64,
            not_started_courses: progresses.iter().filter(|p| **p <= 0.0).count() as i64,
            quiz_count: scores.len() as i64,
            average_quiz_score: average(&scores),
            total_spent,
            pending_payments,
            recent_enrollments,
            recent_quiz_results,
        })
    }

    /// 课程的有效学员
    pub async fn list_enrolled_student_ids_impl(&self, course_id: i64) -> Result<Vec<i64>> {
        Enrollments::find()
            .select_only()
            .column(EnrollmentColumn::UserId)
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.to_string()))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课程学员失败: {e}")))
    }

    pub async fn list_follower_ids_impl(&self, teacher_id: i64) -> Result<Vec<i64>> {
        Follows::find()
            .select_only()
            .column(FollowColumn::FollowerId)
            .filter(FollowColumn::TeacherId.eq(teacher_id))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询关注者失败: {e}")))
    }

    pub async fn list_teacher_student_ids_impl(&self, teacher_id: i64) -> Result<Vec<i64>> {
        let course_ids: Vec<i64> = Courses::find()
            .select_only()
            .column(CourseColumn::Id)
            .filter(CourseColumn::TeacherId.eq(teacher_id))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询教师课程失败: {e}")))?;

        let mut ids: Vec<i64> = Enrollments::find()
            .select_only()
            .column(EnrollmentColumn::UserId)
            .filter(EnrollmentColumn::CourseId.is_in(course_ids))
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.to_string()))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询教师学员失败: {e}")))?;
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}

/// 保留两位小数的平均值，空集为 0
pub(super) fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    (avg * 100.0).round() / 100.0
}
