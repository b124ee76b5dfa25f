//! 看板与报表统计

use std::collections::HashMap;

use super::SeaOrmStorage;
use super::learning::average;
use crate::entity::categories::Entity as Categories;
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::enrollments::{Column as EnrollmentColumn, Entity as Enrollments};
use crate::entity::favorite_courses::{Column as FavoriteColumn, Entity as FavoriteCourses};
use crate::entity::follows::{Column as FollowColumn, Entity as Follows};
use crate::entity::lessons::{Column as LessonColumn, Entity as Lessons};
use crate::entity::payments::{Column as PaymentColumn, Entity as Payments};
use crate::entity::quiz_results::{Column as ResultColumn, Entity as QuizResults};
use crate::entity::quizzes::{Column as QuizColumn, Entity as Quizzes};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{LearnHubError, Result};
use crate::models::{
    courses::entities::CourseStatus,
    learning::EnrollmentStatus,
    payments::PaymentStatus,
    reports::{
        AdminDashboard, CoursePerformance, CourseStats, DashboardWindow, HealthCounts,
        HomeStatistics, RecentEnrollment, RevenueEntry, TeacherDashboard,
    },
    users::entities::UserRole,
};
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::IntoCondition,
};

fn db_err(context: &str) -> impl Fn(sea_orm::DbErr) -> LearnHubError + '_ {
    move |e| LearnHubError::database_operation(format!("{context}: {e}"))
}

fn count_of(rows: &[(String, i64)], key: &str) -> i64 {
    rows.iter()
        .find(|(k, _)| k == key)
        .map(|(_, c)| *c)
        .unwrap_or(0)
}

/// 按 course_id 分组计数
async fn grouped_counts<E, C>(
    db: &sea_orm::DatabaseConnection,
    group_col: C,
    id_col: C,
    condition: impl IntoCondition,
) -> std::result::Result<HashMap<i64, i64>, sea_orm::DbErr>
where
    E: EntityTrait<Column = C>,
    C: ColumnTrait,
{
    let rows = E::find()
        .select_only()
        .column(group_col)
        .column_as(id_col.count(), "row_count")
        .filter(condition)
        .group_by(group_col)
        .into_tuple::<(i64, i64)>()
        .all(db)
        .await?;
    Ok(rows.into_iter().collect())
}

impl SeaOrmStorage {
    /// 按状态分组计数
    async fn status_counts_users(&self) -> Result<Vec<(String, i64)>> {
        Users::find()
            .select_only()
            .column(UserColumn::Status)
            .column_as(UserColumn::Id.count(), "row_count")
            .group_by(UserColumn::Status)
            .into_tuple::<(String, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err("统计用户状态失败"))
    }

    async fn status_counts_courses(&self) -> Result<Vec<(String, i64)>> {
        Courses::find()
            .select_only()
            .column(CourseColumn::Status)
            .column_as(CourseColumn::Id.count(), "row_count")
            .group_by(CourseColumn::Status)
            .into_tuple::<(String, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err("统计课程状态失败"))
    }

    async fn status_counts_payments(&self) -> Result<Vec<(String, i64)>> {
        Payments::find()
            .select_only()
            .column(PaymentColumn::Status)
            .column_as(PaymentColumn::Id.count(), "row_count")
            .group_by(PaymentColumn::Status)
            .into_tuple::<(String, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err("统计支付状态失败"))
    }

    /// 成功支付的 (金额, 时间)，可限定课程
    async fn success_payments(&self, course_ids: Option<Vec<i64>>) -> Result<Vec<(i64, i64, i64)>> {
        let mut select = Payments::find()
            .select_only()
            .column(PaymentColumn::CourseId)
            .column(PaymentColumn::Amount)
            .column(PaymentColumn::PaidAt)
            .filter(PaymentColumn::Status.eq(PaymentStatus::Success.to_string()));
        if let Some(ids) = course_ids {
            select = select.filter(PaymentColumn::CourseId.is_in(ids));
        }
        select
            .into_tuple::<(i64, i64, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err("查询成功支付失败"))
    }

    /// 公开首页统计；month_start 为本月起点
    pub async fn get_home_statistics_impl(&self, month_start: i64) -> Result<HomeStatistics> {
        let courses = self.status_counts_courses().await?;
        let active: Vec<(i64, i64)> = Courses::find()
            .select_only()
            .column(CourseColumn::Id)
            .column(CourseColumn::CreatedAt)
            .filter(CourseColumn::Status.eq(CourseStatus::Active.to_string()))
            .into_tuple::<(i64, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err("查询上架课程失败"))?;
        let active_ids: Vec<i64> = active.iter().map(|(id, _)| *id).collect();

        let total_students = Enrollments::find()
            .filter(EnrollmentColumn::CourseId.is_in(active_ids.clone()))
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.to_string()))
            .count(&self.db)
            .await
            .map_err(db_err("统计选课失败"))?;
        let total_lessons = Lessons::find()
            .filter(LessonColumn::CourseId.is_in(active_ids))
            .count(&self.db)
            .await
            .map_err(db_err("统计课时失败"))?;
        let total_teachers = Users::find()
            .filter(UserColumn::Role.eq(UserRole::Teacher.to_string()))
            .count(&self.db)
            .await
            .map_err(db_err("统计教师失败"))?;

        Ok(HomeStatistics {
            total_students: total_students as i64,
            total_courses: courses.iter().map(|(_, c)| c).sum(),
            published_courses: active.len() as i64,
            total_lessons: total_lessons as i64,
            total_teachers: total_teachers as i64,
            new_courses_this_month: active
                .iter()
                .filter(|(_, created)| *created >= month_start)
                .count() as i64,
        })
    }

    pub async fn get_admin_dashboard_impl(&self, window: DashboardWindow) -> Result<AdminDashboard> {
        let roles: Vec<(String, i64)> = Users::find()
            .select_only()
            .column(UserColumn::Role)
            .column_as(UserColumn::Id.count(), "row_count")
            .group_by(UserColumn::Role)
            .into_tuple::<(String, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err("统计用户角色失败"))?;
        let courses = self.status_counts_courses().await?;
        let payments = self.status_counts_payments().await?;

        let total_categories = Categories::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计分类失败"))?;
        let total_enrollments = Enrollments::find()
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.to_string()))
            .count(&self.db)
            .await
            .map_err(db_err("统计选课失败"))?;
        let new_users_this_week = Users::find()
            .filter(UserColumn::CreatedAt.gte(window.week_start))
            .count(&self.db)
            .await
            .map_err(db_err("统计新用户失败"))?;
        let new_courses_this_week = Courses::find()
            .filter(CourseColumn::CreatedAt.gte(window.week_start))
            .count(&self.db)
            .await
            .map_err(db_err("统计新课程失败"))?;

        // 金额在内存中求和，避免不同数据库 SUM 类型差异
        let paid = self.success_payments(None).await?;
        let sum_since = |start: i64| -> i64 {
            paid.iter()
                .filter(|(_, _, at)| *at >= start)
                .map(|(_, amount, _)| amount)
                .sum()
        };

        Ok(AdminDashboard {
            total_users: roles.iter().map(|(_, c)| c).sum(),
            total_teachers: count_of(&roles, UserRole::Teacher.as_str()),
            total_students: count_of(&roles, UserRole::User.as_str()),
            total_categories: total_categories as i64,
            total_courses: courses.iter().map(|(_, c)| c).sum(),
            active_courses: count_of(&courses, CourseStatus::Active.as_str()),
            pending_courses: count_of(&courses, CourseStatus::Pending.as_str()),
            rejected_courses: count_of(&courses, CourseStatus::Rejected.as_str()),
            total_enrollments: total_enrollments as i64,
            total_revenue: paid.iter().map(|(_, amount, _)| amount).sum(),
            revenue_this_month: sum_since(window.month_start),
            revenue_this_week: sum_since(window.week_start),
            pending_payments: count_of(&payments, PaymentStatus::Pending.as_str())
                + count_of(&payments, PaymentStatus::WaitingConfirm.as_str()),
            new_users_this_week: new_users_this_week as i64,
            new_courses_this_week: new_courses_this_week as i64,
        })
    }

    pub async fn get_health_counts_impl(&self) -> Result<HealthCounts> {
        Ok(HealthCounts {
            users: self.status_counts_users().await?,
            courses: self.status_counts_courses().await?,
            payments: self.status_counts_payments().await?,
        })
    }

    /// `[from_ts, to_ts)` 区间内的成功支付
    pub async fn list_revenue_entries_impl(
        &self,
        from_ts: i64,
        to_ts: i64,
        teacher_id: Option<i64>,
    ) -> Result<Vec<RevenueEntry>> {
        let mut course_select = Courses::find();
        if let Some(teacher_id) = teacher_id {
            course_select = course_select.filter(CourseColumn::TeacherId.eq(teacher_id));
        }
        let courses: HashMap<i64, (String, i64)> = course_select
            .select_only()
            .column(CourseColumn::Id)
            .column(CourseColumn::Title)
            .column(CourseColumn::TeacherId)
            .into_tuple::<(i64, String, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err("查询课程失败"))?
            .into_iter()
            .map(|(id, title, teacher)| (id, (title, teacher)))
            .collect();

        let mut payments = Payments::find()
            .select_only()
            .column(PaymentColumn::CourseId)
            .column(PaymentColumn::Amount)
            .column(PaymentColumn::PaidAt)
            .filter(PaymentColumn::Status.eq(PaymentStatus::Success.to_string()))
            .filter(PaymentColumn::PaidAt.gte(from_ts))
            .filter(PaymentColumn::PaidAt.lt(to_ts));
        if teacher_id.is_some() {
            payments = payments.filter(PaymentColumn::CourseId.is_in(courses.keys().copied()));
        }
        let rows = payments
            .order_by_asc(PaymentColumn::PaidAt)
            .into_tuple::<(i64, i64, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err("查询收入记录失败"))?;

        let teachers = self
            .user_summaries(courses.values().map(|(_, t)| *t).collect())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(course_id, amount, paid_at)| {
                let (course_title, teacher_id) = courses.get(&course_id).cloned().unwrap_or_default();
                RevenueEntry {
                    course_id,
                    course_title,
                    teacher_id,
                    teacher_name: teachers
                        .get(&teacher_id)
                        .map(|t| t.full_name.clone())
                        .unwrap_or_default(),
                    amount,
                    paid_at,
                }
            })
            .collect())
    }

    async fn teacher_course_ids(&self, teacher_id: i64) -> Result<Vec<(i64, String, String)>> {
        Courses::find()
            .select_only()
            .column(CourseColumn::Id)
            .column(CourseColumn::Title)
            .column(CourseColumn::Status)
            .filter(CourseColumn::TeacherId.eq(teacher_id))
            .order_by_desc(CourseColumn::CreatedAt)
            .into_tuple::<(i64, String, String)>()
            .all(&self.db)
            .await
            .map_err(db_err("查询教师课程失败"))
    }

    pub async fn get_teacher_dashboard_impl(&self, teacher_id: i64) -> Result<TeacherDashboard> {
        let courses = self.teacher_course_ids(teacher_id).await?;
        let course_ids: Vec<i64> = courses.iter().map(|(id, _, _)| *id).collect();
        let titles: HashMap<i64, String> = courses
            .iter()
            .map(|(id, title, _)| (*id, title.clone()))
            .collect();
        let with_status = |status: CourseStatus| {
            courses
                .iter()
                .filter(|(_, _, s)| s == status.as_str())
                .count() as i64
        };

        let active_students = Enrollments::find()
            .filter(EnrollmentColumn::CourseId.is_in(course_ids.clone()))
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.to_string()))
            .count(&self.db)
            .await
            .map_err(db_err("统计学员失败"))?;
        let follower_count = Follows::find()
            .filter(FollowColumn::TeacherId.eq(teacher_id))
            .count(&self.db)
            .await
            .map_err(db_err("统计关注者失败"))?;
        let total_revenue: i64 = self
            .success_payments(Some(course_ids.clone()))
            .await?
            .iter()
            .map(|(_, amount, _)| amount)
            .sum();

        let recent = Enrollments::find()
            .filter(EnrollmentColumn::CourseId.is_in(course_ids))
            .order_by_desc(EnrollmentColumn::EnrolledAt)
            .order_by_desc(EnrollmentColumn::Id)
            .limit(10)
            .all(&self.db)
            .await
            .map_err(db_err("查询最近选课失败"))?;
        let students = self
            .user_summaries(recent.iter().map(|e| e.user_id).collect())
            .await?;
        let recent_enrollments = recent
            .into_iter()
            .map(|e| RecentEnrollment {
                enrollment_id: e.id,
                student_id: e.user_id,
                student_name: students
                    .get(&e.user_id)
                    .map(|s| s.full_name.clone())
                    .unwrap_or_default(),
                course_id: e.course_id,
                course_title: titles.get(&e.course_id).cloned().unwrap_or_default(),
                enrolled_at: chrono::DateTime::<chrono::Utc>::from_timestamp(e.enrolled_at, 0)
                    .unwrap_or_default(),
            })
            .collect();

        Ok(TeacherDashboard {
            total_courses: courses.len() as i64,
            active_courses: with_status(CourseStatus::Active),
            pending_courses: with_status(CourseStatus::Pending),
            active_students: active_students as i64,
            total_revenue,
            follower_count: follower_count as i64,
            recent_enrollments,
        })
    }

    /// 每门课程的表现，按学员数倒序
    pub async fn list_course_performance_impl(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<CoursePerformance>> {
        let courses = self.teacher_course_ids(teacher_id).await?;
        let course_ids: Vec<i64> = courses.iter().map(|(id, _, _)| *id).collect();
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let lesson_counts = grouped_counts::<Lessons, _>(
            &self.db,
            LessonColumn::CourseId,
            LessonColumn::Id,
            LessonColumn::CourseId.is_in(course_ids.clone()),
        )
        .await
        .map_err(db_err("统计课时失败"))?;
        let quiz_counts = grouped_counts::<Quizzes, _>(
            &self.db,
            QuizColumn::CourseId,
            QuizColumn::Id,
            QuizColumn::CourseId.is_in(course_ids.clone()),
        )
        .await
        .map_err(db_err("统计测验失败"))?;

        let enrollments: Vec<(i64, f64)> = Enrollments::find()
            .select_only()
            .column(EnrollmentColumn::CourseId)
            .column(EnrollmentColumn::Progress)
            .filter(EnrollmentColumn::CourseId.is_in(course_ids.clone()))
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.to_string()))
            .into_tuple::<(i64, f64)>()
            .all(&self.db)
            .await
            .map_err(db_err("查询选课进度失败"))?;
        let mut progress: HashMap<i64, Vec<f64>> = HashMap::new();
        for (course_id, p) in enrollments {
            progress.entry(course_id).or_default().push(p);
        }

        let mut revenue: HashMap<i64, i64> = HashMap::new();
        for (course_id, amount, _) in self.success_payments(Some(course_ids)).await? {
            *revenue.entry(course_id).or_default() += amount;
        }

        let mut rows: Vec<CoursePerformance> = courses
            .into_iter()
            .map(|(id, title, status)| {
                let progresses = progress.get(&id).map(Vec::as_slice).unwrap_or(&[]);
                CoursePerformance {
                    course_id: id,
                    title,
                    status,
                    students: progresses.len() as i64,
                    revenue: revenue.get(&id).copied().unwrap_or(0),
                    average_progress: average(progresses),
                    lesson_count: lesson_counts.get(&id).copied().unwrap_or(0),
                    quiz_count: quiz_counts.get(&id).copied().unwrap_or(0),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.students.cmp(&a.students).then(a.course_id.cmp(&b.course_id)));

        Ok(rows)
    }

    pub async fn get_course_stats_impl(&self, course_id: i64) -> Result<CourseStats> {
        let progresses: Vec<f64> = Enrollments::find()
            .select_only()
            .column(EnrollmentColumn::Progress)
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.to_string()))
            .into_tuple::<f64>()
            .all(&self.db)
            .await
            .map_err(db_err("查询选课进度失败"))?;

        let quiz_ids: Vec<i64> = Quizzes::find()
            .select_only()
            .column(QuizColumn::Id)
            .filter(QuizColumn::CourseId.eq(course_id))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_err("查询测验失败"))?;
        let quiz_count = quiz_ids.len() as i64;
        let scores: Vec<f64> = QuizResults::find()
            .select_only()
            .column(ResultColumn::Score)
            .filter(ResultColumn::QuizId.is_in(quiz_ids))
            .into_tuple::<f64>()
            .all(&self.db)
            .await
            .map_err(db_err("查询测验成绩失败"))?;

        let lesson_count = Lessons::find()
            .filter(LessonColumn::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(db_err("统计课时失败"))?;
        let favorite_count = FavoriteCourses::find()
            .filter(FavoriteColumn::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(db_err("统计收藏失败"))?;
        let revenue: i64 = self
            .success_payments(Some(vec![course_id]))
            .await?
            .iter()
            .map(|(_, amount, _)| amount)
            .sum();

        Ok(CourseStats {
            course_id,
            active_students: progresses.len() as i64,
            completed_students: progresses.iter().filter(|p| **p >= 100.0).count() as i64,
            average_progress: average(&progresses),
            revenue,
            lesson_count: lesson_count as i64,
            quiz_count,
            quiz_attempts: scores.len() as i64,
            average_quiz_score: average(&scores),
            favorite_count: favorite_count as i64,
        })
    }
}
