//! 课程存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::categories::{Column as CategoryColumn, Entity as Categories};
use crate::entity::course_categories::{
    ActiveModel as LinkActiveModel, Column as LinkColumn, Entity as CourseCategories,
};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses, Model as CourseModel};
use crate::entity::enrollments::{Column as EnrollmentColumn, Entity as Enrollments};
use crate::entity::favorite_courses::{Column as FavoriteColumn, Entity as FavoriteCourses};
use crate::entity::lesson_progress::{Column as ProgressColumn, Entity as LessonProgress};
use crate::entity::lessons::{Column as LessonColumn, Entity as Lessons};
use crate::entity::payments::{Column as PaymentColumn, Entity as Payments};
use crate::entity::questions::{Column as QuestionColumn, Entity as Questions};
use crate::entity::quiz_results::{Column as ResultColumn, Entity as QuizResults};
use crate::entity::quizzes::{Column as QuizColumn, Entity as Quizzes};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{LearnHubError, Result};
use crate::models::{
    PaginationInfo,
    categories::Category,
    courses::{
        entities::{Course, CourseCounts, CourseDeleteOutcome, CourseSort, CourseSummary},
        requests::{CourseListQuery, CourseUpdate, NewCourse},
        responses::CourseListResponse,
    },
    learning::EnrollmentStatus,
    payments::PaymentStatus,
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};

/// 写入课程分类关联（先删后插）
async fn replace_course_categories<C: ConnectionTrait>(
    conn: &C,
    course_id: i64,
    category_ids: &[i64],
) -> std::result::Result<(), DbErr> {
    CourseCategories::delete_many()
        .filter(LinkColumn::CourseId.eq(course_id))
        .exec(conn)
        .await?;

    let mut unique: Vec<i64> = category_ids.to_vec();
    unique.sort_unstable();
    unique.dedup();
    if unique.is_empty() {
        return Ok(());
    }

    let links = unique.into_iter().map(|category_id| LinkActiveModel {
        course_id: Set(course_id),
        category_id: Set(category_id),
        ..Default::default()
    });
    CourseCategories::insert_many(links).exec(conn).await?;
    Ok(())
}

impl SeaOrmStorage {
    /// 创建课程及其分类关联
    pub async fn create_course_impl(&self, course: NewCourse) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let created = self
            .db
            .transaction::<_, CourseModel, DbErr>(|txn| {
                Box::pin(async move {
                    let model = ActiveModel {
                        teacher_id: Set(course.teacher_id),
                        title: Set(course.title),
                        description: Set(course.description),
                        price: Set(course.price),
                        thumbnail_url: Set(course.thumbnail_url),
                        status: Set(course.status.to_string()),
                        reject_reason: Set(None),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    replace_course_categories(txn, model.id, &course.category_ids).await?;
                    Ok(model)
                })
            })
            .await
            .map_err(|e| LearnHubError::database_operation(format!("创建课程失败: {e}")))?;

        Ok(created.into_course())
    }

    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    async fn filtered_courses(&self, query: &CourseListQuery) -> Result<Select<Courses>> {
        let mut select = Courses::find();

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }
        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }
        if let Some(category_id) = query.category_id {
            let course_ids: Vec<i64> = CourseCategories::find()
                .select_only()
                .column(LinkColumn::CourseId)
                .filter(LinkColumn::CategoryId.eq(category_id))
                .into_tuple::<i64>()
                .all(&self.db)
                .await
                .map_err(|e| LearnHubError::database_operation(format!("查询分类课程失败: {e}")))?;
            select = select.filter(Column::Id.is_in(course_ids));
        }

        // 标题或教师姓名
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            let teacher_ids: Vec<i64> = Users::find()
                .select_only()
                .column(UserColumn::Id)
                .filter(UserColumn::FullName.contains(&escaped))
                .into_tuple::<i64>()
                .all(&self.db)
                .await
                .map_err(|e| LearnHubError::database_operation(format!("查询教师失败: {e}")))?;
            select = select.filter(
                Condition::any()
                    .add(Column::Title.contains(&escaped))
                    .add(Column::TeacherId.is_in(teacher_ids)),
            );
        }

        // 标题或简介
        if let Some(ref text) = query.text_search
            && !text.trim().is_empty()
        {
            let escaped = escape_like_pattern(text.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Title.contains(&escaped))
                    .add(Column::Description.contains(&escaped)),
            );
        }

        Ok(select)
    }

    /// 各课程的有效选课人数
    pub(crate) async fn active_enrollment_counts(
        &self,
        course_ids: Vec<i64>,
    ) -> Result<HashMap<i64, i64>> {
        if course_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = Enrollments::find()
            .select_only()
            .column(EnrollmentColumn::CourseId)
            .column_as(EnrollmentColumn::Id.count(), "enrollment_count")
            .filter(EnrollmentColumn::CourseId.is_in(course_ids))
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.to_string()))
            .group_by(EnrollmentColumn::CourseId)
            .into_tuple::<(i64, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计选课人数失败: {e}")))?;

        Ok(rows.into_iter().collect())
    }

    /// 附上教师姓名与选课人数
    pub(crate) async fn summarize_courses(
        &self,
        courses: Vec<Course>,
    ) -> Result<Vec<CourseSummary>> {
        let teachers = self
            .user_summaries(courses.iter().map(|c| c.teacher_id).collect())
            .await?;
        let counts = self
            .active_enrollment_counts(courses.iter().map(|c| c.id).collect())
            .await?;

        Ok(courses
            .into_iter()
            .map(|course| CourseSummary {
                teacher_name: teachers
                    .get(&course.teacher_id)
                    .map(|t| t.full_name.clone())
                    .unwrap_or_default(),
                enrollment_count: counts.get(&course.id).copied().unwrap_or(0),
                course,
            })
            .collect())
    }

    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);
        let select = self.filtered_courses(&query).await?;

        if query.sort == CourseSort::Popular {
            // 按选课人数排序需要先取全部候选
            let all: Vec<Course> = select
                .order_by_desc(Column::CreatedAt)
                .all(&self.db)
                .await
                .map_err(|e| LearnHubError::database_operation(format!("查询课程列表失败: {e}")))?
                .into_iter()
                .map(|m| m.into_course())
                .collect();
            let counts = self
                .active_enrollment_counts(all.iter().map(|c| c.id).collect())
                .await?;

            let mut ranked = all;
            ranked.sort_by_key(|c| std::cmp::Reverse(counts.get(&c.id).copied().unwrap_or(0)));

            let total = ranked.len() as u64;
            let pages = total.div_ceil(size);
            let items: Vec<Course> = ranked
                .into_iter()
                .skip(((page - 1) * size) as usize)
                .take(size as usize)
                .collect();

            return Ok(CourseListResponse {
                items: self.summarize_courses(items).await?,
                pagination: PaginationInfo::new(page, size, total, pages),
            });
        }

        let select = match query.sort {
            CourseSort::Title => select.order_by_asc(Column::Title),
            _ => select.order_by_desc(Column::CreatedAt),
        }
        .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课程总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课程页数失败: {e}")))?;
        let courses: Vec<Course> = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课程列表失败: {e}")))?
            .into_iter()
            .map(|m| m.into_course())
            .collect();

        Ok(CourseListResponse {
            items: self.summarize_courses(courses).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新课程字段，category_ids 为 Some 时整体替换分类
    pub async fn update_course_impl(
        &self,
        id: i64,
        update: CourseUpdate,
    ) -> Result<Option<Course>> {
        let Some(existing) = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课程失败: {e}")))?
        else {
            return Ok(None);
        };

        let updated = self
            .db
            .transaction::<_, CourseModel, DbErr>(|txn| {
                Box::pin(async move {
                    let mut model: ActiveModel = existing.into();
                    if let Some(title) = update.title {
                        model.title = Set(title);
                    }
                    if let Some(description) = update.description {
                        model.description = Set(description);
                    }
                    if let Some(price) = update.price {
                        model.price = Set(price);
                    }
                    if let Some(thumbnail_url) = update.thumbnail_url {
                        model.thumbnail_url = Set(Some(thumbnail_url).filter(|u| !u.is_empty()));
                    }
                    if let Some(teacher_id) = update.teacher_id {
                        model.teacher_id = Set(teacher_id);
                    }
                    if let Some(status) = update.status {
                        model.status = Set(status.to_string());
                    }
                    if let Some(reason) = update.reject_reason {
                        model.reject_reason = Set(reason);
                    }
                    model.updated_at = Set(chrono::Utc::now().timestamp());
                    let saved = model.update(txn).await?;

                    if let Some(ref category_ids) = update.category_ids {
                        replace_course_categories(txn, id, category_ids).await?;
                    }
                    Ok(saved)
                })
            })
            .await
            .map_err(|e| LearnHubError::database_operation(format!("更新课程失败: {e}")))?;

        Ok(Some(updated.into_course()))
    }

    /// 删除课程及其全部下属数据；有成功支付时拒绝
    pub async fn delete_course_impl(&self, id: i64) -> Result<CourseDeleteOutcome> {
        self.db
            .transaction::<_, CourseDeleteOutcome, DbErr>(|txn| {
                Box::pin(async move {
                    if Courses::find_by_id(id).one(txn).await?.is_none() {
                        return Ok(CourseDeleteOutcome::NotFound);
                    }

                    let paid = Payments::find()
                        .filter(PaymentColumn::CourseId.eq(id))
                        .filter(PaymentColumn::Status.eq(PaymentStatus::Success.to_string()))
                        .count(txn)
                        .await?;
                    if paid > 0 {
                        return Ok(CourseDeleteOutcome::HasPayments);
                    }

                    let lesson_ids: Vec<i64> = Lessons::find()
                        .select_only()
                        .column(LessonColumn::Id)
                        .filter(LessonColumn::CourseId.eq(id))
                        .into_tuple::<i64>()
                        .all(txn)
                        .await?;
                    let quiz_ids: Vec<i64> = Quizzes::find()
                        .select_only()
                        .column(QuizColumn::Id)
                        .filter(QuizColumn::CourseId.eq(id))
                        .into_tuple::<i64>()
                        .all(txn)
                        .await?;

                    LessonProgress::delete_many()
                        .filter(ProgressColumn::LessonId.is_in(lesson_ids))
                        .exec(txn)
                        .await?;
                    QuizResults::delete_many()
                        .filter(ResultColumn::QuizId.is_in(quiz_ids.clone()))
                        .exec(txn)
                        .await?;
                    Questions::delete_many()
                        .filter(QuestionColumn::QuizId.is_in(quiz_ids))
                        .exec(txn)
                        .await?;
                    Quizzes::delete_many()
                        .filter(QuizColumn::CourseId.eq(id))
                        .exec(txn)
                        .await?;
                    Lessons::delete_many()
                        .filter(LessonColumn::CourseId.eq(id))
                        .exec(txn)
                        .await?;
                    Enrollments::delete_many()
                        .filter(EnrollmentColumn::CourseId.eq(id))
                        .exec(txn)
                        .await?;
                    FavoriteCourses::delete_many()
                        .filter(FavoriteColumn::CourseId.eq(id))
                        .exec(txn)
                        .await?;
                    Payments::delete_many()
                        .filter(PaymentColumn::CourseId.eq(id))
                        .exec(txn)
                        .await?;
                    CourseCategories::delete_many()
                        .filter(LinkColumn::CourseId.eq(id))
                        .exec(txn)
                        .await?;
                    Courses::delete_by_id(id).exec(txn).await?;

                    Ok(CourseDeleteOutcome::Deleted)
                })
            })
            .await
            .map_err(|e| LearnHubError::database_operation(format!("删除课程失败: {e}")))
    }

    pub async fn get_course_categories_impl(&self, course_id: i64) -> Result<Vec<Category>> {
        let category_ids: Vec<i64> = CourseCategories::find()
            .select_only()
            .column(LinkColumn::CategoryId)
            .filter(LinkColumn::CourseId.eq(course_id))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课程分类失败: {e}")))?;
        if category_ids.is_empty() {
            return Ok(Vec::new());
        }

        let categories = Categories::find()
            .filter(CategoryColumn::Id.is_in(category_ids))
            .order_by_asc(CategoryColumn::Name)
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课程分类失败: {e}")))?;

        Ok(categories.into_iter().map(|m| m.into_category()).collect())
    }

    pub async fn get_course_counts_impl(&self, course_id: i64) -> Result<CourseCounts> {
        let lesson_count = Lessons::find()
            .filter(LessonColumn::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计课时失败: {e}")))?;
        let quiz_count = Quizzes::find()
            .filter(QuizColumn::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计测验失败: {e}")))?;
        let enrollment_count = Enrollments::find()
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计选课失败: {e}")))?;

        Ok(CourseCounts {
            lesson_count: lesson_count as i64,
            quiz_count: quiz_count as i64,
            enrollment_count: enrollment_count as i64,
        })
    }
}
