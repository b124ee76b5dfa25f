//! 教师搜索与联想

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::users::{Column, Entity as Users};
use crate::errors::{LearnHubError, Result};
use crate::models::{
    PaginationInfo,
    courses::{
        entities::{Course, CourseStatus},
        responses::{TeacherSearchItem, TeacherSearchResponse, TeacherSuggestion},
    },
    users::entities::{UserRole, UserStatus},
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Select,
};

/// 每位教师附带的热门课程数
const TOP_COURSES: usize = 5;

fn active_teachers(keyword: Option<&str>) -> Select<Users> {
    let mut select = Users::find()
        .filter(Column::Role.eq(UserRole::Teacher.to_string()))
        .filter(Column::Status.eq(UserStatus::Active.to_string()));
    if let Some(keyword) = keyword.map(str::trim).filter(|k| !k.is_empty()) {
        let escaped = escape_like_pattern(keyword);
        select = select.filter(
            Condition::any()
                .add(Column::FullName.contains(&escaped))
                .add(Column::Username.contains(&escaped))
                .add(Column::Email.contains(&escaped)),
        );
    }
    select.order_by_asc(Column::FullName).order_by_asc(Column::Id)
}

impl SeaOrmStorage {
    /// 每位教师的上架课程
    async fn active_courses_by_teacher(
        &self,
        teacher_ids: Vec<i64>,
    ) -> Result<HashMap<i64, Vec<Course>>> {
        let courses = Courses::find()
            .filter(CourseColumn::TeacherId.is_in(teacher_ids))
            .filter(CourseColumn::Status.eq(CourseStatus::Active.to_string()))
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询教师课程失败: {e}")))?;

        let mut grouped: HashMap<i64, Vec<Course>> = HashMap::new();
        for model in courses {
            grouped
                .entry(model.teacher_id)
                .or_default()
                .push(model.into_course());
        }
        Ok(grouped)
    }

    pub async fn search_teachers_impl(
        &self,
        keyword: Option<String>,
        page: u64,
        size: u64,
    ) -> Result<TeacherSearchResponse> {
        let page = page.max(1);
        let size = size.clamp(1, 50);

        let paginator = active_teachers(keyword.as_deref()).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询教师总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询教师页数失败: {e}")))?;
        let teachers = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询教师列表失败: {e}")))?;

        let mut courses = self
            .active_courses_by_teacher(teachers.iter().map(|t| t.id).collect())
            .await?;

        let mut items = Vec::with_capacity(teachers.len());
        for teacher in teachers {
            let own = courses.remove(&teacher.id).unwrap_or_default();
            let active_course_count = own.len() as i64;
            let mut top = self.summarize_courses(own).await?;
            top.sort_by_key(|c| std::cmp::Reverse(c.enrollment_count));
            top.truncate(TOP_COURSES);
            items.push(TeacherSearchItem {
                teacher: teacher.into_user().summary(),
                active_course_count,
                top_courses: top,
            });
        }

        Ok(TeacherSearchResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn suggest_teachers_impl(
        &self,
        term: &str,
        limit: u64,
    ) -> Result<Vec<TeacherSuggestion>> {
        let teachers = active_teachers(Some(term))
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询教师联想失败: {e}")))?;
        let courses = self
            .active_courses_by_teacher(teachers.iter().map(|t| t.id).collect())
            .await?;

        Ok(teachers
            .into_iter()
            .map(|t| TeacherSuggestion {
                active_course_count: courses.get(&t.id).map_or(0, |c| c.len() as i64),
                id: t.id,
                full_name: t.full_name,
                email: t.email,
            })
            .collect())
    }
}
