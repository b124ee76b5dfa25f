//! 课时存储操作

use super::SeaOrmStorage;
use crate::entity::lesson_progress::{Column as ProgressColumn, Entity as LessonProgress};
use crate::entity::lessons::{ActiveModel, Column, Entity as Lessons};
use crate::errors::{LearnHubError, Result};
use crate::models::courses::{
    entities::Lesson,
    requests::{CreateLessonRequest, UpdateLessonRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建课时，未指定位置时追加到末尾
    pub async fn create_lesson_impl(
        &self,
        course_id: i64,
        lesson: CreateLessonRequest,
    ) -> Result<Lesson> {
        let position = match lesson.position {
            Some(p) => p,
            None => {
                let max: Option<Option<i32>> = Lessons::find()
                    .select_only()
                    .column_as(Column::Position.max(), "max_position")
                    .filter(Column::CourseId.eq(course_id))
                    .into_tuple::<Option<i32>>()
                    .one(&self.db)
                    .await
                    .map_err(|e| {
                        LearnHubError::database_operation(format!("查询课时位置失败: {e}"))
                    })?;
                max.flatten().map(|m| m + 1).unwrap_or(1)
            }
        };

        let model = ActiveModel {
            course_id: Set(course_id),
            title: Set(lesson.title),
            content: Set(lesson.content),
            duration_minutes: Set(lesson.duration_minutes),
            video_url: Set(lesson.video_url.filter(|u| !u.trim().is_empty())),
            video_required: Set(lesson.video_required),
            position: Set(position),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("创建课时失败: {e}")))?;

        Ok(result.into_lesson())
    }

    pub async fn get_lesson_by_id_impl(&self, id: i64) -> Result<Option<Lesson>> {
        let result = Lessons::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课时失败: {e}")))?;

        Ok(result.map(|m| m.into_lesson()))
    }

    /// 按位置排序
    pub async fn list_lessons_impl(&self, course_id: i64) -> Result<Vec<Lesson>> {
        let lessons = Lessons::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::Position)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课时列表失败: {e}")))?;

        Ok(lessons.into_iter().map(|m| m.into_lesson()).collect())
    }

    pub async fn update_lesson_impl(
        &self,
        id: i64,
        update: UpdateLessonRequest,
    ) -> Result<Option<Lesson>> {
        let Some(existing) = Lessons::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课时失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(content) = update.content {
            model.content = Set(content);
        }
        if let Some(duration) = update.duration_minutes {
            model.duration_minutes = Set(duration);
        }
        if let Some(video_url) = update.video_url {
            // 空字符串表示清除视频
            model.video_url = Set(Some(video_url).filter(|u| !u.trim().is_empty()));
        }
        if let Some(required) = update.video_required {
            model.video_required = Set(required);
        }
        if let Some(position) = update.position {
            model.position = Set(position);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("更新课时失败: {e}")))?;

        Ok(Some(result.into_lesson()))
    }

    pub async fn delete_lesson_impl(&self, id: i64) -> Result<bool> {
        LessonProgress::delete_many()
            .filter(ProgressColumn::LessonId.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("删除课时进度失败: {e}")))?;

        let result = Lessons::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("删除课时失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
