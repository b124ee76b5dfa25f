//! 课程关注存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::course_follows::{ActiveModel, Column, Entity as CourseFollows};
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::errors::{LearnHubError, Result};
use crate::models::{
    PaginationInfo,
    courses::{
        entities::{Course, CourseStatus},
        responses::CourseListResponse,
    },
    learning::{FollowEntry, FollowListResponse},
    users::entities::UserSummary,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 已关注时返回 false
    pub async fn follow_course_impl(&self, user_id: i64, course_id: i64) -> Result<bool> {
        let existing = CourseFollows::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课程关注失败: {e}")))?;
        if existing.is_some() {
            return Ok(false);
        }

        let inserted = ActiveModel {
            user_id: Set(user_id),
            course_id: Set(course_id),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| LearnHubError::from_db("关注课程失败", e));

        match inserted {
            Ok(_) => Ok(true),
            // 并发重复关注
            Err(e) if e.is_conflict() => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn unfollow_course_impl(&self, user_id: i64, course_id: i64) -> Result<bool> {
        let result = CourseFollows::delete_many()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::CourseId.eq(course_id))
            .exec(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("取消关注课程失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 只列上架课程，按关注时间倒序
    pub async fn list_followed_courses_impl(
        &self,
        user_id: i64,
        page: u64,
        size: u64,
    ) -> Result<CourseListResponse> {
        let page = page.max(1);
        let size = size.clamp(1, 100);

        let active_ids: Vec<i64> = Courses::find()
            .filter(CourseColumn::Status.eq(CourseStatus::Active.to_string()))
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课程失败: {e}")))?
            .into_iter()
            .map(|m| m.id)
            .collect();

        let paginator = CourseFollows::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::CourseId.is_in(active_ids))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询关注总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询关注页数失败: {e}")))?;
        let follows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询关注列表失败: {e}")))?;

        let course_ids: Vec<i64> = follows.iter().map(|f| f.course_id).collect();
        let mut by_id: HashMap<i64, Course> = Courses::find()
            .filter(CourseColumn::Id.is_in(course_ids.clone()))
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课程失败: {e}")))?
            .into_iter()
            .map(|m| (m.id, m.into_course()))
            .collect();
        let ordered: Vec<Course> = course_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();

        Ok(CourseListResponse {
            items: self.summarize_courses(ordered).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_course_followers_impl(
        &self,
        course_id: i64,
        page: u64,
        size: u64,
    ) -> Result<FollowListResponse> {
        let page = page.max(1);
        let size = size.clamp(1, 100);

        let paginator = CourseFollows::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
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

        let users = self
            .user_summaries(rows.iter().map(|r| r.user_id).collect())
            .await?;
        let items = rows
            .iter()
            .map(|row| FollowEntry {
                user: users.get(&row.user_id).cloned().unwrap_or(UserSummary {
                    id: row.user_id,
                    username: String::new(),
                    full_name: String::new(),
                    avatar_url: None,
                }),
                followed_at: chrono::DateTime::<chrono::Utc>::from_timestamp(row.created_at, 0)
                    .unwrap_or_default(),
            })
            .collect();

        Ok(FollowListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }
}
