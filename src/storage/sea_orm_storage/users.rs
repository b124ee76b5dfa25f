//! 用户存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::enrollments::{Column as EnrollmentColumn, Entity as Enrollments};
use crate::entity::follows::{Column as FollowColumn, Entity as Follows};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{LearnHubError, Result};
use crate::models::{
    PaginationInfo,
    users::{
        entities::{User, UserStatus, UserSummary},
        requests::{NewUser, UserListQuery, UserUpdate},
        responses::{UserActivityCounts, UserListResponse},
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Select, Set,
};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, user: NewUser) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            full_name: Set(user.full_name),
            avatar_url: Set(None),
            role: Set(user.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LearnHubError::from_db("创建用户失败", e))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过用户名或邮箱获取用户
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let result = Users::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier)),
            )
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 批量读取用户
    pub(crate) async fn users_by_ids(&self, ids: Vec<i64>) -> Result<HashMap<i64, User>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = Users::find()
            .filter(Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(users.into_iter().map(|m| (m.id, m.into_user())).collect())
    }

    pub(crate) async fn user_summaries(&self, ids: Vec<i64>) -> Result<HashMap<i64, UserSummary>> {
        Ok(self
            .users_by_ids(ids)
            .await?
            .into_iter()
            .map(|(id, user)| (id, user.summary()))
            .collect())
    }

    fn filtered_users(query: &UserListQuery) -> Select<Users> {
        let mut select = Users::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Username.contains(&escaped))
                    .add(Column::Email.contains(&escaped))
                    .add(Column::FullName.contains(&escaped)),
            );
        }

        if let Some(role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id)
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let paginator = Self::filtered_users(&query).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询用户总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询用户页数失败: {e}")))?;
        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_users_for_export_impl(&self, query: UserListQuery) -> Result<Vec<User>> {
        let users = Self::filtered_users(&query)
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("导出用户失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }

    /// 更新用户最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                LearnHubError::database_operation(format!("更新最后登录时间失败: {e}"))
            })?;

        Ok(result.rows_affected > 0)
    }

    /// 更新用户信息
    pub async fn update_user_impl(&self, id: i64, update: UserUpdate) -> Result<Option<User>> {
        if self.get_user_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(email) = update.email {
            model.email = Set(email);
        }
        if let Some(full_name) = update.full_name {
            model.full_name = Set(full_name);
        }
        if let Some(avatar_url) = update.avatar_url {
            model.avatar_url = Set(avatar_url);
        }
        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        if let Some(password_hash) = update.password_hash {
            model.password_hash = Set(password_hash);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| LearnHubError::from_db("更新用户失败", e))?;

        Ok(Some(updated.into_user()))
    }

    /// 删除用户
    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("删除用户失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 批量锁定 / 解锁
    pub async fn set_users_status_impl(
        &self,
        ids: &[i64],
        status: UserStatus,
        skip_id: i64,
    ) -> Result<u64> {
        let targets: Vec<i64> = ids.iter().copied().filter(|id| *id != skip_id).collect();
        if targets.is_empty() {
            return Ok(0);
        }

        let result = Users::update_many()
            .col_expr(
                Column::Status,
                sea_orm::sea_query::Expr::value(status.to_string()),
            )
            .col_expr(
                Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.is_in(targets))
            .exec(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("批量更新用户状态失败: {e}")))?;

        Ok(result.rows_affected)
    }

    /// 统计用户数量
    pub async fn count_users_impl(&self) -> Result<u64> {
        Users::find()
            .count(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计用户数量失败: {e}")))
    }

    /// 选课数、授课数、粉丝数
    pub async fn get_user_activity_counts_impl(&self, id: i64) -> Result<UserActivityCounts> {
        let enrollment_count = Enrollments::find()
            .filter(EnrollmentColumn::UserId.eq(id))
            .count(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计选课失败: {e}")))?;
        let course_count = Courses::find()
            .filter(CourseColumn::TeacherId.eq(id))
            .count(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计课程失败: {e}")))?;
        let follower_count = Follows::find()
            .filter(FollowColumn::TeacherId.eq(id))
            .count(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计关注者失败: {e}")))?;

        Ok(UserActivityCounts {
            enrollment_count: enrollment_count as i64,
            course_count: course_count as i64,
            follower_count: follower_count as i64,
        })
    }
}
