//! 通知存储操作

use super::SeaOrmStorage;
use crate::entity::notifications::{ActiveModel, Column, Entity as Notifications};
use crate::errors::{LearnHubError, Result};
use crate::models::{
    PaginationInfo,
    notifications::{NewNotification, Notification, NotificationListResponse},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 批量创建通知（单事务）
    pub async fn create_notifications_impl(
        &self,
        items: Vec<NewNotification>,
    ) -> Result<Vec<Notification>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let now = chrono::Utc::now().timestamp();

        self.db
            .transaction::<_, Vec<Notification>, DbErr>(|txn| {
                Box::pin(async move {
                    let mut created = Vec::with_capacity(items.len());
                    for item in items {
                        let model = ActiveModel {
                            user_id: Set(item.user_id),
                            title: Set(item.title),
                            message: Set(item.message),
                            notification_type: Set(item.notification_type.to_string()),
                            related_id: Set(item.related_id),
                            link: Set(item.link),
                            is_read: Set(false),
                            created_at: Set(now),
                            read_at: Set(None),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await?;
                        created.push(model.into_notification());
                    }
                    Ok(created)
                })
            })
            .await
            .map_err(|e| LearnHubError::database_operation(format!("批量创建通知失败: {e}")))
    }

    /// 列出用户通知（分页）
    pub async fn list_notifications_impl(
        &self,
        user_id: i64,
        unread_only: bool,
        page: u64,
        size: u64,
    ) -> Result<NotificationListResponse> {
        let page = page.max(1);
        let size = size.clamp(1, 100);

        let mut select = Notifications::find().filter(Column::UserId.eq(user_id));
        if unread_only {
            select = select.filter(Column::IsRead.eq(false));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询通知总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询通知页数失败: {e}")))?;
        let notifications = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询通知列表失败: {e}")))?;

        Ok(NotificationListResponse {
            items: notifications
                .into_iter()
                .map(|m| m.into_notification())
                .collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn count_unread_notifications_impl(&self, user_id: i64) -> Result<i64> {
        let count = Notifications::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询未读通知数量失败: {e}")))?;

        Ok(count as i64)
    }

    /// 标记通知为已读，仅限本人
    pub async fn mark_notification_read_impl(&self, id: i64, user_id: i64) -> Result<bool> {
        let Some(existing) = Notifications::find_by_id(id)
            .filter(Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询通知失败: {e}")))?
        else {
            return Ok(false);
        };
        if existing.is_read {
            return Ok(true);
        }

        Notifications::update_many()
            .col_expr(Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .col_expr(
                Column::ReadAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("标记通知已读失败: {e}")))?;

        Ok(true)
    }

    pub async fn mark_all_notifications_read_impl(&self, user_id: i64) -> Result<i64> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .col_expr(
                Column::ReadAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("标记全部通知已读失败: {e}")))?;

        Ok(result.rows_affected as i64)
    }

    /// 删除通知，仅限本人
    pub async fn delete_notification_impl(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = Notifications::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("删除通知失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
