//! 支付存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use super::learning::ensure_active_enrollment;
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::payments::{ActiveModel, Column, Entity as Payments, Model as PaymentModel};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{LearnHubError, Result};
use crate::models::{
    PaginationInfo,
    payments::{
        Payment, PaymentApproval, PaymentDetail, PaymentListQuery, PaymentListResponse,
        PaymentStatus, PaymentTotals, PaymentTransition,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};

impl SeaOrmStorage {
    pub async fn create_payment_impl(
        &self,
        user_id: i64,
        course_id: i64,
        amount: i64,
        method: String,
    ) -> Result<Payment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            user_id: Set(user_id),
            course_id: Set(course_id),
            amount: Set(amount),
            method: Set(method),
            status: Set(PaymentStatus::Pending.to_string()),
            note: Set(None),
            paid_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| LearnHubError::database_operation(format!("创建支付失败: {e}")))?;

        Ok(model.into_payment())
    }

    pub async fn get_payment_by_id_impl(&self, id: i64) -> Result<Option<Payment>> {
        let result = Payments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询支付失败: {e}")))?;

        Ok(result.map(|m| m.into_payment()))
    }

    /// 附上学生与课程信息
    async fn payment_details(&self, payments: Vec<PaymentModel>) -> Result<Vec<PaymentDetail>> {
        let users = self
            .users_by_ids(payments.iter().map(|p| p.user_id).collect())
            .await?;
        let course_ids: Vec<i64> = payments.iter().map(|p| p.course_id).collect();
        let titles: HashMap<i64, String> = if course_ids.is_empty() {
            HashMap::new()
        } else {
            Courses::find()
                .select_only()
                .column(CourseColumn::Id)
                .column(CourseColumn::Title)
                .filter(CourseColumn::Id.is_in(course_ids))
                .into_tuple::<(i64, String)>()
                .all(&self.db)
                .await
                .map_err(|e| LearnHubError::database_operation(format!("查询课程失败: {e}")))?
                .into_iter()
                .collect()
        };

        Ok(payments
            .into_iter()
            .map(|m| {
                let user = users.get(&m.user_id);
                PaymentDetail {
                    username: user.map(|u| u.username.clone()).unwrap_or_default(),
                    full_name: user.map(|u| u.full_name.clone()).unwrap_or_default(),
                    email: user.map(|u| u.email.clone()).unwrap_or_default(),
                    course_title: titles.get(&m.course_id).cloned().unwrap_or_default(),
                    payment: m.into_payment(),
                }
            })
            .collect())
    }

    pub async fn get_payment_detail_impl(&self, id: i64) -> Result<Option<PaymentDetail>> {
        let Some(model) = Payments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询支付失败: {e}")))?
        else {
            return Ok(None);
        };

        Ok(self.payment_details(vec![model]).await?.pop())
    }

    /// 是否已有成功或处理中的支付
    pub async fn has_blocking_payment_impl(&self, user_id: i64, course_id: i64) -> Result<bool> {
        let count = Payments::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::Status.is_in([
                PaymentStatus::Success.to_string(),
                PaymentStatus::Pending.to_string(),
                PaymentStatus::WaitingConfirm.to_string(),
            ]))
            .count(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询支付记录失败: {e}")))?;

        Ok(count > 0)
    }

    async fn filtered_payments(&self, query: &PaymentListQuery) -> Result<Select<Payments>> {
        let mut select = Payments::find();

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }
        if let Some(user_id) = query.user_id {
            select = select.filter(Column::UserId.eq(user_id));
        }
        if let Some(from_ts) = query.from_ts {
            select = select.filter(Column::PaidAt.gte(from_ts));
        }
        if let Some(to_ts) = query.to_ts {
            select = select.filter(Column::PaidAt.lt(to_ts));
        }

        // 学生姓名、用户名、邮箱或课程标题
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            let user_ids: Vec<i64> = Users::find()
                .select_only()
                .column(UserColumn::Id)
                .filter(
                    Condition::any()
                        .add(UserColumn::Username.contains(&escaped))
                        .add(UserColumn::Email.contains(&escaped))
                        .add(UserColumn::FullName.contains(&escaped)),
                )
                .into_tuple::<i64>()
                .all(&self.db)
                .await
                .map_err(|e| LearnHubError::database_operation(format!("查询用户失败: {e}")))?;
            let course_ids: Vec<i64> = Courses::find()
                .select_only()
                .column(CourseColumn::Id)
                .filter(CourseColumn::Title.contains(&escaped))
                .into_tuple::<i64>()
                .all(&self.db)
                .await
                .map_err(|e| LearnHubError::database_operation(format!("查询课程失败: {e}")))?;

            select = select.filter(
                Condition::any()
                    .add(Column::UserId.is_in(user_ids))
                    .add(Column::CourseId.is_in(course_ids)),
            );
        }

        Ok(select
            .order_by_desc(Column::PaidAt)
            .order_by_desc(Column::Id))
    }

    pub async fn list_payments_with_pagination_impl(
        &self,
        query: PaymentListQuery,
    ) -> Result<PaymentListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let paginator = self.filtered_payments(&query).await?.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询支付总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询支付页数失败: {e}")))?;
        let payments = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询支付列表失败: {e}")))?;

        Ok(PaymentListResponse {
            items: self.payment_details(payments).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_payments_for_export_impl(
        &self,
        query: PaymentListQuery,
    ) -> Result<Vec<PaymentDetail>> {
        let payments = self
            .filtered_payments(&query)
            .await?
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询支付列表失败: {e}")))?;

        self.payment_details(payments).await
    }

    /// 单事务：支付置为 success，并确保存在有效选课
    pub async fn approve_payment_impl(&self, id: i64) -> Result<PaymentApproval> {
        self.db
            .transaction::<_, PaymentApproval, DbErr>(|txn| {
                Box::pin(async move {
                    let Some(payment) = Payments::find_by_id(id).one(txn).await? else {
                        return Ok(PaymentApproval::NotFound);
                    };
                    // 带状态条件写入，并发审核只有一个能成功
                    let updated = Payments::update_many()
                        .col_expr(Column::Status, Expr::value(PaymentStatus::Success.to_string()))
                        .col_expr(Column::Note, Expr::value(Option::<String>::None))
                        .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
                        .filter(Column::Id.eq(id))
                        .filter(Column::Status.ne(PaymentStatus::Success.to_string()))
                        .exec(txn)
                        .await?;
                    if updated.rows_affected == 0 {
                        return Ok(PaymentApproval::AlreadySucceeded);
                    }

                    let user_id = payment.user_id;
                    let course_id = payment.course_id;
                    let Some(saved) = Payments::find_by_id(id).one(txn).await? else {
                        return Ok(PaymentApproval::NotFound);
                    };

                    let enrollment = ensure_active_enrollment(txn, user_id, course_id).await?;

                    Ok(PaymentApproval::Approved {
                        payment: saved.into_payment(),
                        enrollment: enrollment.into_enrollment(),
                    })
                })
            })
            .await
            .map_err(|e| LearnHubError::database_operation(format!("审核支付失败: {e}")))
    }

    /// 仅当当前状态属于 `from` 时更新，判断与写入在同一条 UPDATE 中完成；
    /// note 为 None 时保留原值
    pub async fn transition_payment_impl(
        &self,
        id: i64,
        from: &[PaymentStatus],
        to: PaymentStatus,
        note: Option<String>,
    ) -> Result<PaymentTransition> {
        let mut update = Payments::update_many()
            .col_expr(Column::Status, Expr::value(to.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.is_in(from.iter().map(|s| s.to_string())));
        if let Some(note) = note {
            update = update.col_expr(Column::Note, Expr::value(note));
        }
        let result = update
            .exec(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("更新支付状态失败: {e}")))?;

        let Some(current) = self.get_payment_by_id_impl(id).await? else {
            return Ok(PaymentTransition::NotFound);
        };
        if result.rows_affected == 0 {
            return Ok(PaymentTransition::Rejected {
                current: current.status,
            });
        }
        Ok(PaymentTransition::Changed(current))
    }

    /// 各状态笔数与累计消费
    pub async fn get_payment_totals_impl(&self, user_id: i64) -> Result<PaymentTotals> {
        let rows: Vec<(i64, String)> = Payments::find()
            .select_only()
            .column(Column::Amount)
            .column(Column::Status)
            .filter(Column::UserId.eq(user_id))
            .into_tuple::<(i64, String)>()
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计支付失败: {e}")))?;

        let mut totals = PaymentTotals::default();
        for (amount, status) in rows {
            match status.parse::<PaymentStatus>() {
                Ok(PaymentStatus::Pending) => totals.pending += 1,
                Ok(PaymentStatus::WaitingConfirm) => totals.waiting_confirm += 1,
                Ok(PaymentStatus::Success) => {
                    totals.success += 1;
                    totals.total_spent += amount;
                }
                Ok(PaymentStatus::Failed) => totals.failed += 1,
                Ok(PaymentStatus::Rejected) => totals.rejected += 1,
                Err(_) => {}
            }
        }

        Ok(totals)
    }

    pub async fn delete_failed_payments_before_impl(&self, before_ts: i64) -> Result<u64> {
        let result = Payments::delete_many()
            .filter(Column::Status.eq(PaymentStatus::Failed.to_string()))
            .filter(Column::PaidAt.lt(before_ts))
            .exec(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("清理失败支付失败: {e}")))?;

        Ok(result.rows_affected)
    }
}
