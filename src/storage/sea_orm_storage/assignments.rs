//! 作业与提交存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::submissions::{
    ActiveModel as SubmissionActiveModel, Column as SubmissionColumn, Entity as Submissions,
    Model as SubmissionModel,
};
use crate::errors::{LearnHubError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    assignments::{
        Assignment, AssignmentSummary, AssignmentUpdate, MyAssignmentItem, MySubmission,
        NewAssignment, Submission, SubmissionWithStudent,
    },
    users::entities::UserSummary,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

/// 每个学生只保留最高版本
fn latest_per_user(rows: Vec<SubmissionModel>) -> HashMap<(i64, i64), SubmissionModel> {
    let mut latest: HashMap<(i64, i64), SubmissionModel> = HashMap::new();
    for row in rows {
        let key = (row.assignment_id, row.user_id);
        if latest.get(&key).is_none_or(|existing| existing.version < row.version) {
            latest.insert(key, row);
        }
    }
    latest
}

impl SeaOrmStorage {
    pub async fn create_assignment_impl(
        &self,
        course_id: i64,
        assignment: NewAssignment,
    ) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            course_id: Set(course_id),
            title: Set(assignment.title),
            description: Set(assignment.description),
            due_at: Set(assignment.due_at),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| LearnHubError::database_operation(format!("创建作业失败: {e}")))?;

        Ok(model.into_assignment())
    }

    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询作业失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 按截止时间排序，无截止时间的排最后
    pub async fn list_assignments_impl(&self, course_id: i64) -> Result<Vec<AssignmentSummary>> {
        let mut assignments: Vec<Assignment> = Assignments::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询作业列表失败: {e}")))?
            .into_iter()
            .map(|m| m.into_assignment())
            .collect();
        assignments.sort_by_key(|a| (a.due_at.is_none(), a.due_at));

        let ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();
        let rows = Submissions::find()
            .filter(SubmissionColumn::AssignmentId.is_in(ids))
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计提交失败: {e}")))?;

        let mut submitters: HashMap<i64, i64> = HashMap::new();
        let mut graded: HashMap<i64, i64> = HashMap::new();
        for ((assignment_id, _), latest) in latest_per_user(rows) {
            *submitters.entry(assignment_id).or_default() += 1;
            if latest.grade.is_some() {
                *graded.entry(assignment_id).or_default() += 1;
            }
        }

        Ok(assignments
            .into_iter()
            .map(|assignment| AssignmentSummary {
                submitter_count: submitters.get(&assignment.id).copied().unwrap_or(0),
                graded_count: graded.get(&assignment.id).copied().unwrap_or(0),
                assignment,
            })
            .collect())
    }

    pub async fn update_assignment_impl(
        &self,
        id: i64,
        update: AssignmentUpdate,
    ) -> Result<Option<Assignment>> {
        let Some(existing) = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询作业失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(description);
        }
        if let Some(due_at) = update.due_at {
            model.due_at = Set(due_at);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("更新作业失败: {e}")))?;

        Ok(Some(updated.into_assignment()))
    }

    /// 先删提交再删作业，同一事务
    pub async fn delete_assignment_impl(&self, id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("开启事务失败: {e}")))?;

        Submissions::delete_many()
            .filter(SubmissionColumn::AssignmentId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("删除作业提交失败: {e}")))?;
        let result = Assignments::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("删除作业失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 版本号 = 当前最大版本 + 1；并发提交撞上唯一索引时返回 Conflict
    pub async fn create_submission_impl(
        &self,
        assignment: &Assignment,
        user_id: i64,
        content: String,
    ) -> Result<Submission> {
        let now = chrono::Utc::now();

        let max_version = Submissions::find()
            .filter(SubmissionColumn::AssignmentId.eq(assignment.id))
            .filter(SubmissionColumn::UserId.eq(user_id))
            .select_only()
            .column_as(SubmissionColumn::Version.max(), "max_version")
            .into_tuple::<Option<i32>>()
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询最大版本号失败: {e}")))?
            .flatten()
            .unwrap_or(0);

        let model = SubmissionActiveModel {
            assignment_id: Set(assignment.id),
            user_id: Set(user_id),
            version: Set(max_version + 1),
            content: Set(content),
            is_late: Set(assignment.is_past_due(now)),
            submitted_at: Set(now.timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| LearnHubError::from_db("创建提交失败", e))?;

        Ok(model.into_submission())
    }

    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 教师端：全部版本，最新在前
    pub async fn list_assignment_submissions_impl(
        &self,
        assignment_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<SubmissionWithStudent>> {
        let page = page.max(1);
        let size = size.clamp(1, 100);

        let paginator = Submissions::find()
            .filter(SubmissionColumn::AssignmentId.eq(assignment_id))
            .order_by_desc(SubmissionColumn::SubmittedAt)
            .order_by_desc(SubmissionColumn::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询提交总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询提交页数失败: {e}")))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询提交列表失败: {e}")))?;

        let students = self
            .user_summaries(rows.iter().map(|r| r.user_id).collect())
            .await?;
        let items = rows
            .into_iter()
            .map(|row| {
                let student = students.get(&row.user_id).cloned().unwrap_or(UserSummary {
                    id: row.user_id,
                    username: String::new(),
                    full_name: String::new(),
                    avatar_url: None,
                });
                SubmissionWithStudent {
                    submission: row.into_submission(),
                    student,
                }
            })
            .collect();

        Ok(PaginatedResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_user_submissions_impl(
        &self,
        user_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<MySubmission>> {
        let page = page.max(1);
        let size = size.clamp(1, 100);

        let paginator = Submissions::find()
            .filter(SubmissionColumn::UserId.eq(user_id))
            .order_by_desc(SubmissionColumn::SubmittedAt)
            .order_by_desc(SubmissionColumn::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询提交总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询提交页数失败: {e}")))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询提交列表失败: {e}")))?;

        let assignments: HashMap<i64, Assignment> = Assignments::find()
            .filter(Column::Id.is_in(rows.iter().map(|r| r.assignment_id).collect::<Vec<_>>()))
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询作业失败: {e}")))?
            .into_iter()
            .map(|m| (m.id, m.into_assignment()))
            .collect();
        let course_titles: HashMap<i64, String> = Courses::find()
            .filter(
                CourseColumn::Id
                    .is_in(assignments.values().map(|a| a.course_id).collect::<Vec<_>>()),
            )
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课程失败: {e}")))?
            .into_iter()
            .map(|m| (m.id, m.title))
            .collect();

        let items = rows
            .into_iter()
            .map(|row| {
                let assignment = assignments.get(&row.assignment_id);
                let course_id = assignment.map(|a| a.course_id).unwrap_or_default();
                MySubmission {
                    assignment_title: assignment.map(|a| a.title.clone()).unwrap_or_default(),
                    course_id,
                    course_title: course_titles.get(&course_id).cloned().unwrap_or_default(),
                    submission: row.into_submission(),
                }
            })
            .collect();

        Ok(PaginatedResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 学生端：课程作业及自己的最新提交
    pub async fn list_my_assignments_impl(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Vec<MyAssignmentItem>> {
        let assignments = self.list_assignments_impl(course_id).await?;
        let ids: Vec<i64> = assignments.iter().map(|a| a.assignment.id).collect();
        let rows = Submissions::find()
            .filter(SubmissionColumn::AssignmentId.is_in(ids))
            .filter(SubmissionColumn::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询提交失败: {e}")))?;
        let mut latest = latest_per_user(rows);

        Ok(assignments
            .into_iter()
            .map(|summary| MyAssignmentItem {
                latest_submission: latest
                    .remove(&(summary.assignment.id, user_id))
                    .map(|m| m.into_submission()),
                assignment: summary.assignment,
            })
            .collect())
    }

    /// 可重复评分，以最后一次为准
    pub async fn grade_submission_impl(
        &self,
        id: i64,
        grade: f64,
        feedback: Option<String>,
        graded_by: i64,
    ) -> Result<Option<Submission>> {
        let Some(existing) = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询提交失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: SubmissionActiveModel = existing.into();
        model.grade = Set(Some(grade));
        model.feedback = Set(feedback);
        model.graded_by = Set(Some(graded_by));
        model.graded_at = Set(Some(chrono::Utc::now().timestamp()));

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("评分失败: {e}")))?;

        Ok(Some(updated.into_submission()))
    }
}
