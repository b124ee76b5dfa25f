//! 测验、题目与成绩存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::questions::{
    ActiveModel as QuestionActiveModel, Column as QuestionColumn, Entity as Questions,
};
use crate::entity::quiz_results::{
    ActiveModel as ResultActiveModel, Column as ResultColumn, Entity as QuizResults,
};
use crate::entity::quizzes::{ActiveModel, Column, Entity as Quizzes, Model as QuizModel};
use crate::errors::{LearnHubError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    courses::{
        quiz::{NewQuestion, NewQuizResult, Question, QuestionRequest, Quiz, QuizResult, QuizSummary},
        responses::{MyQuizResult, QuizResultWithStudent},
    },
    users::entities::UserSummary,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionError, TransactionTrait,
};

fn question_model(quiz_id: i64, question: NewQuestion) -> QuestionActiveModel {
    QuestionActiveModel {
        quiz_id: Set(quiz_id),
        question_text: Set(question.question_text),
        option_a: Set(question.option_a),
        option_b: Set(question.option_b),
        option_c: Set(question.option_c),
        option_d: Set(question.option_d),
        correct_answer: Set(question.correct_answer.to_string()),
        ..Default::default()
    }
}

impl SeaOrmStorage {
    /// 单事务创建测验与题目；任一题目校验失败即回滚
    pub async fn create_quiz_impl(
        &self,
        course_id: i64,
        title: String,
        duration_minutes: i32,
        questions: Vec<QuestionRequest>,
    ) -> Result<(Quiz, Vec<Question>)> {
        let now = chrono::Utc::now().timestamp();

        let (quiz, saved) = self
            .db
            .transaction::<_, (QuizModel, Vec<Question>), DbErr>(|txn| {
                Box::pin(async move {
                    let quiz = ActiveModel {
                        course_id: Set(course_id),
                        title: Set(title),
                        duration_minutes: Set(duration_minutes),
                        created_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    let mut saved = Vec::with_capacity(questions.len());
                    for (index, request) in questions.into_iter().enumerate() {
                        let question = request
                            .validate()
                            .map_err(|msg| DbErr::Custom(format!("Question {}: {msg}", index + 1)))?;
                        let model = question_model(quiz.id, question).insert(txn).await?;
                        saved.push(model.into_question());
                    }

                    Ok((quiz, saved))
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Transaction(DbErr::Custom(msg)) => LearnHubError::validation(msg),
                other => LearnHubError::database_operation(format!("创建测验失败: {other}")),
            })?;

        Ok((quiz.into_quiz(), saved))
    }

    pub async fn get_quiz_by_id_impl(&self, id: i64) -> Result<Option<Quiz>> {
        let result = Quizzes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询测验失败: {e}")))?;

        Ok(result.map(|m| m.into_quiz()))
    }

    pub async fn list_quizzes_impl(&self, course_id: i64) -> Result<Vec<QuizSummary>> {
        let quizzes = Quizzes::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询测验列表失败: {e}")))?;

        let ids: Vec<i64> = quizzes.iter().map(|q| q.id).collect();
        let counts: HashMap<i64, i64> = if ids.is_empty() {
            HashMap::new()
        } else {
            Questions::find()
                .select_only()
                .column(QuestionColumn::QuizId)
                .column_as(QuestionColumn::Id.count(), "question_count")
                .filter(QuestionColumn::QuizId.is_in(ids))
                .group_by(QuestionColumn::QuizId)
                .into_tuple::<(i64, i64)>()
                .all(&self.db)
                .await
                .map_err(|e| LearnHubError::database_operation(format!("统计题目数量失败: {e}")))?
                .into_iter()
                .collect()
        };

        Ok(quizzes
            .into_iter()
            .map(|m| {
                let question_count = counts.get(&m.id).copied().unwrap_or(0);
                QuizSummary {
                    quiz: m.into_quiz(),
                    question_count,
                }
            })
            .collect())
    }

    pub async fn update_quiz_impl(
        &self,
        id: i64,
        title: Option<String>,
        duration_minutes: Option<i32>,
    ) -> Result<Option<Quiz>> {
        let Some(existing) = Quizzes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询测验失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(title) = title {
            model.title = Set(title);
        }
        if let Some(duration) = duration_minutes {
            model.duration_minutes = Set(duration);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("更新测验失败: {e}")))?;

        Ok(Some(result.into_quiz()))
    }

    /// 删除测验及其题目与成绩
    pub async fn delete_quiz_impl(&self, id: i64) -> Result<bool> {
        self.db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    QuizResults::delete_many()
                        .filter(ResultColumn::QuizId.eq(id))
                        .exec(txn)
                        .await?;
                    Questions::delete_many()
                        .filter(QuestionColumn::QuizId.eq(id))
                        .exec(txn)
                        .await?;
                    let result = Quizzes::delete_by_id(id).exec(txn).await?;
                    Ok(result.rows_affected > 0)
                })
            })
            .await
            .map_err(|e| LearnHubError::database_operation(format!("删除测验失败: {e}")))
    }

    pub async fn list_questions_impl(&self, quiz_id: i64) -> Result<Vec<Question>> {
        let questions = Questions::find()
            .filter(QuestionColumn::QuizId.eq(quiz_id))
            .order_by_asc(QuestionColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询题目失败: {e}")))?;

        Ok(questions.into_iter().map(|m| m.into_question()).collect())
    }

    pub async fn add_question_impl(&self, quiz_id: i64, question: NewQuestion) -> Result<Question> {
        let result = question_model(quiz_id, question)
            .insert(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("添加题目失败: {e}")))?;

        Ok(result.into_question())
    }

    pub async fn get_question_by_id_impl(&self, id: i64) -> Result<Option<Question>> {
        let result = Questions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询题目失败: {e}")))?;

        Ok(result.map(|m| m.into_question()))
    }

    pub async fn delete_question_impl(&self, id: i64) -> Result<bool> {
        let result = Questions::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("删除题目失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn create_quiz_result_impl(&self, result: NewQuizResult) -> Result<QuizResult> {
        let model = ResultActiveModel {
            quiz_id: Set(result.quiz_id),
            user_id: Set(result.user_id),
            score: Set(result.score),
            correct_count: Set(result.correct_count),
            total_questions: Set(result.total_questions),
            taken_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let saved = model
            .insert(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("保存测验成绩失败: {e}")))?;

        Ok(saved.into_result())
    }

    /// 某测验的全部成绩（教师查看）
    pub async fn list_quiz_results_impl(
        &self,
        quiz_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<QuizResultWithStudent>> {
        let page = page.max(1);
        let size = size.clamp(1, 100);

        let paginator = QuizResults::find()
            .filter(ResultColumn::QuizId.eq(quiz_id))
            .order_by_desc(ResultColumn::TakenAt)
            .order_by_desc(ResultColumn::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询成绩总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询成绩页数失败: {e}")))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询成绩列表失败: {e}")))?;

        let students = self
            .user_summaries(rows.iter().map(|r| r.user_id).collect())
            .await?;

        let items = rows
            .into_iter()
            .map(|m| {
                let student = students.get(&m.user_id).cloned().unwrap_or(UserSummary {
                    id: m.user_id,
                    username: String::new(),
                    full_name: String::new(),
                    avatar_url: None,
                });
                QuizResultWithStudent {
                    result: m.into_result(),
                    student,
                }
            })
            .collect();

        Ok(PaginatedResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 学生自己的成绩，附测验与课程标题
    pub async fn list_user_quiz_results_impl(
        &self,
        user_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<MyQuizResult>> {
        let page = page.max(1);
        let size = size.clamp(1, 100);

        let paginator = QuizResults::find()
            .filter(ResultColumn::UserId.eq(user_id))
            .order_by_desc(ResultColumn::TakenAt)
            .order_by_desc(ResultColumn::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询成绩总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询成绩页数失败: {e}")))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询成绩列表失败: {e}")))?;

        let quiz_ids: Vec<i64> = rows.iter().map(|r| r.quiz_id).collect();
        let quizzes: HashMap<i64, QuizModel> = Quizzes::find()
            .filter(Column::Id.is_in(quiz_ids))
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询测验失败: {e}")))?
            .into_iter()
            .map(|q| (q.id, q))
            .collect();

        let course_ids: Vec<i64> = quizzes.values().map(|q| q.course_id).collect();
        let course_titles: HashMap<i64, String> = Courses::find()
            .select_only()
            .column(CourseColumn::Id)
            .column(CourseColumn::Title)
            .filter(CourseColumn::Id.is_in(course_ids))
            .into_tuple::<(i64, String)>()
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询课程失败: {e}")))?
            .into_iter()
            .collect();

        let items = rows
            .into_iter()
            .map(|m| {
                let (quiz_title, course_id) = quizzes
                    .get(&m.quiz_id)
                    .map(|q| (q.title.clone(), q.course_id))
                    .unwrap_or_default();
                MyQuizResult {
                    result: m.into_result(),
                    quiz_title,
                    course_id,
                    course_title: course_titles.get(&course_id).cloned().unwrap_or_default(),
                }
            })
            .collect();

        Ok(PaginatedResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }
}
