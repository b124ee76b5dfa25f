use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::LearningService;
use super::content::accessible_course;
use crate::models::common::pagination::DEFAULT_PAGE_SIZE;
use crate::models::courses::quiz::{NewQuizResult, PublicQuestion, Quiz, grade_answers};
use crate::models::courses::requests::SubmitQuizRequest;
use crate::models::courses::responses::{QuizSubmissionResponse, TakeQuizResponse};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode, PaginationQuery};
use crate::services::{bad_request, current_user, not_found, storage_error};
use crate::storage::Storage;

/// 加载测验并确认可作答，条件同课程内容
async fn accessible_quiz(
    storage: &Arc<dyn Storage>,
    quiz_id: i64,
    user: &User,
) -> Result<Quiz, HttpResponse> {
    let quiz = match storage.get_quiz_by_id(quiz_id).await {
        Ok(Some(quiz)) => quiz,
        Ok(None) => return Err(not_found(ErrorCode::QuizNotFound, "Quiz not found")),
        Err(e) => return Err(storage_error(e, "查询测验失败")),
    };
    accessible_course(storage, quiz.course_id, user).await?;
    Ok(quiz)
}

/// 下发题目，不含答案
pub async fn take_quiz(
    service: &LearningService,
    quiz_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let quiz = match accessible_quiz(&storage, quiz_id, &user).await {
        Ok(quiz) => quiz,
        Err(resp) => return Ok(resp),
    };
    let questions = match storage.list_questions(quiz.id).await {
        Ok(questions) => questions.into_iter().map(PublicQuestion::from).collect(),
        Err(e) => return Ok(storage_error(e, "查询题目失败")),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        TakeQuizResponse { quiz, questions },
        "查询成功",
    )))
}

pub async fn submit_quiz(
    service: &LearningService,
    quiz_id: i64,
    body: SubmitQuizRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let quiz = match accessible_quiz(&storage, quiz_id, &user).await {
        Ok(quiz) => quiz,
        Err(resp) => return Ok(resp),
    };
    let questions = match storage.list_questions(quiz.id).await {
        Ok(questions) => questions,
        Err(e) => return Ok(storage_error(e, "查询题目失败")),
    };
    if questions.is_empty() {
        return Ok(bad_request(ErrorCode::BadRequest, "This quiz has no questions"));
    }

    let (graded, answers) = grade_answers(&questions, &body.answers);
    let new_result = NewQuizResult {
        quiz_id: quiz.id,
        user_id: user.id,
        score: graded.score,
        correct_count: graded.correct_count,
        total_questions: graded.total_questions,
    };

    match storage.create_quiz_result(new_result).await {
        Ok(result) => {
            info!(
                "User {} scored {} on quiz {} ({}/{})",
                user.id, result.score, quiz.id, result.correct_count, result.total_questions
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                QuizSubmissionResponse { result, answers },
                "Quiz submitted",
            )))
        }
        Err(e) => Ok(storage_error(e, "保存测验成绩失败")),
    }
}

pub async fn my_quiz_results(
    service: &LearningService,
    query: PaginationQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let (page, size) = query.normalized(DEFAULT_PAGE_SIZE);
    let storage = service.get_storage(request);

    match storage.list_user_quiz_results(user.id, page, size).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询测验成绩失败")),
    }
}
