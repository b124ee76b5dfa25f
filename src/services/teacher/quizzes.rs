use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{TeacherService, load_owned_course};
use crate::models::common::pagination::DEFAULT_PAGE_SIZE;
use crate::models::courses::entities::Course;
use crate::models::courses::quiz::{QuestionRequest, Quiz};
use crate::models::courses::requests::{CreateQuizRequest, UpdateQuizRequest};
use crate::models::courses::responses::QuizDetailResponse;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode, PaginationQuery};
use crate::services::notifications::NotificationDispatcher;
use crate::services::{bad_request, current_user, not_found, storage_error};
use crate::storage::Storage;

pub const DEFAULT_QUIZ_MINUTES: i32 = 30;

async fn load_owned_quiz(
    storage: &Arc<dyn Storage>,
    quiz_id: i64,
    user: &User,
) -> Result<(Quiz, Course), HttpResponse> {
    let quiz = match storage.get_quiz_by_id(quiz_id).await {
        Ok(Some(quiz)) => quiz,
        Ok(None) => return Err(not_found(ErrorCode::QuizNotFound, "Quiz not found")),
        Err(e) => return Err(storage_error(e, "查询测验失败")),
    };
    let course = load_owned_course(storage, quiz.course_id, user).await?;
    Ok((quiz, course))
}

fn check_title(title: &str) -> Result<String, HttpResponse> {
    let title = title.trim();
    if title.is_empty() {
        return Err(bad_request(ErrorCode::ValidationFailed, "Quiz title is required"));
    }
    Ok(title.to_string())
}

fn check_duration(minutes: i32) -> Result<i32, HttpResponse> {
    if minutes <= 0 {
        return Err(bad_request(
            ErrorCode::ValidationFailed,
            "Quiz duration must be a positive number of minutes",
        ));
    }
    Ok(minutes)
}

pub async fn list_quizzes(
    service: &TeacherService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_course(&storage, course_id, &user).await {
        return Ok(resp);
    }
    match storage.list_quizzes(course_id).await {
        Ok(quizzes) => Ok(HttpResponse::Ok().json(ApiResponse::success(quizzes, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询测验失败")),
    }
}

/// 测验与题目在同一事务中写入，任一题目不合法则整体失败
pub async fn create_quiz(
    service: &TeacherService,
    course_id: i64,
    body: CreateQuizRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let title = match check_title(&body.title) {
        Ok(title) => title,
        Err(resp) => return Ok(resp),
    };
    let duration = match check_duration(body.duration_minutes.unwrap_or(DEFAULT_QUIZ_MINUTES)) {
        Ok(duration) => duration,
        Err(resp) => return Ok(resp),
    };
    for (index, question) in body.questions.iter().enumerate() {
        if let Err(msg) = question.clone().validate() {
            return Ok(bad_request(
                ErrorCode::ValidationFailed,
                format!("Question {}: {msg}", index + 1),
            ));
        }
    }
    let storage = service.get_storage(request);

    let course = match load_owned_course(&storage, course_id, &user).await {
        Ok(course) => course,
        Err(resp) => return Ok(resp),
    };

    match storage
        .create_quiz(course.id, title, duration, body.questions)
        .await
    {
        Ok((quiz, questions)) => {
            info!(
                "Quiz {} with {} questions added to course {}",
                quiz.id,
                questions.len(),
                course.id
            );
            if course.is_active() {
                NotificationDispatcher::notify_new_quiz(&storage, &course, &quiz).await;
            }
            Ok(HttpResponse::Created().json(ApiResponse::success(
                QuizDetailResponse { quiz, questions },
                "Quiz created",
            )))
        }
        Err(e) => Ok(storage_error(e, "创建测验失败")),
    }
}

/// 含答案，仅课程所有者可见
pub async fn get_quiz(
    service: &TeacherService,
    quiz_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let (quiz, _) = match load_owned_quiz(&storage, quiz_id, &user).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };
    match storage.list_questions(quiz.id).await {
        Ok(questions) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            QuizDetailResponse { quiz, questions },
            "查询成功",
        ))),
        Err(e) => Ok(storage_error(e, "查询题目失败")),
    }
}

pub async fn update_quiz(
    service: &TeacherService,
    quiz_id: i64,
    body: UpdateQuizRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let title = match body.title.as_deref().map(check_title).transpose() {
        Ok(title) => title,
        Err(resp) => return Ok(resp),
    };
    let duration = match body.duration_minutes.map(check_duration).transpose() {
        Ok(duration) => duration,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_quiz(&storage, quiz_id, &user).await {
        return Ok(resp);
    }
    match storage.update_quiz(quiz_id, title, duration).await {
        Ok(Some(quiz)) => Ok(HttpResponse::Ok().json(ApiResponse::success(quiz, "Quiz updated"))),
        Ok(None) => Ok(not_found(ErrorCode::QuizNotFound, "Quiz not found")),
        Err(e) => Ok(storage_error(e, "更新测验失败")),
    }
}

pub async fn delete_quiz(
    service: &TeacherService,
    quiz_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_quiz(&storage, quiz_id, &user).await {
        return Ok(resp);
    }
    match storage.delete_quiz(quiz_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Quiz deleted"))),
        Ok(false) => Ok(not_found(ErrorCode::QuizNotFound, "Quiz not found")),
        Err(e) => Ok(storage_error(e, "删除测验失败")),
    }
}

pub async fn add_question(
    service: &TeacherService,
    quiz_id: i64,
    body: QuestionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let question = match body.validate() {
        Ok(question) => question,
        Err(msg) => return Ok(bad_request(ErrorCode::ValidationFailed, msg)),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_quiz(&storage, quiz_id, &user).await {
        return Ok(resp);
    }
    match storage.add_question(quiz_id, question).await {
        Ok(question) => Ok(HttpResponse::Created().json(ApiResponse::success(question, "Question added"))),
        Err(e) => Ok(storage_error(e, "添加题目失败")),
    }
}

pub async fn delete_question(
    service: &TeacherService,
    question_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let question = match storage.get_question_by_id(question_id).await {
        Ok(Some(question)) => question,
        Ok(None) => return Ok(not_found(ErrorCode::QuestionNotFound, "Question not found")),
        Err(e) => return Ok(storage_error(e, "查询题目失败")),
    };
    if let Err(resp) = load_owned_quiz(&storage, question.quiz_id, &user).await {
        return Ok(resp);
    }
    match storage.delete_question(question_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Question deleted"))),
        Ok(false) => Ok(not_found(ErrorCode::QuestionNotFound, "Question not found")),
        Err(e) => Ok(storage_error(e, "删除题目失败")),
    }
}

pub async fn quiz_results(
    service: &TeacherService,
    quiz_id: i64,
    query: PaginationQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let (page, size) = query.normalized(DEFAULT_PAGE_SIZE);
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_quiz(&storage, quiz_id, &user).await {
        return Ok(resp);
    }
    match storage.list_quiz_results(quiz_id, page, size).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询测验成绩失败")),
    }
}
