use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{TeacherService, load_owned_course};
use crate::models::courses::entities::Lesson;
use crate::models::courses::requests::{CreateLessonRequest, UpdateLessonRequest};
use crate::models::courses::responses::LessonListResponse;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::notifications::NotificationDispatcher;
use crate::services::{bad_request, current_user, not_found, storage_error};
use crate::storage::Storage;

/// 加载课时并确认其课程归属
async fn load_owned_lesson(
    storage: &Arc<dyn Storage>,
    lesson_id: i64,
    user: &User,
) -> Result<Lesson, HttpResponse> {
    let lesson = match storage.get_lesson_by_id(lesson_id).await {
        Ok(Some(lesson)) => lesson,
        Ok(None) => return Err(not_found(ErrorCode::LessonNotFound, "Lesson not found")),
        Err(e) => return Err(storage_error(e, "查询课时失败")),
    };
    load_owned_course(storage, lesson.course_id, user).await?;
    Ok(lesson)
}

pub async fn list_lessons(
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
    match storage.list_lessons(course_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            LessonListResponse { items },
            "查询成功",
        ))),
        Err(e) => Ok(storage_error(e, "查询课时失败")),
    }
}

/// 新课时通知选课学生与粉丝（仅已上架课程）
pub async fn create_lesson(
    service: &TeacherService,
    course_id: i64,
    body: CreateLessonRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(msg) = body.validate() {
        return Ok(bad_request(ErrorCode::ValidationFailed, msg));
    }
    let storage = service.get_storage(request);

    let course = match load_owned_course(&storage, course_id, &user).await {
        Ok(course) => course,
        Err(resp) => return Ok(resp),
    };

    match storage.create_lesson(course.id, body).await {
        Ok(lesson) => {
            info!("Lesson {} added to course {}", lesson.id, course.id);
            if course.is_active() {
                NotificationDispatcher::notify_new_lesson(&storage, &course, &lesson).await;
            }
            Ok(HttpResponse::Created().json(ApiResponse::success(lesson, "Lesson created")))
        }
        Err(e) => Ok(storage_error(e, "创建课时失败")),
    }
}

pub async fn update_lesson(
    service: &TeacherService,
    lesson_id: i64,
    body: UpdateLessonRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if body.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Ok(bad_request(ErrorCode::ValidationFailed, "Title is required"));
    }
    if body.duration_minutes.is_some_and(|d| d < 0) {
        return Ok(bad_request(ErrorCode::ValidationFailed, "Duration cannot be negative"));
    }
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_lesson(&storage, lesson_id, &user).await {
        return Ok(resp);
    }
    match storage.update_lesson(lesson_id, body).await {
        Ok(Some(lesson)) => Ok(HttpResponse::Ok().json(ApiResponse::success(lesson, "Lesson updated"))),
        Ok(None) => Ok(not_found(ErrorCode::LessonNotFound, "Lesson not found")),
        Err(e) => Ok(storage_error(e, "更新课时失败")),
    }
}

pub async fn delete_lesson(
    service: &TeacherService,
    lesson_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_lesson(&storage, lesson_id, &user).await {
        return Ok(resp);
    }
    match storage.delete_lesson(lesson_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Lesson deleted"))),
        Ok(false) => Ok(not_found(ErrorCode::LessonNotFound, "Lesson not found")),
        Err(e) => Ok(storage_error(e, "删除课时失败")),
    }
}
