use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::LearningService;
use crate::models::learning::{CourseProgressResponse, LessonProgressRequest, LessonProgressResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{bad_request, current_user, forbidden, not_found, storage_error};

pub async fn course_progress(
    service: &LearningService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let enrollment = match storage.get_enrollment(user.id, course_id).await {
        Ok(Some(enrollment)) if enrollment.is_active() => enrollment,
        Ok(_) => return Ok(not_found(ErrorCode::NotFound, "You are not enrolled in this course")),
        Err(e) => return Ok(storage_error(e, "查询选课记录失败")),
    };
    let total_lessons = match storage.list_lessons(course_id).await {
        Ok(lessons) => lessons.len() as i64,
        Err(e) => return Ok(storage_error(e, "查询课时失败")),
    };
    let lessons = match storage.list_lesson_progress(user.id, course_id).await {
        Ok(progress) => progress,
        Err(e) => return Ok(storage_error(e, "查询学习进度失败")),
    };
    let completed_lessons = lessons.iter().filter(|p| p.completed).count() as i64;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        CourseProgressResponse {
            enrollment,
            total_lessons,
            completed_lessons,
            lessons,
        },
        "查询成功",
    )))
}

/// 记录课时进度，完成状态一旦置位不会回退
pub async fn record_lesson_progress(
    service: &LearningService,
    lesson_id: i64,
    body: LessonProgressRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if !body.watched_seconds.is_finite() || body.watched_seconds < 0.0 {
        return Ok(bad_request(
            ErrorCode::ValidationFailed,
            "watched_seconds must be a non-negative number",
        ));
    }
    let storage = service.get_storage(request);

    let lesson = match storage.get_lesson_by_id(lesson_id).await {
        Ok(Some(lesson)) => lesson,
        Ok(None) => return Ok(not_found(ErrorCode::LessonNotFound, "Lesson not found")),
        Err(e) => return Ok(storage_error(e, "查询课时失败")),
    };

    match storage.get_enrollment(user.id, lesson.course_id).await {
        Ok(Some(enrollment)) if enrollment.is_active() => {}
        Ok(_) => {
            return Ok(forbidden(
                ErrorCode::Forbidden,
                "You are not enrolled in this course",
            ));
        }
        Err(e) => return Ok(storage_error(e, "查询选课记录失败")),
    }

    match storage
        .record_lesson_progress(user.id, &lesson, body.watched_seconds, body.completed)
        .await
    {
        Ok((lesson_progress, course_progress)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            LessonProgressResponse {
                lesson_progress,
                course_progress,
            },
            "Progress saved",
        ))),
        Err(e) => Ok(storage_error(e, "保存学习进度失败")),
    }
}
