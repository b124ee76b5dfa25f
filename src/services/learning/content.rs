use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::LearningService;
use crate::models::courses::entities::Course;
use crate::models::learning::{CourseLessonsResponse, LessonDetailResponse, LessonItem};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, forbidden, not_found, storage_error};
use crate::storage::Storage;

/// 课程内容的访问条件：有效选课，或课程所有者 / 管理员
pub(super) async fn accessible_course(
    storage: &Arc<dyn Storage>,
    course_id: i64,
    user: &User,
) -> Result<Course, HttpResponse> {
    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => return Err(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Err(storage_error(e, "查询课程失败")),
    };
    if user.role == UserRole::Admin || course.teacher_id == user.id {
        return Ok(course);
    }
    match storage.get_enrollment(user.id, course_id).await {
        Ok(Some(enrollment)) if enrollment.is_active() => Ok(course),
        Ok(_) => Err(forbidden(
            ErrorCode::Forbidden,
            "You must be enrolled in this course",
        )),
        Err(e) => Err(storage_error(e, "查询选课记录失败")),
    }
}

/// 课时全文列表，附带当前用户的完成状态
pub async fn course_lessons(
    service: &LearningService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let course = match accessible_course(&storage, course_id, &user).await {
        Ok(course) => course,
        Err(resp) => return Ok(resp),
    };
    let lessons = match storage.list_lessons(course.id).await {
        Ok(lessons) => lessons,
        Err(e) => return Ok(storage_error(e, "查询课时失败")),
    };
    let progress = match storage.list_lesson_progress(user.id, course.id).await {
        Ok(progress) => progress,
        Err(e) => return Ok(storage_error(e, "查询学习进度失败")),
    };

    let items = lessons
        .into_iter()
        .map(|lesson| {
            let completed = progress
                .iter()
                .any(|p| p.lesson_id == lesson.id && p.completed);
            LessonItem { lesson, completed }
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        CourseLessonsResponse {
            course_id: course.id,
            items,
        },
        "查询成功",
    )))
}

pub async fn lesson_detail(
    service: &LearningService,
    lesson_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let lesson = match storage.get_lesson_by_id(lesson_id).await {
        Ok(Some(lesson)) => lesson,
        Ok(None) => return Ok(not_found(ErrorCode::LessonNotFound, "Lesson not found")),
        Err(e) => return Ok(storage_error(e, "查询课时失败")),
    };
    if let Err(resp) = accessible_course(&storage, lesson.course_id, &user).await {
        return Ok(resp);
    }
    // 只返回调用者自己的进度
    let progress = match storage.list_lesson_progress(user.id, lesson.course_id).await {
        Ok(list) => list.into_iter().find(|p| p.lesson_id == lesson.id),
        Err(e) => return Ok(storage_error(e, "查询学习进度失败")),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        LessonDetailResponse { lesson, progress },
        "查询成功",
    )))
}

pub async fn course_quizzes(
    service: &LearningService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let course = match accessible_course(&storage, course_id, &user).await {
        Ok(course) => course,
        Err(resp) => return Ok(resp),
    };
    match storage.list_quizzes(course.id).await {
        Ok(quizzes) => Ok(HttpResponse::Ok().json(ApiResponse::success(quizzes, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询测验失败")),
    }
}
