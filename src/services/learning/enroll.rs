use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::LearningService;
use crate::models::common::pagination::DEFAULT_PAGE_SIZE;
use crate::models::{ApiResponse, ErrorCode, PaginationQuery};
use crate::services::notifications::NotificationDispatcher;
use crate::services::{bad_request, conflict, current_user, not_found, storage_error};

/// 免费课程直接选课；付费课程返回 402，引导走支付流程
pub async fn enroll(
    service: &LearningService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(storage_error(e, "查询课程失败")),
    };
    if !course.is_active() {
        return Ok(bad_request(
            ErrorCode::CourseNotAvailable,
            "This course is not open for enrollment",
        ));
    }

    match storage.get_enrollment(user.id, course.id).await {
        Ok(Some(enrollment)) if enrollment.is_active() => {
            return Ok(conflict(
                ErrorCode::AlreadyEnrolled,
                "You are already enrolled in this course",
            ));
        }
        Ok(_) => {}
        Err(e) => return Ok(storage_error(e, "查询选课记录失败")),
    }

    if !course.is_free() {
        let pointer = serde_json::json!({
            "course_id": course.id,
            "price": course.price,
            "payment_endpoint": "/api/v1/payments",
        });
        return Ok(HttpResponse::PaymentRequired().json(ApiResponse::error(
            ErrorCode::PaymentRequired,
            pointer,
            "This course requires payment before enrollment",
        )));
    }

    match storage.enroll_user(user.id, course.id).await {
        Ok(enrollment) => {
            info!("User {} enrolled in free course {}", user.id, course.id);
            NotificationDispatcher::notify_enrollment_success(&storage, user.id, &course).await;
            Ok(HttpResponse::Created().json(ApiResponse::success(enrollment, "Enrolled successfully")))
        }
        Err(e) => Ok(storage_error(e, "选课失败")),
    }
}

pub async fn my_courses(
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

    match storage.list_user_enrollments(user.id, page, size).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询我的课程失败")),
    }
}
