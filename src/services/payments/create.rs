use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::PaymentService;
use crate::models::payments::{CreatePaymentRequest, DEFAULT_PAYMENT_METHOD};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{bad_request, conflict, current_user, not_found, storage_error};

const MAX_METHOD_LENGTH: usize = 50;

/// 为付费课程创建待支付订单，金额取课程当前价格
pub async fn create_payment(
    service: &PaymentService,
    body: CreatePaymentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let method = match body.method.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_PAYMENT_METHOD.to_string(),
        Some(m) if m.chars().count() > MAX_METHOD_LENGTH => {
            return Ok(bad_request(
                ErrorCode::ValidationFailed,
                format!("Payment method must be at most {MAX_METHOD_LENGTH} characters"),
            ));
        }
        Some(m) => m.to_string(),
    };

    let storage = service.get_storage(request);

    let course = match storage.get_course_by_id(body.course_id).await {
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
    if course.is_free() {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            "This course is free, enroll directly",
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

    match storage.has_blocking_payment(user.id, course.id).await {
        Ok(true) => {
            return Ok(conflict(
                ErrorCode::PaymentAlreadyOpen,
                "A payment for this course is already in progress or completed",
            ));
        }
        Ok(false) => {}
        Err(e) => return Ok(storage_error(e, "查询支付记录失败")),
    }

    match storage
        .create_payment(user.id, course.id, course.price, method)
        .await
    {
        Ok(payment) => {
            info!(
                "User {} opened payment {} for course {} ({})",
                user.id, payment.id, course.id, payment.amount
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(payment, "Payment created")))
        }
        Err(e) => Ok(storage_error(e, "创建支付失败")),
    }
}
