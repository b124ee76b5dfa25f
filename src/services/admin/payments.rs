use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Days, Utc};
use tracing::{info, warn};

use super::AdminService;
use crate::config::AppConfig;
use crate::models::common::pagination::ADMIN_PAGE_SIZE;
use crate::models::payments::{
    CleanupResponse, PaymentApproval, PaymentApprovalResponse, PaymentDetail,
    PaymentExportParams, PaymentListParams, PaymentListQuery, PaymentStatus, PaymentTransition,
};
use crate::models::{ApiResponse, BulkOperationResponse, ErrorCode, IdsRequest, ReasonRequest};
use crate::services::export::{self, Sheet};
use crate::services::notifications::NotificationDispatcher;
use crate::services::{bad_request, conflict, current_user, not_found, storage_error};
use crate::storage::Storage;
use crate::utils::date_range::parse_bounds;

const BULK_REJECT_NOTE: &str = "Rejected during bulk review";

pub async fn list_payments(
    service: &AdminService,
    params: PaymentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let (page, size) = params.pagination.normalized(ADMIN_PAGE_SIZE);
    let (from_ts, to_ts) = match parse_bounds(params.from.as_deref(), params.to.as_deref()) {
        Ok(bounds) => bounds,
        Err(e) => return Ok(bad_request(ErrorCode::ValidationFailed, e.message())),
    };
    let storage = service.get_storage(request);

    let query = PaymentListQuery {
        page,
        size,
        status: params.status,
        search: params.search,
        from_ts,
        to_ts,
        user_id: None,
    };
    match storage.list_payments_with_pagination(query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询支付列表失败")),
    }
}

pub async fn get_payment(
    service: &AdminService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_payment_detail(id).await {
        Ok(Some(detail)) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "查询成功"))),
        Ok(None) => Ok(not_found(ErrorCode::PaymentNotFound, "Payment not found")),
        Err(e) => Ok(storage_error(e, "查询支付详情失败")),
    }
}

/// 审核通过后通知学生选课成功
async fn notify_approved(storage: &std::sync::Arc<dyn Storage>, user_id: i64, course_id: i64) {
    match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => {
            NotificationDispatcher::notify_enrollment_success(storage, user_id, &course).await;
        }
        Ok(None) => warn!("Course {} vanished before enrollment notice", course_id),
        Err(e) => warn!("Failed to load course {} for enrollment notice: {}", course_id, e),
    }
}

pub async fn approve_payment(
    service: &AdminService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let admin = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.approve_payment(id).await {
        Ok(PaymentApproval::Approved {
            payment,
            enrollment,
        }) => {
            info!(
                "Admin {} approved payment {}, enrollment {} active",
                admin.id, payment.id, enrollment.id
            );
            notify_approved(&storage, payment.user_id, payment.course_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                PaymentApprovalResponse {
                    payment,
                    enrollment,
                },
                "Payment approved",
            )))
        }
        Ok(PaymentApproval::NotFound) => Ok(not_found(ErrorCode::PaymentNotFound, "Payment not found")),
        Ok(PaymentApproval::AlreadySucceeded) => Ok(conflict(
            ErrorCode::PaymentAlreadyProcessed,
            "Payment has already been approved",
        )),
        Err(e) => Ok(storage_error(e, "审核支付失败")),
    }
}

pub async fn reject_payment(
    service: &AdminService,
    id: i64,
    body: ReasonRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let admin = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let reason = body.reason.trim().to_string();
    if reason.is_empty() {
        return Ok(bad_request(ErrorCode::ValidationFailed, "A rejection reason is required"));
    }
    let storage = service.get_storage(request);

    match storage
        .transition_payment(
            id,
            PaymentStatus::REJECTABLE,
            PaymentStatus::Rejected,
            Some(reason.clone()),
        )
        .await
    {
        Ok(PaymentTransition::Changed(payment)) => {
            info!("Admin {} rejected payment {}: {}", admin.id, id, reason);
            NotificationDispatcher::notify_payment_update(
                &storage,
                &payment,
                &format!("Your payment was rejected: {reason}"),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(payment, "Payment rejected")))
        }
        Ok(PaymentTransition::Rejected { .. }) => Ok(conflict(
            ErrorCode::PaymentAlreadyProcessed,
            "A successful payment cannot be rejected",
        )),
        Ok(PaymentTransition::NotFound) => {
            Ok(not_found(ErrorCode::PaymentNotFound, "Payment not found"))
        }
        Err(e) => Ok(storage_error(e, "驳回支付失败")),
    }
}

pub async fn bulk_approve(
    service: &AdminService,
    body: IdsRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let mut result = BulkOperationResponse::default();

    for id in body.ids {
        match storage.approve_payment(id).await {
            Ok(PaymentApproval::Approved { payment, .. }) => {
                result.affected += 1;
                notify_approved(&storage, payment.user_id, payment.course_id).await;
            }
            Ok(PaymentApproval::NotFound | PaymentApproval::AlreadySucceeded) => {
                result.skipped.push(id)
            }
            Err(e) => return Ok(storage_error(e, "批量审核支付失败")),
        }
    }

    info!("Bulk approved {} payments", result.affected);
    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Payments approved")))
}

/// 成功支付与不存在的 ID 被跳过
pub async fn bulk_reject(
    service: &AdminService,
    body: IdsRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let mut result = BulkOperationResponse::default();

    for id in body.ids {
        match storage
            .transition_payment(
                id,
                PaymentStatus::REJECTABLE,
                PaymentStatus::Rejected,
                Some(BULK_REJECT_NOTE.to_string()),
            )
            .await
        {
            Ok(PaymentTransition::Changed(payment)) => {
                result.affected += 1;
                NotificationDispatcher::notify_payment_update(
                    &storage,
                    &payment,
                    "Your payment was rejected.",
                )
                .await;
            }
            Ok(PaymentTransition::Rejected { .. } | PaymentTransition::NotFound) => {
                result.skipped.push(id)
            }
            Err(e) => return Ok(storage_error(e, "批量驳回支付失败")),
        }
    }

    info!("Bulk rejected {} payments", result.affected);
    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Payments rejected")))
}

fn payment_sheet(payments: &[PaymentDetail]) -> Sheet {
    let mut sheet = Sheet::new(
        "Payments",
        &[
            "ID",
            "Student",
            "Username",
            "Email",
            "Course",
            "Amount",
            "Method",
            "Status",
            "Note",
            "Paid at",
        ],
    );
    for detail in payments {
        let p = &detail.payment;
        sheet.push(vec![
            p.id.into(),
            detail.full_name.as_str().into(),
            detail.username.as_str().into(),
            detail.email.as_str().into(),
            detail.course_title.as_str().into(),
            p.amount.into(),
            p.method.as_str().into(),
            p.status.as_str().into(),
            p.note.clone().unwrap_or_default().into(),
            p.paid_at.format("%Y-%m-%d %H:%M:%S").to_string().into(),
        ]);
    }
    sheet
}

pub async fn export_payments(
    service: &AdminService,
    params: PaymentExportParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let (from_ts, to_ts) = match parse_bounds(params.from.as_deref(), params.to.as_deref()) {
        Ok(bounds) => bounds,
        Err(e) => return Ok(bad_request(ErrorCode::ValidationFailed, e.message())),
    };
    let storage = service.get_storage(request);

    let query = PaymentListQuery {
        status: params.status,
        from_ts,
        to_ts,
        ..Default::default()
    };
    match storage.list_payments_for_export(query).await {
        Ok(payments) => {
            info!("Exporting {} payments as {}", payments.len(), params.format);
            Ok(export::download("payments", params.format, &[payment_sheet(&payments)]))
        }
        Err(e) => Ok(storage_error(e, "导出支付记录失败")),
    }
}

/// 清理超过保留期的失败支付
pub async fn cleanup(service: &AdminService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let retention_days = AppConfig::get().maintenance.failed_payment_retention_days.max(0) as u64;
    let cutoff = Utc::now()
        .checked_sub_days(Days::new(retention_days))
        .unwrap_or_else(Utc::now)
        .timestamp();
    let storage = service.get_storage(request);

    match storage.delete_failed_payments_before(cutoff).await {
        Ok(deleted) => {
            info!("Removed {} failed payments older than {} days", deleted, retention_days);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                CleanupResponse { deleted },
                "Cleanup finished",
            )))
        }
        Err(e) => Ok(storage_error(e, "清理失败支付失败")),
    }
}
