use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{PaymentService, load_own_payment};
use crate::models::payments::{PaymentStatus, PaymentTransition};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{conflict, current_user, not_found, storage_error};

/// 学生声明已转账：pending -> waiting_confirm
pub async fn confirm_payment(
    service: &PaymentService,
    payment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let payment = match load_own_payment(&storage, payment_id, &user).await {
        Ok(payment) => payment,
        Err(resp) => return Ok(resp),
    };

    match storage
        .transition_payment(
            payment.id,
            PaymentStatus::CONFIRMABLE,
            PaymentStatus::WaitingConfirm,
            None,
        )
        .await
    {
        Ok(PaymentTransition::Changed(updated)) => {
            info!("User {} confirmed transfer for payment {}", user.id, updated.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                updated,
                "Payment is waiting for confirmation",
            )))
        }
        Ok(PaymentTransition::Rejected { current }) => Ok(conflict(
            ErrorCode::InvalidStateTransition,
            format!("Cannot confirm a payment that is {current}"),
        )),
        Ok(PaymentTransition::NotFound) => {
            Ok(not_found(ErrorCode::PaymentNotFound, "Payment not found"))
        }
        Err(e) => Ok(storage_error(e, "更新支付状态失败")),
    }
}

/// 仅处理中的支付可取消，取消后置为 failed
pub async fn cancel_payment(
    service: &PaymentService,
    payment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let payment = match load_own_payment(&storage, payment_id, &user).await {
        Ok(payment) => payment,
        Err(resp) => return Ok(resp),
    };

    match storage
        .transition_payment(
            payment.id,
            PaymentStatus::CANCELLABLE,
            PaymentStatus::Failed,
            None,
        )
        .await
    {
        Ok(PaymentTransition::Changed(updated)) => {
            info!("User {} cancelled payment {}", user.id, updated.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "Payment cancelled")))
        }
        Ok(PaymentTransition::Rejected { current }) => Ok(conflict(
            ErrorCode::InvalidStateTransition,
            format!("Cannot cancel a payment that is {current}"),
        )),
        Ok(PaymentTransition::NotFound) => {
            Ok(not_found(ErrorCode::PaymentNotFound, "Payment not found"))
        }
        Err(e) => Ok(storage_error(e, "取消支付失败")),
    }
}
