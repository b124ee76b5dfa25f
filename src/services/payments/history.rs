use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{PaymentService, load_own_payment};
use crate::models::common::pagination::DEFAULT_PAGE_SIZE;
use crate::models::payments::{PaymentHistoryParams, PaymentHistoryResponse, PaymentListQuery};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, not_found, storage_error};

pub async fn history(
    service: &PaymentService,
    query: PaymentHistoryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let (page, size) = query.pagination.normalized(DEFAULT_PAGE_SIZE);
    let storage = service.get_storage(request);

    let list = match storage
        .list_payments_with_pagination(PaymentListQuery {
            page,
            size,
            status: query.status,
            user_id: Some(user.id),
            ..Default::default()
        })
        .await
    {
        Ok(list) => list,
        Err(e) => return Ok(storage_error(e, "查询支付记录失败")),
    };

    let totals = match storage.get_payment_totals(user.id).await {
        Ok(totals) => totals,
        Err(e) => return Ok(storage_error(e, "统计支付记录失败")),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        PaymentHistoryResponse {
            items: list.items,
            pagination: list.pagination,
            totals,
        },
        "查询成功",
    )))
}

pub async fn get_payment(
    service: &PaymentService,
    payment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_own_payment(&storage, payment_id, &user).await {
        return Ok(resp);
    }
    match storage.get_payment_detail(payment_id).await {
        Ok(Some(detail)) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "查询成功"))),
        Ok(None) => Ok(not_found(ErrorCode::PaymentNotFound, "Payment not found")),
        Err(e) => Ok(storage_error(e, "查询支付详情失败")),
    }
}
