pub mod create;
pub mod history;
pub mod status;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::payments::{CreatePaymentRequest, Payment, PaymentHistoryParams};
use crate::models::users::entities::User;
use crate::models::ErrorCode;
use crate::storage::Storage;

use super::{not_found, storage_error};

/// 学生支付：下单、确认转账、取消与历史
pub struct PaymentService {
    storage: Option<Arc<dyn Storage>>,
}

super::service_handles!(PaymentService);

/// 只能操作自己的支付；他人的按不存在处理
pub(crate) async fn load_own_payment(
    storage: &Arc<dyn Storage>,
    payment_id: i64,
    user: &User,
) -> Result<Payment, HttpResponse> {
    match storage.get_payment_by_id(payment_id).await {
        Ok(Some(payment)) if payment.user_id == user.id => Ok(payment),
        Ok(_) => Err(not_found(ErrorCode::PaymentNotFound, "Payment not found")),
        Err(e) => Err(storage_error(e, "查询支付失败")),
    }
}

impl PaymentService {
    pub async fn create_payment(
        &self,
        body: CreatePaymentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_payment(self, body, request).await
    }

    pub async fn confirm_payment(
        &self,
        payment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        status::confirm_payment(self, payment_id, request).await
    }

    pub async fn cancel_payment(
        &self,
        payment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        status::cancel_payment(self, payment_id, request).await
    }

    pub async fn history(
        &self,
        query: PaymentHistoryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        history::history(self, query, request).await
    }

    pub async fn get_payment(
        &self,
        payment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        history::get_payment(self, payment_id, request).await
    }
}
