use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::payments::{CreatePaymentRequest, PaymentHistoryParams};
use crate::services::PaymentService;
use crate::utils::SafeIDI64;

static PAYMENT_SERVICE: Lazy<PaymentService> = Lazy::new(PaymentService::new_lazy);

pub async fn create_payment(
    req: HttpRequest,
    body: web::Json<CreatePaymentRequest>,
) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE.create_payment(body.into_inner(), &req).await
}

pub async fn history(
    req: HttpRequest,
    query: web::Query<PaymentHistoryParams>,
) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE.history(query.into_inner(), &req).await
}

pub async fn get_payment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE.get_payment(id.0, &req).await
}

pub async fn confirm_payment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE.confirm_payment(id.0, &req).await
}

pub async fn cancel_payment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE.cancel_payment(id.0, &req).await
}

pub fn configure_payment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/payments")
            .wrap(middlewares::RequireJWT)
            .route("", web::post().to(create_payment))
            .route("", web::get().to(history))
            .route("/{id}", web::get().to(get_payment))
            .route("/{id}/confirm", web::post().to(confirm_payment))
            .route("/{id}/cancel", web::post().to(cancel_payment)),
    );
}
