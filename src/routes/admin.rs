use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::categories::{CategoryListParams, CreateCategoryRequest, UpdateCategoryRequest};
use crate::models::courses::requests::{CourseListParams, CreateCourseRequest, UpdateCourseRequest};
use crate::models::payments::{PaymentExportParams, PaymentListParams};
use crate::models::reports::RevenueReportParams;
use crate::models::system::UpdateSettingRequest;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::{
    BulkLockRequest, CreateUserRequest, UpdateUserRequest, UserExportParams, UserListParams,
};
use crate::models::{IdsRequest, PaginationQuery, ReasonRequest};
use crate::services::AdminService;
use crate::utils::{SafeIDI64, SafeSettingKey};

static ADMIN_SERVICE: Lazy<AdminService> = Lazy::new(AdminService::new_lazy);

// 概览
pub async fn dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.dashboard(&req).await
}

pub async fn system_health(req: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.system_health(&req).await
}

// 课程
pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CourseListParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_courses(query.into_inner(), &req).await
}

pub async fn get_course(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.get_course(id.0, &req).await
}

pub async fn create_course(
    req: HttpRequest,
    body: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.create_course(body.into_inner(), &req).await
}

pub async fn update_course(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateCourseRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .update_course(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_course(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.delete_course(id.0, &req).await
}

pub async fn approve_course(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.approve_course(id.0, &req).await
}

pub async fn reject_course(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<ReasonRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .reject_course(id.0, body.into_inner(), &req)
        .await
}

pub async fn bulk_approve_courses(
    req: HttpRequest,
    body: web::Json<IdsRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .bulk_approve_courses(body.into_inner(), &req)
        .await
}

pub async fn bulk_delete_courses(
    req: HttpRequest,
    body: web::Json<IdsRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .bulk_delete_courses(body.into_inner(), &req)
        .await
}

// 分类
pub async fn list_categories(
    req: HttpRequest,
    query: web::Query<CategoryListParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_categories(query.into_inner(), &req).await
}

pub async fn get_category(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.get_category(id.0, &req).await
}

pub async fn create_category(
    req: HttpRequest,
    body: web::Json<CreateCategoryRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.create_category(body.into_inner(), &req).await
}

pub async fn update_category(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateCategoryRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .update_category(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_category(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.delete_category(id.0, &req).await
}

// 用户；学生与教师共用同一组处理函数，按路径区分角色
pub async fn list_students(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .list_users(UserRole::User, query.into_inner(), &req)
        .await
}

pub async fn list_teachers(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .list_users(UserRole::Teacher, query.into_inner(), &req)
        .await
}

pub async fn get_user(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.get_user(id.0, &req).await
}

pub async fn create_user(
    req: HttpRequest,
    body: web::Json<CreateUserRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.create_user(body.into_inner(), &req).await
}

pub async fn update_user(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateUserRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.update_user(id.0, body.into_inner(), &req).await
}

pub async fn delete_user(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.delete_user(id.0, &req).await
}

pub async fn toggle_lock(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.toggle_lock(id.0, &req).await
}

pub async fn promote(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.promote(id.0, &req).await
}

pub async fn bulk_lock(
    req: HttpRequest,
    body: web::Json<BulkLockRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.bulk_lock(body.into_inner(), &req).await
}

pub async fn export_users(
    req: HttpRequest,
    query: web::Query<UserExportParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.export_users(query.into_inner(), &req).await
}

// 支付
pub async fn list_payments(
    req: HttpRequest,
    query: web::Query<PaymentListParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_payments(query.into_inner(), &req).await
}

pub async fn get_payment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.get_payment(id.0, &req).await
}

pub async fn approve_payment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.approve_payment(id.0, &req).await
}

pub async fn reject_payment(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<ReasonRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .reject_payment(id.0, body.into_inner(), &req)
        .await
}

pub async fn bulk_approve_payments(
    req: HttpRequest,
    body: web::Json<IdsRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .bulk_approve_payments(body.into_inner(), &req)
        .await
}

pub async fn bulk_reject_payments(
    req: HttpRequest,
    body: web::Json<IdsRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .bulk_reject_payments(body.into_inner(), &req)
        .await
}

pub async fn export_payments(
    req: HttpRequest,
    query: web::Query<PaymentExportParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.export_payments(query.into_inner(), &req).await
}

pub async fn cleanup_payments(req: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.cleanup_payments(&req).await
}

// 报表
pub async fn revenue_report(
    req: HttpRequest,
    query: web::Query<RevenueReportParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.revenue_report(query.into_inner(), &req).await
}

pub async fn export_revenue_report(
    req: HttpRequest,
    query: web::Query<RevenueReportParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .export_revenue_report(query.into_inner(), &req)
        .await
}

// 系统
pub async fn list_settings(req: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_settings(&req).await
}

pub async fn update_setting(
    req: HttpRequest,
    key: SafeSettingKey,
    body: web::Json<UpdateSettingRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .update_setting(key.0, body.into_inner(), &req)
        .await
}

pub async fn backup(req: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.backup(&req).await
}

pub async fn list_backups(
    req: HttpRequest,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_backups(query.into_inner(), &req).await
}

// 整个作用域仅管理员可用
pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/admin")
            .wrap(middleware::Compress::default())
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("/dashboard", web::get().to(dashboard))
                    .route("/system/health", web::get().to(system_health))
                    // 课程
                    .route("/courses", web::get().to(list_courses))
                    .route("/courses", web::post().to(create_course))
                    .route("/courses/bulk-approve", web::post().to(bulk_approve_courses))
                    .route("/courses/bulk-delete", web::post().to(bulk_delete_courses))
                    .route("/courses/{id}", web::get().to(get_course))
                    .route("/courses/{id}", web::put().to(update_course))
                    .route("/courses/{id}", web::delete().to(delete_course))
                    .route("/courses/{id}/approve", web::post().to(approve_course))
                    .route("/courses/{id}/reject", web::post().to(reject_course))
                    // 分类
                    .route("/categories", web::get().to(list_categories))
                    .route("/categories", web::post().to(create_category))
                    .route("/categories/{id}", web::get().to(get_category))
                    .route("/categories/{id}", web::put().to(update_category))
                    .route("/categories/{id}", web::delete().to(delete_category))
                    // 用户
                    .route("/students", web::get().to(list_students))
                    .route("/teachers", web::get().to(list_teachers))
                    .route("/users", web::post().to(create_user))
                    .route("/users/export", web::get().to(export_users))
                    .route("/users/bulk-lock", web::post().to(bulk_lock))
                    .route("/users/{id}", web::get().to(get_user))
                    .route("/users/{id}", web::put().to(update_user))
                    .route("/users/{id}", web::delete().to(delete_user))
                    .route("/users/{id}/toggle-lock", web::post().to(toggle_lock))
                    .route("/users/{id}/promote", web::post().to(promote))
                    // 支付
                    .route("/payments", web::get().to(list_payments))
                    .route("/payments/export", web::get().to(export_payments))
                    .route("/payments/bulk-approve", web::post().to(bulk_approve_payments))
                    .route("/payments/bulk-reject", web::post().to(bulk_reject_payments))
                    .route("/payments/cleanup", web::post().to(cleanup_payments))
                    .route("/payments/{id}", web::get().to(get_payment))
                    .route("/payments/{id}/approve", web::post().to(approve_payment))
                    .route("/payments/{id}/reject", web::post().to(reject_payment))
                    // 报表
                    .route("/reports/revenue", web::get().to(revenue_report))
                    .route("/reports/revenue/export", web::get().to(export_revenue_report))
                    // 系统
                    .route("/settings", web::get().to(list_settings))
                    .route("/settings/{key}", web::put().to(update_setting))
                    .route("/backups", web::get().to(list_backups))
                    .route("/backups", web::post().to(backup)),
            ),
    );
}
