pub mod categories;
pub mod courses;
pub mod dashboard;
pub mod maintenance;
pub mod payments;
pub mod reports;
pub mod settings;
pub mod users;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

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
use crate::storage::Storage;

/// 管理后台
pub struct AdminService {
    storage: Option<Arc<dyn Storage>>,
}

super::service_handles!(AdminService);

impl AdminService {
    // 看板
    pub async fn dashboard(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        dashboard::dashboard(self, request).await
    }

    pub async fn system_health(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        dashboard::system_health(self, request).await
    }

    // 课程
    pub async fn list_courses(
        &self,
        params: CourseListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::list_courses(self, params, request).await
    }

    pub async fn get_course(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        courses::get_course(self, id, request).await
    }

    pub async fn create_course(
        &self,
        body: CreateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::create_course(self, body, request).await
    }

    pub async fn update_course(
        &self,
        id: i64,
        body: UpdateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::update_course(self, id, body, request).await
    }

    pub async fn delete_course(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        courses::delete_course(self, id, request).await
    }

    pub async fn approve_course(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        courses::approve_course(self, id, request).await
    }

    pub async fn reject_course(
        &self,
        id: i64,
        body: ReasonRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::reject_course(self, id, body, request).await
    }

    pub async fn bulk_approve_courses(
        &self,
        body: IdsRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::bulk_approve(self, body, request).await
    }

    pub async fn bulk_delete_courses(
        &self,
        body: IdsRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::bulk_delete(self, body, request).await
    }

    // 分类
    pub async fn list_categories(
        &self,
        params: CategoryListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        categories::list_categories(self, params, request).await
    }

    pub async fn get_category(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        categories::get_category(self, id, request).await
    }

    pub async fn create_category(
        &self,
        body: CreateCategoryRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        categories::create_category(self, body, request).await
    }

    pub async fn update_category(
        &self,
        id: i64,
        body: UpdateCategoryRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        categories::update_category(self, id, body, request).await
    }

    pub async fn delete_category(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        categories::delete_category(self, id, request).await
    }

    // 用户
    pub async fn list_users(
        &self,
        role: UserRole,
        params: UserListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        users::list_users(self, role, params, request).await
    }

    pub async fn get_user(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        users::get_user(self, id, request).await
    }

    pub async fn create_user(
        &self,
        body: CreateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        users::create_user(self, body, request).await
    }

    pub async fn update_user(
        &self,
        id: i64,
        body: UpdateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        users::update_user(self, id, body, request).await
    }

    pub async fn delete_user(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        users::delete_user(self, id, request).await
    }

    pub async fn toggle_lock(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        users::toggle_lock(self, id, request).await
    }

    pub async fn promote(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        users::promote(self, id, request).await
    }

    pub async fn bulk_lock(
        &self,
        body: BulkLockRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        users::bulk_lock(self, body, request).await
    }

    pub async fn export_users(
        &self,
        params: UserExportParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        users::export_users(self, params, request).await
    }

    // 支付
    pub async fn list_payments(
        &self,
        params: PaymentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        payments::list_payments(self, params, request).await
    }

    pub async fn get_payment(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        payments::get_payment(self, id, request).await
    }

    pub async fn approve_payment(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        payments::approve_payment(self, id, request).await
    }

    pub async fn reject_payment(
        &self,
        id: i64,
        body: ReasonRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        payments::reject_payment(self, id, body, request).await
    }

    pub async fn bulk_approve_payments(
        &self,
        body: IdsRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        payments::bulk_approve(self, body, request).await
    }

    pub async fn bulk_reject_payments(
        &self,
        body: IdsRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        payments::bulk_reject(self, body, request).await
    }

    pub async fn export_payments(
        &self,
        params: PaymentExportParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        payments::export_payments(self, params, request).await
    }

    pub async fn cleanup_payments(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        payments::cleanup(self, request).await
    }

    // 收入报表
    pub async fn revenue_report(
        &self,
        params: RevenueReportParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        reports::revenue_report(self, params, request).await
    }

    pub async fn export_revenue_report(
        &self,
        params: RevenueReportParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        reports::export_revenue_report(self, params, request).await
    }

    // 系统设置与维护
    pub async fn list_settings(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        settings::list_settings(self, request).await
    }

    pub async fn update_setting(
        &self,
        key: String,
        body: UpdateSettingRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        settings::update_setting(self, key, body, request).await
    }

    pub async fn backup(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        maintenance::backup(self, request).await
    }

    pub async fn list_backups(
        &self,
        query: PaginationQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        maintenance::list_backups(self, query, request).await
    }
}
