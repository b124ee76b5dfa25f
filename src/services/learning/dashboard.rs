use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::LearningService;
use crate::models::ApiResponse;
use crate::services::{current_user, storage_error};

/// 学生个人看板
pub async fn dashboard(service: &LearningService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.get_student_dashboard(user.id).await {
        Ok(dashboard) => Ok(HttpResponse::Ok().json(ApiResponse::success(dashboard, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询学习看板失败")),
    }
}
