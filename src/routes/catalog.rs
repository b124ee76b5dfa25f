use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::models::courses::requests::{
    CatalogListParams, TeacherSearchParams, TeacherSuggestParams,
};
use crate::services::CatalogService;
use crate::utils::SafeIDI64;

static CATALOG_SERVICE: Lazy<CatalogService> = Lazy::new(CatalogService::new_lazy);

pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CatalogListParams>,
) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.list_courses(query.into_inner(), &req).await
}

pub async fn popular(req: HttpRequest) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.popular(&req).await
}

pub async fn newest(req: HttpRequest) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.newest(&req).await
}

pub async fn course_detail(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.course_detail(id.0, &req).await
}

pub async fn categories(req: HttpRequest) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.categories(&req).await
}

pub async fn teacher_profile(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.teacher_profile(id.0, &req).await
}

pub async fn search_teachers(
    req: HttpRequest,
    query: web::Query<TeacherSearchParams>,
) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.search_teachers(query.into_inner(), &req).await
}

pub async fn suggest_teachers(
    req: HttpRequest,
    query: web::Query<TeacherSuggestParams>,
) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.suggest_teachers(query.into_inner(), &req).await
}

pub async fn home_statistics(req: HttpRequest) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.home_statistics(&req).await
}

// 公开目录，无需登录
pub fn configure_catalog_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/catalog")
            .wrap(middleware::Compress::default())
            .route("/courses", web::get().to(list_courses))
            .route("/courses/popular", web::get().to(popular))
            .route("/courses/newest", web::get().to(newest))
            .route("/courses/{id}", web::get().to(course_detail))
            .route("/categories", web::get().to(categories))
            .route("/stats", web::get().to(home_statistics))
            .route("/teachers/search", web::get().to(search_teachers))
            .route("/teachers/suggest", web::get().to(suggest_teachers))
            .route("/teachers/{id}", web::get().to(teacher_profile)),
    );
}
