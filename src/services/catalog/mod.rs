pub mod detail;
pub mod list;
pub mod teachers;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::courses::entities::CourseSort;
use crate::models::courses::requests::{
    CatalogListParams, TeacherSearchParams, TeacherSuggestParams,
};
use crate::storage::Storage;

/// 首页推荐条数
pub const SHOWCASE_SIZE: u64 = 10;

/// 公开课程目录，只展示已上架课程
pub struct CatalogService {
    storage: Option<Arc<dyn Storage>>,
}

super::service_handles!(CatalogService);

impl CatalogService {
    pub async fn list_courses(
        &self,
        params: CatalogListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_courses(self, params, request).await
    }

    pub async fn popular(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::showcase(self, CourseSort::Popular, request).await
    }

    pub async fn newest(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::showcase(self, CourseSort::Newest, request).await
    }

    pub async fn course_detail(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        detail::course_detail(self, id, request).await
    }

    pub async fn categories(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        detail::categories(self, request).await
    }

    pub async fn teacher_profile(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        detail::teacher_profile(self, id, request).await
    }

    pub async fn search_teachers(
        &self,
        params: TeacherSearchParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        teachers::search_teachers(self, params, request).await
    }

    pub async fn suggest_teachers(
        &self,
        params: TeacherSuggestParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        teachers::suggest_teachers(self, params, request).await
    }

    pub async fn home_statistics(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        teachers::home_statistics(self, request).await
    }
}
