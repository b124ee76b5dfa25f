use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CatalogService, SHOWCASE_SIZE};
use crate::models::ApiResponse;
use crate::models::common::pagination::DEFAULT_PAGE_SIZE;
use crate::models::courses::entities::{CourseSort, CourseStatus};
use crate::models::courses::requests::{CatalogListParams, CourseListQuery};
use crate::services::storage_error;

pub async fn list_courses(
    service: &CatalogService,
    params: CatalogListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let (page, size) = params.pagination.normalized(DEFAULT_PAGE_SIZE);
    let storage = service.get_storage(request);

    let query = CourseListQuery {
        page,
        size,
        status: Some(CourseStatus::Active),
        category_id: params.category_id,
        text_search: params.search.filter(|s| !s.trim().is_empty()),
        sort: params.sort,
        ..Default::default()
    };

    match storage.list_courses_with_pagination(query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询课程失败")),
    }
}

/// 热门 / 最新课程前 10
pub async fn showcase(
    service: &CatalogService,
    sort: CourseSort,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let query = CourseListQuery {
        page: 1,
        size: SHOWCASE_SIZE,
        status: Some(CourseStatus::Active),
        sort,
        ..Default::default()
    };

    match storage.list_courses_with_pagination(query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list.items, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询课程失败")),
    }
}
