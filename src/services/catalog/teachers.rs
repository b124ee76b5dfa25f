use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Datelike, Utc};

use super::CatalogService;
use crate::models::courses::requests::{TeacherSearchParams, TeacherSuggestParams};
use crate::models::courses::responses::TeacherSuggestion;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{bad_request, storage_error};
use crate::utils::date_range::day_start;

/// 教师搜索默认每页条数，上限 50
const TEACHER_PAGE_SIZE: i64 = 12;
const MAX_TEACHER_PAGE_SIZE: u64 = 50;
const SUGGEST_LIMIT: u64 = 10;

pub async fn search_teachers(
    service: &CatalogService,
    params: TeacherSearchParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let keyword = match params.keyword() {
        Ok(keyword) => keyword,
        Err(msg) => return Ok(bad_request(ErrorCode::ValidationFailed, msg)),
    };
    let (page, size) = params.pagination.normalized(TEACHER_PAGE_SIZE);
    let storage = service.get_storage(request);

    match storage
        .search_teachers(keyword, page, size.min(MAX_TEACHER_PAGE_SIZE))
        .await
    {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "搜索教师失败")),
    }
}

/// 输入不足两个字符时返回空列表
pub async fn suggest_teachers(
    service: &CatalogService,
    params: TeacherSuggestParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(term) = params.term() else {
        return Ok(HttpResponse::Ok().json(ApiResponse::success(Vec::<TeacherSuggestion>::new(), "查询成功")));
    };
    let storage = service.get_storage(request);

    match storage.suggest_teachers(term, SUGGEST_LIMIT).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(items, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询教师联想失败")),
    }
}

pub async fn home_statistics(
    service: &CatalogService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let today = Utc::now().date_naive();
    let month_start = day_start(today.with_day(1).unwrap_or(today));
    let storage = service.get_storage(request);

    match storage.get_home_statistics(month_start).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(stats, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询首页统计失败")),
    }
}
