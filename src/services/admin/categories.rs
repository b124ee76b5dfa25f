use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::AdminService;
use crate::errors::LearnHubError;
use crate::models::categories::{
    CategoryDeleteOutcome, CategoryListParams, CategoryListQuery, CreateCategoryRequest,
    UpdateCategoryRequest, validate_category_name,
};
use crate::models::common::pagination::ADMIN_PAGE_SIZE;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{bad_request, conflict, not_found, storage_error};

fn write_error(err: LearnHubError, context: &str) -> HttpResponse {
    if err.is_conflict() {
        conflict(ErrorCode::CategoryAlreadyExists, "Category name already exists")
    } else {
        storage_error(err, context)
    }
}

fn clean_description(description: Option<String>) -> Option<String> {
    description.map(|d| d.trim().to_string())
}

pub async fn list_categories(
    service: &AdminService,
    params: CategoryListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let (page, size) = params.pagination.normalized(ADMIN_PAGE_SIZE);
    let storage = service.get_storage(request);

    let query = CategoryListQuery {
        page,
        size,
        search: params.search,
    };
    match storage.list_categories_with_pagination(query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询分类列表失败")),
    }
}

pub async fn get_category(
    service: &AdminService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_category_by_id(id).await {
        Ok(Some(category)) => Ok(HttpResponse::Ok().json(ApiResponse::success(category, "查询成功"))),
        Ok(None) => Ok(not_found(ErrorCode::CategoryNotFound, "Category not found")),
        Err(e) => Ok(storage_error(e, "查询分类失败")),
    }
}

pub async fn create_category(
    service: &AdminService,
    body: CreateCategoryRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let name = match validate_category_name(&body.name) {
        Ok(name) => name,
        Err(msg) => return Ok(bad_request(ErrorCode::ValidationFailed, msg)),
    };
    let storage = service.get_storage(request);

    match storage
        .create_category(name, clean_description(body.description))
        .await
    {
        Ok(category) => {
            info!("Category {} created: {}", category.id, category.name);
            Ok(HttpResponse::Created().json(ApiResponse::success(category, "Category created")))
        }
        Err(e) => Ok(write_error(e, "创建分类失败")),
    }
}

pub async fn update_category(
    service: &AdminService,
    id: i64,
    body: UpdateCategoryRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let name = match body.name.as_deref().map(validate_category_name).transpose() {
        Ok(name) => name,
        Err(msg) => return Ok(bad_request(ErrorCode::ValidationFailed, msg)),
    };
    let storage = service.get_storage(request);

    match storage
        .update_category(id, name, clean_description(body.description))
        .await
    {
        Ok(Some(category)) => Ok(HttpResponse::Ok().json(ApiResponse::success(category, "Category updated"))),
        Ok(None) => Ok(not_found(ErrorCode::CategoryNotFound, "Category not found")),
        Err(e) => Ok(write_error(e, "更新分类失败")),
    }
}

/// 仍被课程引用的分类不能删除
pub async fn delete_category(
    service: &AdminService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_category(id).await {
        Ok(CategoryDeleteOutcome::Deleted) => {
            info!("Category {} deleted", id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Category deleted")))
        }
        Ok(CategoryDeleteOutcome::NotFound) => {
            Ok(not_found(ErrorCode::CategoryNotFound, "Category not found"))
        }
        Ok(CategoryDeleteOutcome::InUse(count)) => {
            warn!("Refused to delete category {} used by {} courses", id, count);
            Ok(conflict(
                ErrorCode::CategoryInUse,
                format!("Category is used by {count} course(s) and cannot be deleted"),
            ))
        }
        Err(e) => Ok(storage_error(e, "删除分类失败")),
    }
}
