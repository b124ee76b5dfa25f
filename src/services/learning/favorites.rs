use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::LearningService;
use crate::models::common::pagination::DEFAULT_PAGE_SIZE;
use crate::models::learning::ToggleResponse;
use crate::models::{ApiResponse, ErrorCode, PaginationQuery};
use crate::services::{bad_request, conflict, current_user, not_found, storage_error};

pub async fn toggle_favorite(
    service: &LearningService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) if course.is_active() => {}
        Ok(_) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(storage_error(e, "查询课程失败")),
    }

    match storage.toggle_favorite(user.id, course_id).await {
        Ok(enabled) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ToggleResponse { enabled },
            if enabled { "Added to favorites" } else { "Removed from favorites" },
        ))),
        Err(e) => Ok(storage_error(e, "收藏失败")),
    }
}

pub async fn list_favorites(
    service: &LearningService,
    query: PaginationQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let (page, size) = query.normalized(DEFAULT_PAGE_SIZE);
    let storage = service.get_storage(request);

    match storage.list_favorites(user.id, page, size).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询收藏失败")),
    }
}

/// 关注 / 取消关注教师，不能关注自己或非教师
pub async fn toggle_follow(
    service: &LearningService,
    teacher_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if user.id == teacher_id {
        return Ok(bad_request(ErrorCode::BadRequest, "You cannot follow yourself"));
    }
    let storage = service.get_storage(request);

    match storage.get_user_by_id(teacher_id).await {
        Ok(Some(teacher)) if teacher.role.can_teach() => {}
        Ok(Some(_)) => return Ok(bad_request(ErrorCode::BadRequest, "Only teachers can be followed")),
        Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "Teacher not found")),
        Err(e) => return Ok(storage_error(e, "查询教师失败")),
    }

    match storage.toggle_follow(user.id, teacher_id).await {
        Ok(enabled) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ToggleResponse { enabled },
            if enabled { "Followed" } else { "Unfollowed" },
        ))),
        Err(e) => Ok(storage_error(e, "关注失败")),
    }
}

pub async fn list_following(
    service: &LearningService,
    query: PaginationQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let (page, size) = query.normalized(DEFAULT_PAGE_SIZE);
    let storage = service.get_storage(request);

    match storage.list_following(user.id, page, size).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询关注列表失败")),
    }
}

/// 关注上架课程；重复关注返回 409
pub async fn follow_course(
    service: &LearningService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) if course.is_active() => {}
        Ok(_) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(storage_error(e, "查询课程失败")),
    }

    match storage.follow_course(user.id, course_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ToggleResponse { enabled: true },
            "Course followed",
        ))),
        Ok(false) => Ok(conflict(
            ErrorCode::Conflict,
            "You are already following this course",
        )),
        Err(e) => Ok(storage_error(e, "关注课程失败")),
    }
}

pub async fn unfollow_course(
    service: &LearningService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.unfollow_course(user.id, course_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ToggleResponse { enabled: false },
            "Course unfollowed",
        ))),
        Ok(false) => Ok(not_found(ErrorCode::NotFound, "You are not following this course")),
        Err(e) => Ok(storage_error(e, "取消关注课程失败")),
    }
}

pub async fn followed_courses(
    service: &LearningService,
    query: PaginationQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let (page, size) = query.normalized(DEFAULT_PAGE_SIZE);
    let storage = service.get_storage(request);

    match storage.list_followed_courses(user.id, page, size).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询关注课程失败")),
    }
}
