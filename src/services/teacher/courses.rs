use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{TeacherService, load_owned_course};
use crate::models::common::pagination::DEFAULT_PAGE_SIZE;
use crate::models::courses::entities::CourseStatus;
use crate::models::courses::requests::{
    CourseListParams, CourseListQuery, CreateCourseRequest, UpdateCourseRequest,
};
use crate::models::{ApiResponse, ErrorCode, PaginationQuery};
use crate::services::course_ops::{self, check_categories};
use crate::services::{bad_request, current_user, not_found, storage_error};

pub async fn list_courses(
    service: &TeacherService,
    params: CourseListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let (page, size) = params.pagination.normalized(DEFAULT_PAGE_SIZE);
    let storage = service.get_storage(request);

    let query = CourseListQuery {
        page,
        size,
        status: params.status,
        teacher_id: Some(user.id),
        search: params.search,
        ..Default::default()
    };
    match storage.list_courses_with_pagination(query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询课程列表失败")),
    }
}

/// 教师建课进入待审核
pub async fn create_course(
    service: &TeacherService,
    body: CreateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let new_course = match body.into_new_course(user.id, CourseStatus::Pending) {
        Ok(course) => course,
        Err(msg) => return Ok(bad_request(ErrorCode::ValidationFailed, msg)),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = check_categories(&storage, &new_course.category_ids).await {
        return Ok(resp);
    }

    match storage.create_course(new_course).await {
        Ok(course) => {
            info!("Teacher {} submitted course {} for review", user.id, course.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(course, "Course submitted for review")))
        }
        Err(e) => Ok(storage_error(e, "创建课程失败")),
    }
}

pub async fn get_course(
    service: &TeacherService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let course = match load_owned_course(&storage, id, &user).await {
        Ok(course) => course,
        Err(resp) => return Ok(resp),
    };
    match course_ops::load_detail(&storage, course).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "查询成功"))),
        Err(resp) => Ok(resp),
    }
}

/// 被驳回的课程修改后重新进入待审核
pub async fn update_course(
    service: &TeacherService,
    id: i64,
    body: UpdateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let mut update = match body.into_update() {
        Ok(update) => update,
        Err(msg) => return Ok(bad_request(ErrorCode::ValidationFailed, msg)),
    };
    // 授课人只能由管理员调整
    update.teacher_id = None;
    let storage = service.get_storage(request);

    let course = match load_owned_course(&storage, id, &user).await {
        Ok(course) => course,
        Err(resp) => return Ok(resp),
    };
    if let Some(ref category_ids) = update.category_ids
        && let Err(resp) = check_categories(&storage, category_ids).await
    {
        return Ok(resp);
    }
    if course.status == CourseStatus::Rejected {
        update.status = Some(CourseStatus::Pending);
        update.reject_reason = Some(None);
    }

    match storage.update_course(course.id, update).await {
        Ok(Some(updated)) => {
            if course.status != updated.status {
                info!("Course {} resubmitted for review", updated.id);
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "Course updated")))
        }
        Ok(None) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(storage_error(e, "更新课程失败")),
    }
}

pub async fn delete_course(
    service: &TeacherService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_course(&storage, id, &user).await {
        return Ok(resp);
    }
    Ok(course_ops::delete_course(&storage, id).await)
}

pub async fn course_stats(
    service: &TeacherService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_course(&storage, id, &user).await {
        return Ok(resp);
    }
    match storage.get_course_stats(id).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(stats, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询课程统计失败")),
    }
}

pub async fn course_students(
    service: &TeacherService,
    id: i64,
    query: PaginationQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let (page, size) = query.normalized(DEFAULT_PAGE_SIZE);
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_course(&storage, id, &user).await {
        return Ok(resp);
    }
    match storage.list_course_students(id, page, size).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询选课学生失败")),
    }
}
