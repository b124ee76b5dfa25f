use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::AdminService;
use crate::models::common::pagination::ADMIN_PAGE_SIZE;
use crate::models::courses::entities::{CourseDeleteOutcome, CourseStatus};
use crate::models::courses::requests::{
    CourseListParams, CourseListQuery, CourseUpdate, CreateCourseRequest, UpdateCourseRequest,
};
use crate::models::{ApiResponse, BulkOperationResponse, ErrorCode, IdsRequest, ReasonRequest};
use crate::services::course_ops::{self, check_categories, check_teacher};
use crate::services::notifications::NotificationDispatcher;
use crate::services::{bad_request, current_user, not_found, storage_error};

pub async fn list_courses(
    service: &AdminService,
    params: CourseListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let (page, size) = params.pagination.normalized(ADMIN_PAGE_SIZE);
    let storage = service.get_storage(request);

    let query = CourseListQuery {
        page,
        size,
        status: params.status,
        search: params.search,
        ..Default::default()
    };
    match storage.list_courses_with_pagination(query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询课程列表失败")),
    }
}

pub async fn get_course(
    service: &AdminService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let course = match storage.get_course_by_id(id).await {
        Ok(Some(course)) => course,
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(storage_error(e, "查询课程失败")),
    };
    match course_ops::load_detail(&storage, course).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "查询成功"))),
        Err(resp) => Ok(resp),
    }
}

/// 管理员建课直接上架
pub async fn create_course(
    service: &AdminService,
    body: CreateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(teacher_id) = body.teacher_id else {
        return Ok(bad_request(ErrorCode::ValidationFailed, "teacher_id is required"));
    };
    let new_course = match body.into_new_course(teacher_id, CourseStatus::Active) {
        Ok(course) => course,
        Err(msg) => return Ok(bad_request(ErrorCode::ValidationFailed, msg)),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = check_teacher(&storage, teacher_id).await {
        return Ok(resp);
    }
    if let Err(resp) = check_categories(&storage, &new_course.category_ids).await {
        return Ok(resp);
    }

    match storage.create_course(new_course).await {
        Ok(course) => {
            info!("Admin created course {} for teacher {}", course.id, teacher_id);
            NotificationDispatcher::notify_new_course(&storage, &course).await;
            Ok(HttpResponse::Created().json(ApiResponse::success(course, "Course created")))
        }
        Err(e) => Ok(storage_error(e, "创建课程失败")),
    }
}

pub async fn update_course(
    service: &AdminService,
    id: i64,
    body: UpdateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let update = match body.into_update() {
        Ok(update) => update,
        Err(msg) => return Ok(bad_request(ErrorCode::ValidationFailed, msg)),
    };
    let storage = service.get_storage(request);

    if let Some(teacher_id) = update.teacher_id
        && let Err(resp) = check_teacher(&storage, teacher_id).await
    {
        return Ok(resp);
    }
    if let Some(ref category_ids) = update.category_ids
        && let Err(resp) = check_categories(&storage, category_ids).await
    {
        return Ok(resp);
    }

    match storage.update_course(id, update).await {
        Ok(Some(course)) => Ok(HttpResponse::Ok().json(ApiResponse::success(course, "Course updated"))),
        Ok(None) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(storage_error(e, "更新课程失败")),
    }
}

pub async fn delete_course(
    service: &AdminService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    Ok(course_ops::delete_course(&storage, id).await)
}

fn approval() -> CourseUpdate {
    CourseUpdate {
        status: Some(CourseStatus::Active),
        reject_reason: Some(None),
        ..Default::default()
    }
}

/// 审核通过：通知教师，首次上架时通知粉丝
pub async fn approve_course(
    service: &AdminService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let admin = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let was_active = match storage.get_course_by_id(id).await {
        Ok(Some(course)) => course.is_active(),
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(storage_error(e, "查询课程失败")),
    };

    match storage.update_course(id, approval()).await {
        Ok(Some(course)) => {
            info!("Admin {} approved course {}", admin.id, course.id);
            NotificationDispatcher::notify_course_review(&storage, &course, None).await;
            if !was_active {
                NotificationDispatcher::notify_new_course(&storage, &course).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(course, "Course approved")))
        }
        Ok(None) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(storage_error(e, "审核课程失败")),
    }
}

pub async fn reject_course(
    service: &AdminService,
    id: i64,
    body: ReasonRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let admin = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let reason = body.reason.trim().to_string();
    if reason.is_empty() {
        return Ok(bad_request(ErrorCode::ValidationFailed, "A rejection reason is required"));
    }
    let storage = service.get_storage(request);

    let update = CourseUpdate {
        status: Some(CourseStatus::Rejected),
        reject_reason: Some(Some(reason.clone())),
        ..Default::default()
    };
    match storage.update_course(id, update).await {
        Ok(Some(course)) => {
            info!("Admin {} rejected course {}: {}", admin.id, course.id, reason);
            NotificationDispatcher::notify_course_review(&storage, &course, Some(&reason)).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(course, "Course rejected")))
        }
        Ok(None) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(storage_error(e, "驳回课程失败")),
    }
}

/// 逐个审核；不存在的 ID 记为跳过
pub async fn bulk_approve(
    service: &AdminService,
    body: IdsRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let mut result = BulkOperationResponse::default();

    for id in body.ids {
        let course = match storage.get_course_by_id(id).await {
            Ok(Some(course)) => course,
            Ok(None) => {
                result.skipped.push(id);
                continue;
            }
            Err(e) => return Ok(storage_error(e, "查询课程失败")),
        };
        if course.is_active() {
            result.skipped.push(id);
            continue;
        }
        match storage.update_course(id, approval()).await {
            Ok(Some(course)) => {
                result.affected += 1;
                NotificationDispatcher::notify_course_review(&storage, &course, None).await;
                NotificationDispatcher::notify_new_course(&storage, &course).await;
            }
            Ok(None) => result.skipped.push(id),
            Err(e) => return Ok(storage_error(e, "审核课程失败")),
        }
    }

    info!("Bulk approved {} courses", result.affected);
    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Courses approved")))
}

/// 有成功支付的课程被跳过
pub async fn bulk_delete(
    service: &AdminService,
    body: IdsRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let mut result = BulkOperationResponse::default();

    for id in body.ids {
        match storage.delete_course(id).await {
            Ok(CourseDeleteOutcome::Deleted) => result.affected += 1,
            Ok(CourseDeleteOutcome::HasPayments) => {
                warn!("Skipped deleting course {} with successful payments", id);
                result.skipped.push(id);
            }
            Ok(CourseDeleteOutcome::NotFound) => result.skipped.push(id),
            Err(e) => return Ok(storage_error(e, "删除课程失败")),
        }
    }

    info!(
        "Bulk deleted {} courses, skipped {:?}",
        result.affected, result.skipped
    );
    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Courses deleted")))
}
