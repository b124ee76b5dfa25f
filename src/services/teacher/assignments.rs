use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{TeacherService, load_owned_course};
use crate::models::assignments::{
    Assignment, AssignmentListResponse, CreateAssignmentRequest, GradeSubmissionRequest,
    UpdateAssignmentRequest,
};
use crate::models::common::pagination::DEFAULT_PAGE_SIZE;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode, PaginationQuery};
use crate::services::{bad_request, current_user, not_found, storage_error};
use crate::storage::Storage;

/// 加载作业并确认其课程归属
async fn load_owned_assignment(
    storage: &Arc<dyn Storage>,
    assignment_id: i64,
    user: &User,
) -> Result<Assignment, HttpResponse> {
    let assignment = match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => {
            return Err(not_found(ErrorCode::AssignmentNotFound, "Assignment not found"));
        }
        Err(e) => return Err(storage_error(e, "查询作业失败")),
    };
    load_owned_course(storage, assignment.course_id, user).await?;
    Ok(assignment)
}

pub async fn list_assignments(
    service: &TeacherService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_course(&storage, course_id, &user).await {
        return Ok(resp);
    }
    match storage.list_assignments(course_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AssignmentListResponse { items },
            "查询成功",
        ))),
        Err(e) => Ok(storage_error(e, "查询作业列表失败")),
    }
}

pub async fn create_assignment(
    service: &TeacherService,
    course_id: i64,
    body: CreateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let new_assignment = match body.into_new() {
        Ok(assignment) => assignment,
        Err(msg) => return Ok(bad_request(ErrorCode::ValidationFailed, msg)),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_course(&storage, course_id, &user).await {
        return Ok(resp);
    }
    match storage.create_assignment(course_id, new_assignment).await {
        Ok(assignment) => {
            info!("Assignment {} added to course {course_id}", assignment.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(assignment, "作业创建成功")))
        }
        Err(e) => Ok(storage_error(e, "创建作业失败")),
    }
}

pub async fn update_assignment(
    service: &TeacherService,
    assignment_id: i64,
    body: UpdateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let update = match body.into_update() {
        Ok(update) => update,
        Err(msg) => return Ok(bad_request(ErrorCode::ValidationFailed, msg)),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_assignment(&storage, assignment_id, &user).await {
        return Ok(resp);
    }
    match storage.update_assignment(assignment_id, update).await {
        Ok(Some(assignment)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(assignment, "作业更新成功")))
        }
        Ok(None) => Ok(not_found(ErrorCode::AssignmentNotFound, "Assignment not found")),
        Err(e) => Ok(storage_error(e, "更新作业失败")),
    }
}

/// 连同全部提交一起删除
pub async fn delete_assignment(
    service: &TeacherService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_assignment(&storage, assignment_id, &user).await {
        return Ok(resp);
    }
    match storage.delete_assignment(assignment_id).await {
        Ok(true) => {
            info!("Assignment {assignment_id} deleted by user {}", user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("作业删除成功")))
        }
        Ok(false) => Ok(not_found(ErrorCode::AssignmentNotFound, "Assignment not found")),
        Err(e) => Ok(storage_error(e, "删除作业失败")),
    }
}

pub async fn assignment_submissions(
    service: &TeacherService,
    assignment_id: i64,
    query: PaginationQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let (page, size) = query.normalized(DEFAULT_PAGE_SIZE);
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_assignment(&storage, assignment_id, &user).await {
        return Ok(resp);
    }
    match storage
        .list_assignment_submissions(assignment_id, page, size)
        .await
    {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询提交列表失败")),
    }
}

/// 分数 0..=10，可重复评分
pub async fn grade_submission(
    service: &TeacherService,
    submission_id: i64,
    body: GradeSubmissionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let (grade, feedback) = match body.validate() {
        Ok(valid) => valid,
        Err(msg) => return Ok(bad_request(ErrorCode::ValidationFailed, msg)),
    };
    let storage = service.get_storage(request);

    let submission = match storage.get_submission_by_id(submission_id).await {
        Ok(Some(submission)) => submission,
        Ok(None) => return Ok(not_found(ErrorCode::SubmissionNotFound, "Submission not found")),
        Err(e) => return Ok(storage_error(e, "查询提交失败")),
    };
    if let Err(resp) = load_owned_assignment(&storage, submission.assignment_id, &user).await {
        return Ok(resp);
    }

    match storage
        .grade_submission(submission_id, grade, feedback, user.id)
        .await
    {
        Ok(Some(graded)) => {
            info!("Submission {submission_id} graded {grade} by user {}", user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(graded, "评分成功")))
        }
        Ok(None) => Ok(not_found(ErrorCode::SubmissionNotFound, "Submission not found")),
        Err(e) => Ok(storage_error(e, "评分失败")),
    }
}

pub async fn course_followers(
    service: &TeacherService,
    course_id: i64,
    query: PaginationQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let (page, size) = query.normalized(DEFAULT_PAGE_SIZE);
    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_course(&storage, course_id, &user).await {
        return Ok(resp);
    }
    match storage.list_course_followers(course_id, page, size).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询课程关注者失败")),
    }
}
