use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::LearningService;
use super::content::accessible_course;
use crate::models::assignments::{MyAssignmentListResponse, SubmitAssignmentRequest};
use crate::models::common::pagination::DEFAULT_PAGE_SIZE;
use crate::models::{ApiResponse, ErrorCode, PaginationQuery};
use crate::services::{bad_request, conflict, current_user, not_found, storage_error};

/// 课程作业，附带当前用户的最新提交
pub async fn course_assignments(
    service: &LearningService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = accessible_course(&storage, course_id, &user).await {
        return Ok(resp);
    }
    match storage.list_my_assignments(user.id, course_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MyAssignmentListResponse { course_id, items },
            "查询成功",
        ))),
        Err(e) => Ok(storage_error(e, "查询作业列表失败")),
    }
}

/// 每次提交生成新版本；过了截止时间仍可提交，记为迟交
pub async fn submit_assignment(
    service: &LearningService,
    assignment_id: i64,
    body: SubmitAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let content = match body.clean_content() {
        Ok(content) => content,
        Err(msg) => return Ok(bad_request(ErrorCode::ValidationFailed, msg)),
    };
    let storage = service.get_storage(request);

    let assignment = match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => return Ok(not_found(ErrorCode::AssignmentNotFound, "Assignment not found")),
        Err(e) => return Ok(storage_error(e, "查询作业失败")),
    };
    if let Err(resp) = accessible_course(&storage, assignment.course_id, &user).await {
        return Ok(resp);
    }

    match storage.create_submission(&assignment, user.id, content).await {
        Ok(submission) => {
            info!(
                "User {} submitted assignment {assignment_id} v{} (late: {})",
                user.id, submission.version, submission.is_late
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(submission, "提交成功")))
        }
        Err(e) if e.is_conflict() => Ok(conflict(
            ErrorCode::Conflict,
            "Another submission is in progress, please retry",
        )),
        Err(e) => Ok(storage_error(e, "提交作业失败")),
    }
}

pub async fn my_submissions(
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

    match storage.list_user_submissions(user.id, page, size).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询提交记录失败")),
    }
}
