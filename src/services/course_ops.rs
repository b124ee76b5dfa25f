//! 管理后台与教师工作台共用的课程操作

use std::sync::Arc;

use actix_web::HttpResponse;
use tracing::{info, warn};

use super::{bad_request, conflict, not_found, storage_error};
use crate::models::courses::entities::{Course, CourseDeleteOutcome};
use crate::models::courses::responses::CourseDetailResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

/// 授课人必须是教师或管理员
pub(crate) async fn check_teacher(
    storage: &Arc<dyn Storage>,
    teacher_id: i64,
) -> Result<(), HttpResponse> {
    match storage.get_user_by_id(teacher_id).await {
        Ok(Some(user)) if user.role.can_teach() => Ok(()),
        Ok(Some(_)) => Err(bad_request(
            ErrorCode::ValidationFailed,
            "The assigned user is not a teacher",
        )),
        Ok(None) => Err(not_found(ErrorCode::UserNotFound, "Teacher not found")),
        Err(e) => Err(storage_error(e, "查询教师失败")),
    }
}

pub(crate) async fn check_categories(
    storage: &Arc<dyn Storage>,
    category_ids: &[i64],
) -> Result<(), HttpResponse> {
    for id in category_ids {
        match storage.get_category_by_id(*id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(bad_request(
                    ErrorCode::CategoryNotFound,
                    format!("Category {id} does not exist"),
                ));
            }
            Err(e) => return Err(storage_error(e, "查询分类失败")),
        }
    }
    Ok(())
}

/// 课程、教师、分类与计数
pub(crate) async fn load_detail(
    storage: &Arc<dyn Storage>,
    course: Course,
) -> Result<CourseDetailResponse, HttpResponse> {
    let teacher = storage
        .get_user_by_id(course.teacher_id)
        .await
        .map_err(|e| storage_error(e, "查询教师失败"))?
        .map(|u| u.summary());
    let categories = storage
        .get_course_categories(course.id)
        .await
        .map_err(|e| storage_error(e, "查询课程分类失败"))?;
    let counts = storage
        .get_course_counts(course.id)
        .await
        .map_err(|e| storage_error(e, "统计课程数据失败"))?;

    Ok(CourseDetailResponse {
        course,
        teacher,
        categories,
        counts,
    })
}

/// 删除课程；存在成功支付时返回 409
pub(crate) async fn delete_course(storage: &Arc<dyn Storage>, course_id: i64) -> HttpResponse {
    match storage.delete_course(course_id).await {
        Ok(CourseDeleteOutcome::Deleted) => {
            info!("Course {} deleted", course_id);
            HttpResponse::Ok().json(ApiResponse::success_empty("Course deleted"))
        }
        Ok(CourseDeleteOutcome::NotFound) => not_found(ErrorCode::CourseNotFound, "Course not found"),
        Ok(CourseDeleteOutcome::HasPayments) => {
            warn!("Refused to delete course {} with successful payments", course_id);
            conflict(
                ErrorCode::CourseHasPayments,
                "Course has successful payments and cannot be deleted",
            )
        }
        Err(e) => storage_error(e, "删除课程失败"),
    }
}
