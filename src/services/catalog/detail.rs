use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CatalogService;
use crate::models::categories::CategoryCatalogResponse;
use crate::models::courses::entities::{CourseStatus, LessonOutline};
use crate::models::courses::requests::CourseListQuery;
use crate::models::courses::responses::{CatalogCourseDetail, TeacherProfileResponse};
use crate::models::common::pagination::MAX_PAGE_SIZE;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{not_found, storage_error};

/// 课程详情；未上架的课程对外不可见
pub async fn course_detail(
    service: &CatalogService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let course = match storage.get_course_by_id(id).await {
        Ok(Some(course)) if course.is_active() => course,
        Ok(_) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(storage_error(e, "查询课程失败")),
    };

    let teacher_name = match storage.get_user_by_id(course.teacher_id).await {
        Ok(teacher) => teacher.map(|t| t.full_name).unwrap_or_default(),
        Err(e) => return Ok(storage_error(e, "查询教师失败")),
    };
    let categories = match storage.get_course_categories(course.id).await {
        Ok(categories) => categories,
        Err(e) => return Ok(storage_error(e, "查询课程分类失败")),
    };
    let lessons = match storage.list_lessons(course.id).await {
        Ok(lessons) => lessons.iter().map(LessonOutline::from).collect(),
        Err(e) => return Ok(storage_error(e, "查询课时失败")),
    };
    let counts = match storage.get_course_counts(course.id).await {
        Ok(counts) => counts,
        Err(e) => return Ok(storage_error(e, "查询课程统计失败")),
    };

    let detail = CatalogCourseDetail {
        course,
        teacher_name,
        categories,
        lessons,
        quiz_count: counts.quiz_count,
        enrollment_count: counts.enrollment_count,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "查询成功")))
}

pub async fn categories(service: &CatalogService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_categories_with_active_counts().await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            CategoryCatalogResponse { items },
            "查询成功",
        ))),
        Err(e) => Ok(storage_error(e, "查询分类失败")),
    }
}

pub async fn teacher_profile(
    service: &CatalogService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let teacher = match storage.get_user_by_id(id).await {
        Ok(Some(user)) if user.role.can_teach() => user,
        Ok(_) => return Ok(not_found(ErrorCode::UserNotFound, "Teacher not found")),
        Err(e) => return Ok(storage_error(e, "查询教师失败")),
    };

    let query = CourseListQuery {
        page: 1,
        size: MAX_PAGE_SIZE as u64,
        status: Some(CourseStatus::Active),
        teacher_id: Some(teacher.id),
        ..Default::default()
    };
    let courses = match storage.list_courses_with_pagination(query).await {
        Ok(list) => list,
        Err(e) => return Ok(storage_error(e, "查询课程失败")),
    };
    let counts = match storage.get_user_activity_counts(teacher.id).await {
        Ok(counts) => counts,
        Err(e) => return Ok(storage_error(e, "查询关注数失败")),
    };

    let profile = TeacherProfileResponse {
        teacher: teacher.summary(),
        course_count: courses.pagination.total,
        courses: courses.items,
        follower_count: counts.follower_count,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(profile, "查询成功")))
}
