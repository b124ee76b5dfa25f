use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Datelike, Months, Utc};

use super::TeacherService;
use crate::models::common::pagination::DEFAULT_PAGE_SIZE;
use crate::models::reports::{TeacherReport, monthly_revenue};
use crate::models::{ApiResponse, PaginationQuery};
use crate::services::{current_user, storage_error};
use crate::utils::date_range::day_start;

const REPORT_MONTHS: u32 = 6;
const TOP_COURSES: usize = 10;

pub async fn dashboard(service: &TeacherService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.get_teacher_dashboard(user.id).await {
        Ok(dashboard) => Ok(HttpResponse::Ok().json(ApiResponse::success(dashboard, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询教师看板失败")),
    }
}

/// 课程表现（按学生数取前 10）与近 6 个月收入
pub async fn reports(service: &TeacherService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let mut top_courses = match storage.list_course_performance(user.id).await {
        Ok(rows) => rows,
        Err(e) => return Ok(storage_error(e, "查询课程表现失败")),
    };
    top_courses.sort_by(|a, b| b.students.cmp(&a.students).then(a.course_id.cmp(&b.course_id)));
    top_courses.truncate(TOP_COURSES);

    let now = Utc::now();
    let today = now.date_naive();
    let first_of_month = today.with_day(1).unwrap_or(today);
    let window_start = first_of_month
        .checked_sub_months(Months::new(REPORT_MONTHS - 1))
        .unwrap_or(first_of_month);
    let entries = match storage
        .list_revenue_entries(day_start(window_start), now.timestamp() + 1, Some(user.id))
        .await
    {
        Ok(entries) => entries,
        Err(e) => return Ok(storage_error(e, "查询收入记录失败")),
    };

    let report = TeacherReport {
        top_courses,
        monthly_revenue: monthly_revenue(today, REPORT_MONTHS, &entries),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(report, "查询成功")))
}

pub async fn followers(
    service: &TeacherService,
    query: PaginationQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let (page, size) = query.normalized(DEFAULT_PAGE_SIZE);
    let storage = service.get_storage(request);

    match storage.list_followers(user.id, page, size).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询粉丝列表失败")),
    }
}
