use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use chrono::{Datelike, Days, Utc};

use super::AdminService;
use crate::models::reports::{DashboardWindow, SystemHealth, status_breakdown};
use crate::models::{AppStartTime, ApiResponse};
use crate::services::storage_error;
use crate::services::websocket::ConnectionManager;
use crate::utils::date_range::day_start;

/// 本周（周一起）与本月的起点
fn current_window() -> DashboardWindow {
    let today = Utc::now().date_naive();
    let week_start = today
        .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
        .unwrap_or(today);
    let month_start = today.with_day(1).unwrap_or(today);
    DashboardWindow {
        week_start: day_start(week_start),
        month_start: day_start(month_start),
    }
}

pub async fn dashboard(service: &AdminService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_admin_dashboard(current_window()).await {
        Ok(dashboard) => Ok(HttpResponse::Ok().json(ApiResponse::success(dashboard, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询管理看板失败")),
    }
}

pub async fn system_health(
    service: &AdminService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let counts = match storage.get_health_counts().await {
        Ok(counts) => counts,
        Err(e) => return Ok(storage_error(e, "查询系统状态失败")),
    };
    let active_live_rooms = match storage.count_active_live_rooms().await {
        Ok(count) => count,
        Err(e) => return Ok(storage_error(e, "统计直播间失败")),
    };

    let started_at = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|t| t.start_datetime)
        .unwrap_or_else(Utc::now);
    let uptime_seconds = (Utc::now() - started_at).num_seconds().max(0);

    let health = SystemHealth {
        users: status_breakdown(counts.users),
        courses: status_breakdown(counts.courses),
        payments: status_breakdown(counts.payments),
        database_backend: storage.database_backend().to_string(),
        started_at,
        uptime_seconds,
        online_notification_sockets: ConnectionManager::get().online_count() as i64,
        active_live_rooms,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(health, "查询成功")))
}
