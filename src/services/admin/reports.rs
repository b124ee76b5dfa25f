use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;

use super::AdminService;
use crate::models::reports::{RevenueReport, RevenueReportParams};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::export::{self, Sheet};
use crate::services::{bad_request, storage_error};
use crate::utils::date_range::resolve_range;

const DEFAULT_REPORT_DAYS: u64 = 30;
const TOP_COURSES: usize = 10;

async fn build_report(
    service: &AdminService,
    params: &RevenueReportParams,
    request: &HttpRequest,
) -> Result<RevenueReport, HttpResponse> {
    let range = resolve_range(
        params.from.as_deref(),
        params.to.as_deref(),
        Utc::now().date_naive(),
        DEFAULT_REPORT_DAYS,
    )
    .map_err(|e| bad_request(ErrorCode::ValidationFailed, e.message()))?;

    let storage = service.get_storage(request);
    let entries = storage
        .list_revenue_entries(range.start_ts(), range.end_ts_exclusive(), None)
        .await
        .map_err(|e| storage_error(e, "查询收入记录失败"))?;

    Ok(RevenueReport::build(&range, &entries, TOP_COURSES))
}

pub async fn revenue_report(
    service: &AdminService,
    params: RevenueReportParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    match build_report(service, &params, request).await {
        Ok(report) => Ok(HttpResponse::Ok().json(ApiResponse::success(report, "查询成功"))),
        Err(resp) => Ok(resp),
    }
}

/// 报表拆成三张表；CSV 只包含按日明细
fn report_sheets(report: &RevenueReport) -> Vec<Sheet> {
    let mut daily = Sheet::new("Daily", &["Date", "Revenue", "Transactions"]);
    for day in &report.daily {
        daily.push(vec![day.date.as_str().into(), day.revenue.into(), day.transactions.into()]);
    }

    let mut summary = Sheet::new("Summary", &["Metric", "Value"]);
    summary.push(vec!["From".into(), report.from.as_str().into()]);
    summary.push(vec!["To".into(), report.to.as_str().into()]);
    summary.push(vec!["Total revenue".into(), report.total_revenue.into()]);
    summary.push(vec!["Transactions".into(), report.transaction_count.into()]);
    summary.push(vec!["Average amount".into(), report.average_amount.into()]);

    let mut courses = Sheet::new("Courses", &["Course ID", "Course", "Teacher", "Revenue", "Transactions"]);
    for course in &report.top_courses {
        courses.push(vec![
            course.course_id.into(),
            course.course_title.as_str().into(),
            course.teacher_name.as_str().into(),
            course.revenue.into(),
            course.transactions.into(),
        ]);
    }

    vec![daily, summary, courses]
}

pub async fn export_revenue_report(
    service: &AdminService,
    params: RevenueReportParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    match build_report(service, &params, request).await {
        Ok(report) => {
            let name = format!("revenue_{}_{}", report.from, report.to);
            Ok(export::download(&name, params.format, &report_sheets(&report)))
        }
        Err(resp) => Ok(resp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reports::DailyRevenue;

    #[test]
    fn test_daily_sheet_comes_first() {
        let report = RevenueReport {
            from: "2025-03-01".into(),
            to: "2025-03-02".into(),
            total_revenue: 100,
            transaction_count: 1,
            average_amount: 100.0,
            by_teacher: vec![],
            top_courses: vec![],
            daily: vec![
                DailyRevenue {
                    date: "2025-03-01".into(),
                    revenue: 100,
                    transactions: 1,
                },
                DailyRevenue {
                    date: "2025-03-02".into(),
                    revenue: 0,
                    transactions: 0,
                },
            ],
        };
        let sheets = report_sheets(&report);
        assert_eq!(sheets[0].name, "Daily");
        assert_eq!(sheets[0].rows.len(), 2);
        assert_eq!(sheets[1].rows.len(), 5);
    }
}
