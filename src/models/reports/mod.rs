//! 看板与统计报表

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::ExportFormat;

/// 管理后台首页
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct AdminDashboard {
    pub total_users: i64,
    pub total_teachers: i64,
    pub total_students: i64,
    pub total_categories: i64,
    pub total_courses: i64,
    pub active_courses: i64,
    pub pending_courses: i64,
    pub rejected_courses: i64,
    pub total_enrollments: i64,
    pub total_revenue: i64,
    pub revenue_this_month: i64,
    pub revenue_this_week: i64,
    /// pending + waiting_confirm
    pub pending_payments: i64,
    pub new_users_this_week: i64,
    pub new_courses_this_week: i64,
}

/// 公开首页统计，只计上架课程
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct HomeStatistics {
    /// 上架课程的有效选课数
    pub total_students: i64,
    pub total_courses: i64,
    pub published_courses: i64,
    pub total_lessons: i64,
    pub total_teachers: i64,
    pub new_courses_this_month: i64,
}

/// 时间窗口起点（unix 秒）
#[derive(Debug, Clone, Copy)]
pub struct DashboardWindow {
    pub week_start: i64,
    pub month_start: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
    pub percentage: f64,
}

/// 按状态计数并计算占比
pub fn status_breakdown(counts: Vec<(String, i64)>) -> Vec<StatusCount> {
    let total: i64 = counts.iter().map(|(_, c)| *c).sum();
    counts
        .into_iter()
        .map(|(status, count)| StatusCount {
            status,
            count,
            percentage: if total == 0 {
                0.0
            } else {
                (count as f64 / total as f64 * 10000.0).round() / 100.0
            },
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct SystemHealth {
    pub users: Vec<StatusCount>,
    pub courses: Vec<StatusCount>,
    pub payments: Vec<StatusCount>,
    pub database_backend: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: i64,
    pub online_notification_sockets: i64,
    pub active_live_rooms: i64,
}

/// 各状态的原始计数
#[derive(Debug, Clone, Default)]
pub struct HealthCounts {
    pub users: Vec<(String, i64)>,
    pub courses: Vec<(String, i64)>,
    pub payments: Vec<(String, i64)>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct RevenueReportParams {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct TeacherRevenue {
    pub teacher_id: i64,
    pub teacher_name: String,
    pub revenue: i64,
    pub transactions: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct CourseRevenue {
    pub course_id: i64,
    pub course_title: String,
    pub teacher_name: String,
    pub revenue: i64,
    pub transactions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct DailyRevenue {
    /// YYYY-MM-DD
    pub date: String,
    pub revenue: i64,
    pub transactions: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct RevenueReport {
    pub from: String,
    pub to: String,
    pub total_revenue: i64,
    pub transaction_count: i64,
    pub average_amount: f64,
    pub by_teacher: Vec<TeacherRevenue>,
    pub top_courses: Vec<CourseRevenue>,
    pub daily: Vec<DailyRevenue>,
}

/// 一笔成功支付及其归属，用于收入统计
#[derive(Debug, Clone)]
pub struct RevenueEntry {
    pub course_id: i64,
    pub course_title: String,
    pub teacher_id: i64,
    pub teacher_name: String,
    pub amount: i64,
    pub paid_at: i64,
}

impl RevenueReport {
    /// 在内存中汇总区间内的成功支付
    pub fn build(
        range: &crate::utils::date_range::DateRange,
        entries: &[RevenueEntry],
        top_n: usize,
    ) -> Self {
        use std::collections::{BTreeMap, HashMap};

        let total_revenue: i64 = entries.iter().map(|e| e.amount).sum();
        let transaction_count = entries.len() as i64;
        let average_amount = if transaction_count == 0 {
            0.0
        } else {
            (total_revenue as f64 / transaction_count as f64 * 100.0).round() / 100.0
        };

        let mut teachers: HashMap<i64, TeacherRevenue> = HashMap::new();
        let mut courses: HashMap<i64, CourseRevenue> = HashMap::new();
        let mut days: BTreeMap<String, DailyRevenue> = range
            .days()
            .map(|d| {
                let date = d.format(crate::utils::date_range::DATE_FORMAT).to_string();
                (
                    date.clone(),
                    DailyRevenue {
                        date,
                        revenue: 0,
                        transactions: 0,
                    },
                )
            })
            .collect();

        for entry in entries {
            let teacher = teachers
                .entry(entry.teacher_id)
                .or_insert_with(|| TeacherRevenue {
                    teacher_id: entry.teacher_id,
                    teacher_name: entry.teacher_name.clone(),
                    revenue: 0,
                    transactions: 0,
                });
            teacher.revenue += entry.amount;
            teacher.transactions += 1;

            let course = courses
                .entry(entry.course_id)
                .or_insert_with(|| CourseRevenue {
                    course_id: entry.course_id,
                    course_title: entry.course_title.clone(),
                    teacher_name: entry.teacher_name.clone(),
                    revenue: 0,
                    transactions: 0,
                });
            course.revenue += entry.amount;
            course.transactions += 1;

            if let Some(ts) = chrono::DateTime::<chrono::Utc>::from_timestamp(entry.paid_at, 0) {
                let date = ts.format(crate::utils::date_range::DATE_FORMAT).to_string();
                if let Some(day) = days.get_mut(&date) {
                    day.revenue += entry.amount;
                    day.transactions += 1;
                }
            }
        }

        let mut by_teacher: Vec<TeacherRevenue> = teachers.into_values().collect();
        by_teacher.sort_by(|a, b| b.revenue.cmp(&a.revenue).then(a.teacher_id.cmp(&b.teacher_id)));
        let mut top_courses: Vec<CourseRevenue> = courses.into_values().collect();
        top_courses.sort_by(|a, b| b.revenue.cmp(&a.revenue).then(a.course_id.cmp(&b.course_id)));
        top_courses.truncate(top_n);

        Self {
            from: range.from.format(crate::utils::date_range::DATE_FORMAT).to_string(),
            to: range.to.format(crate::utils::date_range::DATE_FORMAT).to_string(),
            total_revenue,
            transaction_count,
            average_amount,
            by_teacher,
            top_courses,
            daily: days.into_values().collect(),
        }
    }
}

/// 截至 `today` 所在月的最近 `months` 个自然月，旧的在前，未出现的月份补 0
pub fn monthly_revenue(
    today: chrono::NaiveDate,
    months: u32,
    entries: &[RevenueEntry],
) -> Vec<MonthlyRevenue> {
    use chrono::{Datelike, Months};

    let first_of_month = today.with_day(1).unwrap_or(today);
    let mut series: Vec<MonthlyRevenue> = (0..months)
        .rev()
        .filter_map(|back| first_of_month.checked_sub_months(Months::new(back)))
        .map(|d| MonthlyRevenue {
            month: d.format("%Y-%m").to_string(),
            revenue: 0,
        })
        .collect();

    for entry in entries {
        if let Some(ts) = chrono::DateTime::<chrono::Utc>::from_timestamp(entry.paid_at, 0) {
            let month = ts.format("%Y-%m").to_string();
            if let Some(slot) = series.iter_mut().find(|m| m.month == month) {
                slot.revenue += entry.amount;
            }
        }
    }
    series
}

/// 教师工作台首页
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct TeacherDashboard {
    pub total_courses: i64,
    pub active_courses: i64,
    pub pending_courses: i64,
    pub active_students: i64,
    pub total_revenue: i64,
    pub follower_count: i64,
    pub recent_enrollments: Vec<RecentEnrollment>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct RecentEnrollment {
    pub enrollment_id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub course_id: i64,
    pub course_title: String,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct CoursePerformance {
    pub course_id: i64,
    pub title: String,
    pub status: String,
    pub students: i64,
    pub revenue: i64,
    pub average_progress: f64,
    pub lesson_count: i64,
    pub quiz_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct MonthlyRevenue {
    /// YYYY-MM
    pub month: String,
    pub revenue: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct TeacherReport {
    pub top_courses: Vec<CoursePerformance>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

/// 单门课程的统计
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct CourseStats {
    pub course_id: i64,
    pub active_students: i64,
    pub completed_students: i64,
    pub average_progress: f64,
    pub revenue: i64,
    pub lesson_count: i64,
    pub quiz_count: i64,
    pub quiz_attempts: i64,
    pub average_quiz_score: f64,
    pub favorite_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_breakdown_percentages() {
        let rows = status_breakdown(vec![
            ("active".into(), 2),
            ("pending".into(), 1),
            ("rejected".into(), 0),
        ]);
        assert_eq!(rows[0].percentage, 66.67);
        assert_eq!(rows[1].percentage, 33.33);
        assert_eq!(rows[2].percentage, 0.0);
    }

    fn entry(course_id: i64, teacher_id: i64, amount: i64, paid_at: &str) -> RevenueEntry {
        let ts = chrono::NaiveDateTime::parse_from_str(paid_at, "%Y-%m-%d %H:%M")
            .unwrap()
            .and_utc()
            .timestamp();
        RevenueEntry {
            course_id,
            course_title: format!("Course {course_id}"),
            teacher_id,
            teacher_name: format!("Teacher {teacher_id}"),
            amount,
            paid_at: ts,
        }
    }

    #[test]
    fn test_revenue_report_aggregation() {
        use crate::utils::date_range::resolve_range;

        let range = resolve_range(Some("2025-03-01"), Some("2025-03-03"), chrono::NaiveDate::MIN, 30)
            .unwrap();
        let entries = vec![
            entry(1, 10, 5000, "2025-03-01 09:00"),
            entry(1, 10, 5000, "2025-03-03 23:59"),
            entry(2, 11, 2000, "2025-03-03 10:00"),
        ];
        let report = RevenueReport::build(&range, &entries, 10);

        assert_eq!(report.total_revenue, 12000);
        assert_eq!(report.transaction_count, 3);
        assert_eq!(report.average_amount, 4000.0);
        assert_eq!(report.by_teacher[0].teacher_id, 10);
        assert_eq!(report.top_courses[0].revenue, 10000);
        assert_eq!(report.daily.len(), 3);
        assert_eq!(report.daily[1].revenue, 0);
        assert_eq!(report.daily[2].transactions, 2);
    }

    #[test]
    fn test_monthly_revenue_zero_filled() {
        let today = chrono::NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let entries = vec![
            entry(1, 10, 300, "2025-01-20 08:00"),
            entry(1, 10, 700, "2025-03-01 00:00"),
            entry(1, 10, 999, "2024-09-30 12:00"),
        ];
        let series = monthly_revenue(today, 6, &entries);
        let months: Vec<&str> = series.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(
            months,
            vec!["2024-10", "2024-11", "2024-12", "2025-01", "2025-02", "2025-03"]
        );
        assert_eq!(series[3].revenue, 300);
        assert_eq!(series[4].revenue, 0);
        assert_eq!(series[5].revenue, 700);
    }

    #[test]
    fn test_status_breakdown_empty_total() {
        let rows = status_breakdown(vec![("active".into(), 0)]);
        assert_eq!(rows[0].percentage, 0.0);
    }
}
