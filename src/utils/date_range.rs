//! `YYYY-MM-DD` 日期区间解析，两端均为闭区间

use chrono::{Days, NaiveDate, TimeZone, Utc};

use crate::errors::{LearnHubError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// 报表按日展开，区间上限一年（含闰年）
pub const MAX_REPORT_DAYS: i64 = 366;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(LearnHubError::validation(format!(
                "Start date {from} is after end date {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// 起始日 00:00:00 UTC 的时间戳
    pub fn start_ts(&self) -> i64 {
        day_start(self.from)
    }

    /// 结束日次日 00:00:00 UTC 的时间戳（不含）
    pub fn end_ts_exclusive(&self) -> i64 {
        day_start(next_day(self.to))
    }

    /// 含首尾的天数
    pub fn len_days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    /// 按天遍历区间
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let to = self.to;
        self.from.iter_days().take_while(move |d| *d <= to)
    }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

pub fn day_start(date: NaiveDate) -> i64 {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
        .timestamp()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| LearnHubError::date_parse(format!("Invalid date '{raw}': {e}")))
}

fn parse_optional(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_date(s).map(Some),
        None => Ok(None),
    }
}

/// 列表筛选用：任一端可缺省，返回 `[from_ts, to_ts)`
pub fn parse_bounds(from: Option<&str>, to: Option<&str>) -> Result<(Option<i64>, Option<i64>)> {
    let from = parse_optional(from)?;
    let to = parse_optional(to)?;
    if let (Some(f), Some(t)) = (from, to) {
        DateRange::new(f, t)?;
    }
    Ok((
        from.map(day_start),
        to.map(|t| day_start(next_day(t))),
    ))
}

/// 报表用：缺省为截至 `today` 的最近 `default_days` 天，最长 `MAX_REPORT_DAYS` 天
pub fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
    default_days: u64,
) -> Result<DateRange> {
    let to = parse_optional(to)?.unwrap_or(today);
    let from = match parse_optional(from)? {
        Some(f) => f,
        None => to
            .checked_sub_days(Days::new(default_days.saturating_sub(1)))
            .unwrap_or(to),
    };
    let range = DateRange::new(from, to)?;
    if range.len_days() > MAX_REPORT_DAYS {
        return Err(LearnHubError::validation(format!(
            "Report range spans {} days, the maximum is {MAX_REPORT_DAYS}",
            range.len_days()
        )));
    }
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-03-01").unwrap(), d(2025, 3, 1));
        assert!(parse_date("2025/03/01").is_err());
        assert!(parse_date("2025-02-30").is_err());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let (from, to) = parse_bounds(Some("2025-03-01"), Some("2025-03-01")).unwrap();
        let from = from.unwrap();
        let to = to.unwrap();
        assert_eq!(to - from, 86_400);
    }

    #[test]
    fn test_bounds_optional_and_ordered() {
        assert_eq!(parse_bounds(None, Some("")).unwrap(), (None, None));
        assert!(parse_bounds(Some("2025-03-02"), Some("2025-03-01")).is_err());
    }

    #[test]
    fn test_default_report_range() {
        let today = d(2025, 3, 31);
        let range = resolve_range(None, None, today, 30).unwrap();
        assert_eq!(range.from, d(2025, 3, 2));
        assert_eq!(range.to, today);
        assert_eq!(range.days().count(), 30);
    }

    #[test]
    fn test_explicit_report_range() {
        let range = resolve_range(Some("2025-01-01"), Some("2025-01-03"), d(2025, 6, 1), 30).unwrap();
        let days: Vec<_> = range.days().collect();
        assert_eq!(days, vec![d(2025, 1, 1), d(2025, 1, 2), d(2025, 1, 3)]);
        assert_eq!(range.end_ts_exclusive() - range.start_ts(), 3 * 86_400);
    }

    #[test]
    fn test_report_range_capped() {
        let today = d(2025, 6, 1);
        // 2024 为闰年，整年 366 天仍允许
        let leap_year = resolve_range(Some("2024-01-01"), Some("2024-12-31"), today, 30).unwrap();
        assert_eq!(leap_year.len_days(), MAX_REPORT_DAYS);

        let err = resolve_range(Some("2024-01-01"), Some("2025-01-01"), today, 30).unwrap_err();
        assert!(matches!(err, LearnHubError::Validation(_)), "{err:?}");
        assert!(resolve_range(Some("0001-01-01"), Some("9999-12-31"), today, 30).is_err());
    }
}
