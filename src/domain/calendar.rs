// ==========================================
// 项目资源负载优化引擎 - 日历工具
// ==========================================
// 职责: 日历天/工作日计数与遍历
// 约定: 任务自身工作量按"日历天"摊分,负载均值按"工作日"统计
// ==========================================

use chrono::{Datelike, NaiveDate, Weekday};

/// 两个日期之间相差的天数（end - start）
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// 闭区间 [start, end] 的日历天数，至少按 1 天计
///
/// 零长度/倒置的任务区间视为 1 天，避免除零
pub fn span_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (days_between(start, end) + 1).max(1)
}

/// 是否工作日（周六、周日以外）
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 遍历闭区间 [start, end] 内的每个日历天
///
/// start > end 时不产生任何日期
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// 闭区间 [start, end] 内的工作日
pub fn working_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    date_range(start, end).filter(|d| is_working_day(*d)).collect()
}
