// ==========================================
// 项目资源负载优化引擎 - 负载领域模型
// ==========================================
// 职责: 日负载 / 资源负载画像 / 系统负载画像
// 红线: loadByDate 必须覆盖查询窗口内每个日历天
// ==========================================

use crate::domain::calendar::is_working_day;
use crate::domain::types::{ResourceId, TaskId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 原始过载判定线（负载百分比）
pub const RAW_OVERLOAD_PCT: f64 = 100.0;

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 负载百分比 = 工时 / 日产能 * 100（产能无效时为 0）
pub fn load_percent(work_hours: f64, daily_capacity: f64) -> f64 {
    if !daily_capacity.is_finite() || daily_capacity <= 0.0 {
        return 0.0;
    }
    round2(work_hours / daily_capacity * 100.0)
}

// ==========================================
// DailyLoad - 日负载
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLoad {
    pub date: NaiveDate,
    pub work_hours: f64,
    pub capacity: f64,      // 当日产能（小时）
    pub load_percent: f64,  // round2(work_hours / capacity * 100)
    pub task_ids: Vec<TaskId>,
}

// ==========================================
// Trait: LoadConstraint
// ==========================================
// 用途: 推荐/预测引擎的负载约束检查接口
pub trait LoadConstraint {
    /// 是否超过原始过载线（> 100%）
    fn is_overloaded(&self) -> bool;

    /// 叠加 extra_hours 后的负载百分比
    fn load_percent_with(&self, extra_hours: f64) -> f64;

    /// 叠加 extra_hours 后是否仍不超过阈值
    fn can_absorb(&self, extra_hours: f64, threshold_pct: f64) -> bool;
}

impl LoadConstraint for DailyLoad {
    fn is_overloaded(&self) -> bool {
        self.load_percent > RAW_OVERLOAD_PCT
    }

    fn load_percent_with(&self, extra_hours: f64) -> f64 {
        load_percent(self.work_hours + extra_hours, self.capacity)
    }

    /// 产能无效的日负载不接收任何转入
    fn can_absorb(&self, extra_hours: f64, threshold_pct: f64) -> bool {
        if !self.capacity.is_finite() || self.capacity <= 0.0 {
            return false;
        }
        self.load_percent + extra_hours / self.capacity * 100.0 <= threshold_pct
    }
}

impl DailyLoad {
    /// 追加工时并重算负载百分比
    pub fn add_hours(&mut self, task_id: TaskId, hours: f64) {
        self.work_hours += hours;
        self.load_percent = load_percent(self.work_hours, self.capacity);
        self.task_ids.push(task_id);
    }
}

// ==========================================
// ResourceLoadProfile - 资源负载画像
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLoadProfile {
    pub resource_id: ResourceId,
    pub resource_name: String,
    pub resource_type: String,
    pub capacity: f64,                // 日产能（小时/天）
    pub load_by_date: Vec<DailyLoad>, // 覆盖 [start, end] 每个日历天
    pub avg_load: f64,                // 仅工作日
    pub max_load: f64,                // 仅工作日
}

impl ResourceLoadProfile {
    /// load_by_date 按日历天连续排列,下标 = 与首日的天数差
    fn day_index(&self, date: NaiveDate) -> Option<usize> {
        let first = self.load_by_date.first()?.date;
        let offset = usize::try_from((date - first).num_days()).ok()?;
        match self.load_by_date.get(offset) {
            Some(day) if day.date == date => Some(offset),
            // 非连续数据（如反序列化输入）回退线性查找
            _ => self.load_by_date.iter().position(|d| d.date == date),
        }
    }

    /// 查询指定日期的日负载
    pub fn load_on(&self, date: NaiveDate) -> Option<&DailyLoad> {
        let idx = self.day_index(date)?;
        self.load_by_date.get(idx)
    }

    /// 查询指定日期的日负载（可变）
    pub fn load_on_mut(&mut self, date: NaiveDate) -> Option<&mut DailyLoad> {
        let idx = self.day_index(date)?;
        self.load_by_date.get_mut(idx)
    }

    /// 负载 > 100% 的天数
    pub fn overloaded_days(&self) -> usize {
        self.load_by_date.iter().filter(|d| d.is_overloaded()).count()
    }

    /// 负载 > 100% 的日期
    pub fn overloaded_dates(&self) -> Vec<NaiveDate> {
        self.load_by_date
            .iter()
            .filter(|d| d.is_overloaded())
            .map(|d| d.date)
            .collect()
    }

    /// 按工作日重算 avg_load / max_load（无工作日时均为 0）
    pub fn recompute_stats(&mut self) {
        let (avg, max) = working_day_stats(&self.load_by_date);
        self.avg_load = avg;
        self.max_load = max;
    }
}

/// 工作日负载统计: (平均, 最大)
pub fn working_day_stats(days: &[DailyLoad]) -> (f64, f64) {
    let working: Vec<f64> = days
        .iter()
        .filter(|d| is_working_day(d.date))
        .map(|d| d.load_percent)
        .collect();

    if working.is_empty() {
        return (0.0, 0.0);
    }

    let avg = working.iter().sum::<f64>() / working.len() as f64;
    let max = working.iter().copied().fold(f64::MIN, f64::max);
    (round2(avg), round2(max))
}

// ==========================================
// SystemLoadProfile - 系统日负载
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemLoadProfile {
    pub date: NaiveDate,
    pub average_load: f64,      // 当日所有资源 load_percent 的算术平均
    pub overloaded_count: usize, // 当日负载 > 100% 的资源数
    pub resource_count: usize,
}
