// ==========================================
// 项目资源负载优化引擎 - 工作负载计算引擎
// ==========================================
// 职责: 任务 + 资源 + 日期窗口 → 每日负载画像
// 输入: 资源的任务列表 / 资源 / [start, end]
// 输出: ResourceLoadProfile（覆盖窗口内每个日历天）
// 约定: 任务日工时 = 总工时 / 任务自身日历天数（至少 1）
// ==========================================

use crate::domain::calendar::date_range;
use crate::domain::load::{
    load_percent, working_day_stats, DailyLoad, ResourceLoadProfile,
};
use crate::domain::resource::Resource;
use crate::domain::task::Task;
use crate::domain::types::ResourceId;
use crate::engine::error::{ensure_chronological, EngineResult};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

// ==========================================
// WorkloadCalculator - 工作负载计算引擎
// ==========================================
// 红线: 无状态引擎,所有方法都是纯函数
pub struct WorkloadCalculator {
    // 无状态引擎，不需要注入依赖
}

impl WorkloadCalculator {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算单个资源的负载画像
    ///
    /// 规则:
    /// 1) 遍历 [start, end] 每个日历天
    /// 2) 当日活跃任务: task.start_date <= d <= task.end_date
    /// 3) 日工时累加 → work_hours; load_percent = round2(work_hours / daily_capacity * 100)
    /// 4) avg_load / max_load 仅统计工作日
    ///
    /// # 参数
    /// - `tasks`: 该资源的任务（调用方负责按资源预先分组）
    /// - `resource`: 资源
    /// - `start_date` / `end_date`: 查询窗口（闭区间）
    ///
    /// # 返回
    /// - Ok(ResourceLoadProfile)
    /// - Err(EngineError::InvalidDateRange): start > end
    #[instrument(skip(self, tasks, resource), fields(
        resource_id = resource.id,
        tasks_count = tasks.len()
    ))]
    pub fn compute_resource_load(
        &self,
        tasks: &[&Task],
        resource: &Resource,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> EngineResult<ResourceLoadProfile> {
        ensure_chronological(start_date, end_date)?;

        if !resource.has_valid_daily_capacity() {
            warn!(
                resource_id = resource.id,
                daily_capacity = resource.daily_capacity,
                "数据异常: 日产能无效,负载百分比按 0 计"
            );
        }

        // 只保留与窗口有交集的任务
        let in_window: Vec<&Task> = tasks
            .iter()
            .copied()
            .filter(|t| t.overlaps(start_date, end_date))
            .collect();

        let load_by_date: Vec<DailyLoad> = date_range(start_date, end_date)
            .map(|date| {
                let mut work_hours = 0.0;
                let mut task_ids = Vec::new();
                for task in in_window.iter().filter(|t| t.is_active_on(date)) {
                    work_hours += task.daily_hours();
                    task_ids.push(task.id);
                }
                DailyLoad {
                    date,
                    work_hours,
                    capacity: resource.daily_capacity,
                    load_percent: load_percent(work_hours, resource.daily_capacity),
                    task_ids,
                }
            })
            .collect();

        let (avg_load, max_load) = working_day_stats(&load_by_date);

        debug!(
            days = load_by_date.len(),
            avg_load, max_load, "资源负载计算完成"
        );

        Ok(ResourceLoadProfile {
            resource_id: resource.id,
            resource_name: resource.name.clone(),
            resource_type: resource.resource_type.clone(),
            capacity: resource.daily_capacity,
            load_by_date,
            avg_load,
            max_load,
        })
    }

    /// 批量计算多个资源的负载画像
    ///
    /// 任务按 resource_id 一次性建索引（O(T+R)），避免每个资源重复过滤全量任务。
    /// 未分配资源或分配给列表外资源的任务不计入任何画像。
    ///
    /// # 返回
    /// 与 `resources` 顺序一致的画像列表
    pub fn compute_all(
        &self,
        tasks: &[Task],
        resources: &[Resource],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> EngineResult<Vec<ResourceLoadProfile>> {
        ensure_chronological(start_date, end_date)?;

        let index = index_tasks_by_resource(tasks);
        let empty: Vec<&Task> = Vec::new();

        resources
            .iter()
            .map(|resource| {
                let resource_tasks = index.get(&resource.id).unwrap_or(&empty);
                self.compute_resource_load(resource_tasks, resource, start_date, end_date)
            })
            .collect()
    }
}

/// 按 resource_id 对任务建索引
pub fn index_tasks_by_resource(tasks: &[Task]) -> HashMap<ResourceId, Vec<&Task>> {
    let mut index: HashMap<ResourceId, Vec<&Task>> = HashMap::new();
    for task in tasks {
        if let Some(resource_id) = task.resource_id {
            index.entry(resource_id).or_default().push(task);
        }
    }
    index
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for WorkloadCalculator {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::days_between;
    use crate::domain::types::{Priority, Workload};
    use std::collections::BTreeSet;

    // ==========================================
    // 测试辅助函数
    // ==========================================

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    fn create_test_resource(id: ResourceId, daily_capacity: f64) -> Resource {
        Resource {
            id,
            name: format!("R{}", id),
            resource_type: "developer".to_string(),
            skills: BTreeSet::new(),
            capacity: daily_capacity * 5.0,
            daily_capacity,
            team_id: None,
            is_active: true,
        }
    }

    fn create_test_task(
        id: i64,
        resource_id: ResourceId,
        start: NaiveDate,
        end: NaiveDate,
        effort: f64,
    ) -> Task {
        Task {
            id,
            name: format!("T{}", id),
            start_date: start,
            end_date: end,
            workload: Workload::Effort { total_hours: effort },
            priority: Priority::Medium,
            required_skills: BTreeSet::new(),
            resource_type: None,
            is_fixed: false,
            resource_id: Some(resource_id),
            project_id: None,
        }
    }

    // ==========================================
    // 基础功能测试
    // ==========================================

    #[test]
    fn test_three_day_task_full_capacity() {
        // 2026-01-19 周一 ~ 01-21 周三, effort=24 → 每天 8h = 100%
        let calc = WorkloadCalculator::new();
        let resource = create_test_resource(1, 8.0);
        let task = create_test_task(1, 1, d(1, 19), d(1, 21), 24.0);

        let profile = calc
            .compute_resource_load(&[&task], &resource, d(1, 19), d(1, 21))
            .unwrap();

        assert_eq!(profile.load_by_date.len(), 3);
        for day in &profile.load_by_date {
            assert_eq!(day.work_hours, 8.0);
            assert_eq!(day.load_percent, 100.0);
            assert_eq!(day.task_ids, vec![1]);
        }
        assert_eq!(profile.avg_load, 100.0);
        assert_eq!(profile.max_load, 100.0);
    }

    #[test]
    fn test_length_covers_every_calendar_day() {
        let calc = WorkloadCalculator::new();
        let resource = create_test_resource(1, 8.0);

        for (start, end) in [(d(1, 1), d(1, 1)), (d(1, 1), d(1, 31)), (d(2, 20), d(3, 10))] {
            let profile = calc.compute_resource_load(&[], &resource, start, end).unwrap();
            assert_eq!(
                profile.load_by_date.len() as i64,
                days_between(start, end) + 1
            );
        }
    }

    #[test]
    fn test_task_daily_hours_sum_to_effort() {
        // 任务区间完全落在窗口内时,日工时之和 == effort
        let calc = WorkloadCalculator::new();
        let resource = create_test_resource(1, 8.0);
        let task = create_test_task(1, 1, d(1, 5), d(1, 11), 37.0);

        let profile = calc
            .compute_resource_load(&[&task], &resource, d(1, 1), d(1, 31))
            .unwrap();

        let total: f64 = profile.load_by_date.iter().map(|x| x.work_hours).sum();
        assert!((total - 37.0).abs() <= 0.01);
    }

    #[test]
    fn test_weekend_excluded_from_stats() {
        // 周六 01-24 ~ 周日 01-25 全是周末 → avg/max = 0
        let calc = WorkloadCalculator::new();
        let resource = create_test_resource(1, 8.0);
        let task = create_test_task(1, 1, d(1, 24), d(1, 25), 32.0);

        let profile = calc
            .compute_resource_load(&[&task], &resource, d(1, 24), d(1, 25))
            .unwrap();

        assert_eq!(profile.load_by_date[0].load_percent, 200.0);
        assert_eq!(profile.avg_load, 0.0);
        assert_eq!(profile.max_load, 0.0);
    }

    #[test]
    fn test_zero_daily_capacity_is_anomaly_not_crash() {
        let calc = WorkloadCalculator::new();
        let resource = create_test_resource(1, 0.0);
        let task = create_test_task(1, 1, d(1, 19), d(1, 19), 8.0);

        let profile = calc
            .compute_resource_load(&[&task], &resource, d(1, 19), d(1, 19))
            .unwrap();

        assert_eq!(profile.load_by_date[0].work_hours, 8.0);
        assert_eq!(profile.load_by_date[0].load_percent, 0.0);
    }

    #[test]
    fn test_reversed_range_rejected() {
        let calc = WorkloadCalculator::new();
        let resource = create_test_resource(1, 8.0);
        assert!(calc
            .compute_resource_load(&[], &resource, d(1, 20), d(1, 19))
            .is_err());
    }

    #[test]
    fn test_compute_all_indexes_by_resource() {
        let calc = WorkloadCalculator::new();
        let resources = vec![create_test_resource(1, 8.0), create_test_resource(2, 8.0)];
        let mut unassigned = create_test_task(3, 1, d(1, 19), d(1, 19), 8.0);
        unassigned.resource_id = None;
        let tasks = vec![
            create_test_task(1, 1, d(1, 19), d(1, 19), 4.0),
            create_test_task(2, 2, d(1, 19), d(1, 19), 8.0),
            unassigned,
        ];

        let profiles = calc.compute_all(&tasks, &resources, d(1, 19), d(1, 19)).unwrap();

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].load_by_date[0].load_percent, 50.0);
        assert_eq!(profiles[1].load_by_date[0].load_percent, 100.0);
        assert_eq!(profiles[1].load_by_date[0].task_ids, vec![2]);
    }
}
