// ==========================================
// 项目资源负载优化引擎 - 负载预测引擎
// ==========================================
// 职责: 在当前负载画像上叠加假设的新任务,输出预测画像与差异
// 输入: 当前画像 + 资源 + 新任务 + 查询窗口
// 输出: PredictionOutcome（预测画像 / 预测系统负载 / 差异）
// 约定: 新任务工时按其自身区间内的"工作日"均摊（与计算引擎的日历天口径不同）
// ==========================================

use crate::domain::calendar::working_days;
use crate::domain::load::{round2, ResourceLoadProfile, SystemLoadProfile};
use crate::domain::optimization::{PredictionDiff, ResourceLoadDiff};
use crate::domain::resource::Resource;
use crate::domain::task::Task;
use crate::domain::types::ResourceId;
use crate::engine::error::{ensure_chronological, EngineResult};
use crate::engine::load_analyzer::{system_average_load, LoadAnalyzer};
use crate::engine::workload_calculator::WorkloadCalculator;
use chrono::NaiveDate;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// 预测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionOutcome {
    pub predicted_profiles: Vec<ResourceLoadProfile>,
    pub predicted_system: Vec<SystemLoadProfile>,
    pub diff: PredictionDiff,
}

// ==========================================
// PredictionEngine - 负载预测引擎
// ==========================================
pub struct PredictionEngine {
    calculator: WorkloadCalculator,
    analyzer: LoadAnalyzer,
}

impl PredictionEngine {
    pub fn new() -> Self {
        Self {
            calculator: WorkloadCalculator::new(),
            analyzer: LoadAnalyzer::new(),
        }
    }

    /// 预测新任务对负载的影响
    ///
    /// 规则:
    /// 1) 新任务按 resource_id 定位目标画像；当前无画像时以空负载新建
    /// 2) 工时均摊到任务自身区间的工作日；落在窗口外的日期忽略
    /// 3) 受影响画像按工作日重算 avg/max,随后重建系统日负载
    /// 4) 差异按资源逐一比较,附带系统平均负载前后对比
    ///
    /// 无目标资源、目标不在资源列表中、区间内无工作日的新任务: 记 warn 后跳过
    #[instrument(skip(self, current_profiles, resources, new_tasks), fields(
        profiles_count = current_profiles.len(),
        new_tasks_count = new_tasks.len()
    ))]
    pub fn predict(
        &self,
        current_profiles: &[ResourceLoadProfile],
        resources: &[Resource],
        new_tasks: &[Task],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> EngineResult<PredictionOutcome> {
        ensure_chronological(start_date, end_date)?;

        let mut predicted: Vec<ResourceLoadProfile> = current_profiles.to_vec();
        let mut position_by_resource: HashMap<ResourceId, usize> = HashMap::new();
        for (idx, profile) in predicted.iter().enumerate() {
            position_by_resource.entry(profile.resource_id).or_insert(idx);
        }
        let resource_by_id: HashMap<ResourceId, &Resource> =
            resources.iter().map(|r| (r.id, r)).collect();

        for task in new_tasks {
            let Some(resource_id) = task.resource_id else {
                warn!(task_id = task.id, "新任务未指定资源,忽略");
                continue;
            };

            let idx = match position_by_resource.get(&resource_id).copied() {
                Some(idx) => idx,
                None => {
                    let Some(resource) = resource_by_id.get(&resource_id).copied() else {
                        warn!(task_id = task.id, resource_id, "新任务的目标资源不存在,忽略");
                        continue;
                    };
                    let empty =
                        self.calculator
                            .compute_resource_load(&[], resource, start_date, end_date)?;
                    predicted.push(empty);
                    position_by_resource.insert(resource_id, predicted.len() - 1);
                    predicted.len() - 1
                }
            };

            let span_working_days = working_days(task.start_date, task.end_date);
            if span_working_days.is_empty() {
                warn!(
                    task_id = task.id,
                    start = %task.start_date,
                    end = %task.end_date,
                    "数据异常: 新任务区间内无工作日,忽略"
                );
                continue;
            }
            let daily_hours = task.total_hours() / span_working_days.len() as f64;

            let profile = &mut predicted[idx];
            let mut applied_days = 0;
            for date in span_working_days
                .into_iter()
                .filter(|d| *d >= start_date && *d <= end_date)
            {
                if let Some(day) = profile.load_on_mut(date) {
                    day.add_hours(task.id, daily_hours);
                    applied_days += 1;
                }
            }
            profile.recompute_stats();

            debug!(task_id = task.id, resource_id, daily_hours, applied_days, "新任务已叠加");
        }

        let system_before = self.analyzer.aggregate(current_profiles, start_date, end_date)?;
        let predicted_system = self.analyzer.aggregate(&predicted, start_date, end_date)?;

        let mut before_by_resource: HashMap<ResourceId, &ResourceLoadProfile> = HashMap::new();
        for profile in current_profiles {
            before_by_resource.entry(profile.resource_id).or_insert(profile);
        }
        let resource_diffs: Vec<ResourceLoadDiff> = predicted
            .iter()
            .map(|after| {
                let before = before_by_resource.get(&after.resource_id).copied();
                diff_profile(before, after)
            })
            .collect();

        let before_avg = system_average_load(&system_before);
        let after_avg = system_average_load(&predicted_system);

        info!(
            system_avg_before = before_avg,
            system_avg_after = after_avg,
            "负载预测完成"
        );

        Ok(PredictionOutcome {
            predicted_profiles: predicted,
            predicted_system,
            diff: PredictionDiff {
                resources: resource_diffs,
                system_avg_load_before: before_avg,
                system_avg_load_after: after_avg,
                system_avg_load_diff: round2(after_avg - before_avg),
            },
        })
    }
}

/// 单个资源的前后差异（无当前画像时按空负载比较）
fn diff_profile(before: Option<&ResourceLoadProfile>, after: &ResourceLoadProfile) -> ResourceLoadDiff {
    let (avg_before, max_before, overloaded_before) = before
        .map(|p| (p.avg_load, p.max_load, p.overloaded_days()))
        .unwrap_or((0.0, 0.0, 0));

    ResourceLoadDiff {
        resource_id: after.resource_id,
        resource_name: after.resource_name.clone(),
        avg_load_before: avg_before,
        avg_load_after: after.avg_load,
        avg_load_diff: round2(after.avg_load - avg_before),
        max_load_before: max_before,
        max_load_after: after.max_load,
        max_load_diff: round2(after.max_load - max_before),
        overloaded_days_before: overloaded_before,
        overloaded_days_after: after.overloaded_days(),
    }
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::new()
    }
}
