// ==========================================
// 项目资源负载优化引擎 - 转移推荐引擎
// ==========================================
// 职责: 为过载资源上的可移动任务匹配闲置资源
// 输入: 分类结果 + 资源 + 任务 + 阈值
// 输出: Recommendation[]（顺序即持久化顺序）
// 红线: 目标资源在过载日叠加任务日工时后不得超过阈值
// ==========================================

use crate::domain::calendar::date_range;
use crate::domain::load::{round2, DailyLoad, LoadConstraint, ResourceLoadProfile};
use crate::domain::optimization::Recommendation;
use crate::domain::resource::Resource;
use crate::domain::task::Task;
use crate::domain::types::{ResourceId, TaskId};
use crate::engine::load_analyzer::LoadClassification;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// 候选目标（画像 + 资源）
struct Candidate<'a> {
    profile: &'a ResourceLoadProfile,
    resource: &'a Resource,
    load_after_pct: f64,
}

// ==========================================
// RecommendationEngine - 转移推荐引擎
// ==========================================
pub struct RecommendationEngine;

impl RecommendationEngine {
    pub fn new() -> Self {
        Self
    }

    /// 生成转移推荐
    ///
    /// 遍历顺序: 源资源（外层）→ 过载日（负载 > 100%）→ 当日任务（内层）
    ///
    /// 规则:
    /// 1) 只移动可移动任务: priority < High 且非固定
    /// 2) 候选目标: 闲置资源、同资源类型、技能覆盖、当日转入后负载 <= threshold
    /// 3) 候选中选 avg_load 最低者（并列取先出现者）
    /// 4) 无候选的任务静默跳过
    /// 5) 同一任务只推荐一次（取首个过载日）
    /// 6) 已推荐任务在其区间内的日工时计入目标资源负载（同批推荐不叠加超阈值）
    #[instrument(skip(self, classification, resources, tasks), fields(
        overloaded = classification.overloaded.len(),
        underutilized = classification.underutilized.len()
    ))]
    pub fn recommend(
        &self,
        classification: &LoadClassification,
        resources: &[Resource],
        tasks: &[Task],
        threshold: f64,
    ) -> Vec<Recommendation> {
        let resource_by_id: HashMap<ResourceId, &Resource> =
            resources.iter().map(|r| (r.id, r)).collect();
        let task_by_id: HashMap<TaskId, &Task> = tasks.iter().map(|t| (t.id, t)).collect();

        let mut recommendations = Vec::new();
        let mut recommended: HashSet<TaskId> = HashSet::new();
        let mut reserved: HashMap<(ResourceId, NaiveDate), f64> = HashMap::new();

        for source in &classification.overloaded {
            let Some(source_resource) = resource_by_id.get(&source.resource_id).copied() else {
                warn!(resource_id = source.resource_id, "过载资源不在资源列表中,跳过");
                continue;
            };

            for day in source.load_by_date.iter().filter(|d| d.is_overloaded()) {
                for task_id in &day.task_ids {
                    let Some(task) = task_by_id.get(task_id).copied() else {
                        continue;
                    };
                    if !task.is_movable() || recommended.contains(&task.id) {
                        continue;
                    }

                    let best = self.find_best_target(
                        task,
                        source_resource,
                        day,
                        classification,
                        &resource_by_id,
                        &reserved,
                        threshold,
                    );
                    match best {
                        Some(candidate) => {
                            // 任务整体转移: 在其区间内每天占用目标资源
                            for date in date_range(task.start_date, task.end_date) {
                                *reserved
                                    .entry((candidate.resource.id, date))
                                    .or_insert(0.0) += task.daily_hours();
                            }
                            recommendations.push(self.build_recommendation(
                                task,
                                source_resource,
                                day,
                                &candidate,
                            ));
                            recommended.insert(task.id);
                        }
                        None => {
                            debug!(
                                task_id = task.id,
                                date = %day.date,
                                "无可用目标资源,跳过该任务"
                            );
                        }
                    }
                }
            }
        }

        info!(count = recommendations.len(), "转移推荐生成完成");
        recommendations
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 在闲置资源中选出最佳目标
    fn find_best_target<'a>(
        &self,
        task: &Task,
        source_resource: &Resource,
        day: &DailyLoad,
        classification: &'a LoadClassification,
        resource_by_id: &HashMap<ResourceId, &'a Resource>,
        reserved: &HashMap<(ResourceId, NaiveDate), f64>,
        threshold: f64,
    ) -> Option<Candidate<'a>> {
        let required_type = task
            .resource_type
            .as_deref()
            .unwrap_or(source_resource.resource_type.as_str());
        let task_daily_hours = task.daily_hours();

        let mut best: Option<Candidate<'a>> = None;
        for target in &classification.underutilized {
            if target.resource_id == source_resource.id {
                continue;
            }
            let Some(target_resource) = resource_by_id.get(&target.resource_id).copied() else {
                continue;
            };
            if !target_resource.matches_type(Some(required_type))
                || !target_resource.has_skills(&task.required_skills)
            {
                continue;
            }
            let Some(target_day) = target.load_on(day.date) else {
                continue;
            };
            let incoming = reserved
                .get(&(target.resource_id, day.date))
                .copied()
                .unwrap_or(0.0)
                + task_daily_hours;
            if !target_day.can_absorb(incoming, threshold) {
                continue;
            }

            // 严格小于: 并列时保留先出现的候选
            let better = best
                .as_ref()
                .map_or(true, |b| target.avg_load < b.profile.avg_load);
            if better {
                best = Some(Candidate {
                    profile: target,
                    resource: target_resource,
                    load_after_pct: target_day.load_percent_with(incoming),
                });
            }
        }
        best
    }

    fn build_recommendation(
        &self,
        task: &Task,
        source_resource: &Resource,
        day: &DailyLoad,
        candidate: &Candidate<'_>,
    ) -> Recommendation {
        Recommendation {
            task_id: task.id,
            task_name: task.name.clone(),
            current_resource_id: source_resource.id,
            current_resource_name: source_resource.name.clone(),
            suggested_resource_id: candidate.resource.id,
            suggested_resource_name: candidate.resource.name.clone(),
            overload_date: day.date,
            expected_load_reduction: expected_load_reduction(task, source_resource),
            reason: format!(
                "{} 在 {} 负载 {:.2}% 超过 100%，建议将任务「{}」转移至 {}（平均负载 {:.2}%，转入后当日负载 {:.2}%）",
                source_resource.name,
                day.date,
                day.load_percent,
                task.name,
                candidate.resource.name,
                candidate.profile.avg_load,
                candidate.load_after_pct,
            ),
        }
    }
}

/// 预期负载下降 = round2(任务总工时 / 源资源周期产能 * 100)
pub fn expected_load_reduction(task: &Task, source_resource: &Resource) -> f64 {
    if !source_resource.has_valid_capacity() {
        warn!(
            resource_id = source_resource.id,
            capacity = source_resource.capacity,
            "数据异常: 资源周期产能无效,预期负载下降按 0 计"
        );
        return 0.0;
    }
    round2(task.total_hours() / source_resource.capacity * 100.0)
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}
