// ==========================================
// 项目资源负载优化引擎 - 任务再分配引擎
// ==========================================
// 职责: 按优先级贪心地将任务集重新分配到资源
// 输入: 任务 + 资源 + 约束（固定分配）
// 输出: RedistributionPlanEntry[]（按处理顺序）
// 红线: 固定分配无条件生效,不受资源当前负载影响
// ==========================================

use crate::domain::optimization::{RedistributionConstraints, RedistributionPlanEntry};
use crate::domain::resource::Resource;
use crate::domain::task::Task;
use crate::domain::types::{ResourceId, TaskId};
use crate::engine::dependency::{DependencyChainBuilder, NoDependencyChains};
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// 单个资源在分配过程中的累计状态
struct ResourceSlot<'a> {
    resource: &'a Resource,
    current_load: f64,
    assigned_tasks: Vec<TaskId>,
}

/// 方案中每个资源的计划工时汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedResourceLoad {
    pub resource_id: ResourceId,
    pub resource_name: String,
    pub assigned_hours: f64,
    pub task_ids: Vec<TaskId>,
}

// ==========================================
// RedistributionPlanner - 任务再分配引擎
// ==========================================
pub struct RedistributionPlanner {
    dependency_builder: Arc<dyn DependencyChainBuilder>,
}

impl RedistributionPlanner {
    pub fn new() -> Self {
        Self {
            dependency_builder: Arc::new(NoDependencyChains),
        }
    }

    /// 注入依赖链构建器（扩展点，当前不参与排序）
    pub fn with_dependency_builder(dependency_builder: Arc<dyn DependencyChainBuilder>) -> Self {
        Self { dependency_builder }
    }

    /// 生成再分配方案
    ///
    /// 规则:
    /// 1) 任务按优先级降序、截止日期升序排序（稳定排序）
    /// 2) 固定分配: 直接落到指定资源, is_fixed=true
    /// 3) 其余任务: 候选资源 = 类型匹配 且 技能覆盖；为空则退回全部资源
    /// 4) 候选中选累计工时最小者（并列取列表靠前者）
    ///
    /// # 返回
    /// - Ok(方案条目): 顺序与处理顺序一致
    /// - Err(EngineError::EmptyInput): 资源列表为空
    #[instrument(skip_all, fields(
        tasks_count = tasks.len(),
        resources_count = resources.len(),
        fixed_count = constraints.fixed_assignments.len()
    ))]
    pub fn plan(
        &self,
        tasks: &[Task],
        resources: &[Resource],
        constraints: &RedistributionConstraints,
    ) -> EngineResult<Vec<RedistributionPlanEntry>> {
        if resources.is_empty() {
            return Err(EngineError::EmptyInput("资源列表为空,无法再分配".to_string()));
        }

        let chains = self.dependency_builder.build_dependency_chains(tasks);
        if !chains.is_empty() {
            debug!(chains = chains.len(), "依赖链暂不参与再分配排序");
        }

        let mut sorted: Vec<&Task> = tasks.iter().collect();
        sorted.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.end_date.cmp(&b.end_date))
        });

        let mut slots: Vec<ResourceSlot<'_>> = resources
            .iter()
            .map(|resource| ResourceSlot {
                resource,
                current_load: 0.0,
                assigned_tasks: Vec::new(),
            })
            .collect();
        let slot_index: HashMap<ResourceId, usize> = resources
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.id, idx))
            .collect();

        let mut plan = Vec::with_capacity(sorted.len());
        for task in sorted {
            // 固定分配
            if let Some(fixed_resource_id) = constraints.fixed_resource_for(task.id) {
                let resource_name = match slot_index.get(&fixed_resource_id) {
                    Some(&idx) => {
                        let slot = &mut slots[idx];
                        slot.current_load += task.total_hours();
                        slot.assigned_tasks.push(task.id);
                        slot.resource.name.clone()
                    }
                    None => {
                        warn!(
                            task_id = task.id,
                            resource_id = fixed_resource_id,
                            "固定分配指向资源列表外的资源"
                        );
                        String::new()
                    }
                };
                plan.push(RedistributionPlanEntry {
                    task_id: task.id,
                    task_name: task.name.clone(),
                    resource_id: fixed_resource_id,
                    resource_name,
                    is_fixed: true,
                });
                continue;
            }

            let idx = Self::pick_least_loaded(task, &slots);
            let slot = &mut slots[idx];
            slot.current_load += task.total_hours();
            slot.assigned_tasks.push(task.id);

            plan.push(RedistributionPlanEntry {
                task_id: task.id,
                task_name: task.name.clone(),
                resource_id: slot.resource.id,
                resource_name: slot.resource.name.clone(),
                is_fixed: false,
            });
        }

        for slot in &slots {
            debug!(
                resource_id = slot.resource.id,
                current_load = slot.current_load,
                assigned = slot.assigned_tasks.len(),
                "资源分配结果"
            );
        }
        info!(entries = plan.len(), "再分配方案生成完成");

        Ok(plan)
    }

    /// 选出累计工时最小的候选资源下标
    fn pick_least_loaded(task: &Task, slots: &[ResourceSlot<'_>]) -> usize {
        let eligible: Vec<usize> = slots
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                s.resource.matches_type(task.resource_type.as_deref())
                    && s.resource.has_skills(&task.required_skills)
            })
            .map(|(idx, _)| idx)
            .collect();

        let candidates: Vec<usize> = if eligible.is_empty() {
            debug!(task_id = task.id, "无匹配资源,退回全部资源");
            (0..slots.len()).collect()
        } else {
            eligible
        };

        // 严格小于: 并列时保留靠前的资源
        let mut best = candidates[0];
        for &idx in &candidates[1..] {
            if slots[idx].current_load < slots[best].current_load {
                best = idx;
            }
        }
        best
    }
}

/// 汇总方案中每个资源的计划工时（资源列表外的固定分配单独追加在末尾）
pub fn planned_hours_by_resource(
    plan: &[RedistributionPlanEntry],
    tasks: &[Task],
    resources: &[Resource],
) -> Vec<PlannedResourceLoad> {
    let hours_by_task: HashMap<TaskId, f64> =
        tasks.iter().map(|t| (t.id, t.total_hours())).collect();

    let mut loads: Vec<PlannedResourceLoad> = resources
        .iter()
        .map(|r| PlannedResourceLoad {
            resource_id: r.id,
            resource_name: r.name.clone(),
            assigned_hours: 0.0,
            task_ids: Vec::new(),
        })
        .collect();
    let mut position_by_resource: HashMap<ResourceId, usize> = HashMap::new();
    for (idx, load) in loads.iter().enumerate() {
        position_by_resource.entry(load.resource_id).or_insert(idx);
    }

    for entry in plan {
        let hours = hours_by_task.get(&entry.task_id).copied().unwrap_or(0.0);
        match position_by_resource.get(&entry.resource_id).copied() {
            Some(idx) => {
                let load = &mut loads[idx];
                load.assigned_hours += hours;
                load.task_ids.push(entry.task_id);
            }
            None => {
                position_by_resource.insert(entry.resource_id, loads.len());
                loads.push(PlannedResourceLoad {
                    resource_id: entry.resource_id,
                    resource_name: entry.resource_name.clone(),
                    assigned_hours: hours,
                    task_ids: vec![entry.task_id],
                });
            }
        }
    }
    loads
}

impl Default for RedistributionPlanner {
    fn default() -> Self {
        Self::new()
    }
}
