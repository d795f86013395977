// ==========================================
// 项目资源负载优化引擎 - 优化结果领域模型
// ==========================================
// 职责: 推荐、再分配方案、均衡评分、预测差异
// 红线: 所有实体为单次调用的临时对象,持久化ID由外部仓储分配
// ==========================================

use crate::domain::load::{ResourceLoadProfile, SystemLoadProfile};
use crate::domain::types::{ModificationStatus, ResourceId, TaskId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Recommendation - 任务转移推荐
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub task_id: TaskId,
    pub task_name: String,
    pub current_resource_id: ResourceId,
    pub current_resource_name: String,
    pub suggested_resource_id: ResourceId,
    pub suggested_resource_name: String,
    pub overload_date: NaiveDate,
    pub expected_load_reduction: f64, // round2(effort / 源资源产能 * 100)
    pub reason: String,
}

// ==========================================
// 再分配约束
// ==========================================

/// 固定分配: 将任务钉在指定资源上
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedAssignment {
    pub task_id: TaskId,
    pub resource_id: ResourceId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedistributionConstraints {
    #[serde(default)]
    pub fixed_assignments: Vec<FixedAssignment>,
}

impl RedistributionConstraints {
    /// 查询任务的固定分配
    pub fn fixed_resource_for(&self, task_id: TaskId) -> Option<ResourceId> {
        self.fixed_assignments
            .iter()
            .find(|f| f.task_id == task_id)
            .map(|f| f.resource_id)
    }
}

// ==========================================
// RedistributionPlanEntry - 再分配方案条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedistributionPlanEntry {
    pub task_id: TaskId,
    pub task_name: String,
    pub resource_id: ResourceId,
    pub resource_name: String,
    pub is_fixed: bool,
}

// ==========================================
// BalanceScore - 均衡评分
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBalance {
    pub resource_id: ResourceId,
    pub resource_name: String,
    pub task_count: usize,
    pub task_count_change: i64, // 相对基线的变化
    pub is_balanced: bool,      // |change| <= 容差
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceScore {
    pub score: f64, // [0, 100]
    pub std_dev: f64,
    pub avg_task_count: f64,
    pub resources: Vec<ResourceBalance>,
}

// ==========================================
// 调整采纳（applyOptimization）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskModification {
    pub task_id: TaskId,
    pub new_resource_id: ResourceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationResult {
    pub task_id: TaskId,
    pub new_resource_id: ResourceId,
    pub status: ModificationStatus,
    #[serde(default)]
    pub error: Option<String>,
}

// ==========================================
// 预测差异
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLoadDiff {
    pub resource_id: ResourceId,
    pub resource_name: String,
    pub avg_load_before: f64,
    pub avg_load_after: f64,
    pub avg_load_diff: f64,
    pub max_load_before: f64,
    pub max_load_after: f64,
    pub max_load_diff: f64,
    pub overloaded_days_before: usize,
    pub overloaded_days_after: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionDiff {
    pub resources: Vec<ResourceLoadDiff>,
    pub system_avg_load_before: f64,
    pub system_avg_load_after: f64,
    pub system_avg_load_diff: f64,
}

/// 负载快照（资源画像 + 系统画像）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSnapshot {
    pub resource_loads: Vec<ResourceLoadProfile>,
    pub system_load_by_date: Vec<SystemLoadProfile>,
}
