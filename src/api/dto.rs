// ==========================================
// 项目资源负载优化引擎 - API 数据传输对象
// ==========================================
// 约定: JSON 字段 camelCase,日期 YYYY-MM-DD,百分比保留两位小数
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::load::ResourceLoadProfile;
use crate::domain::optimization::{
    BalanceScore, LoadSnapshot, ModificationResult, PredictionDiff, Recommendation,
    RedistributionConstraints, RedistributionPlanEntry,
};
use crate::domain::resource::Resource;
use crate::domain::task::RawTaskRecord;
use crate::domain::types::ModificationStatus;
use crate::engine::redistribution::PlannedResourceLoad;

// ==========================================
// getRecommendations
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub optimization_id: String,
    pub threshold: f64,
    pub overloaded: Vec<ResourceLoadProfile>,
    pub underutilized: Vec<ResourceLoadProfile>,
    pub recommendations: Vec<Recommendation>,
}

// ==========================================
// autoDistribute
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoDistributeRequest {
    pub tasks: Vec<RawTaskRecord>,
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub constraints: RedistributionConstraints,
}

/// 再分配方案分析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedistributionAnalysis {
    pub balance: BalanceScore,
    pub resource_loads: Vec<PlannedResourceLoad>,
    pub total_tasks: usize,
    pub fixed_count: usize,
    pub moved_count: usize, // 与当前分配不同的任务数（含原先未分配的）
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoDistributeResponse {
    pub redistribution_id: String,
    pub plan: Vec<RedistributionPlanEntry>,
    pub analysis: RedistributionAnalysis,
}

// ==========================================
// applyOptimization
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOptimizationResponse {
    pub applied_id: String,
    pub update_results: Vec<ModificationResult>,
    pub post_optimization_load: Vec<ResourceLoadProfile>,
}

impl ApplyOptimizationResponse {
    pub fn success_count(&self) -> usize {
        self.update_results
            .iter()
            .filter(|r| r.status == ModificationStatus::Success)
            .count()
    }
}

// ==========================================
// predictFutureLoad
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub prediction_id: String,
    pub current_load: LoadSnapshot,
    pub predicted_load: LoadSnapshot,
    pub difference: PredictionDiff,
}
