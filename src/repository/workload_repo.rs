// ==========================================
// 项目资源负载优化引擎 - 协作方 Repository Trait
// ==========================================
// 职责: 定义任务/资源查询与优化结果持久化接口（不包含实现）
// 红线: Repository 不含业务规则，只做数据读写；持久化ID由实现方生成
// ==========================================

use crate::domain::optimization::{
    ModificationResult, PredictionDiff, Recommendation, RedistributionPlanEntry,
};
use crate::domain::resource::Resource;
use crate::domain::task::Task;
use crate::domain::types::{OptimizationStatus, ProjectId, ResourceId, TaskId, TeamId};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// 持久化记录
// ==========================================

/// 待保存的推荐批次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOptimization {
    pub project_id: Option<ProjectId>,
    pub team_id: Option<TeamId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub threshold: f64,
    pub recommendations: Vec<Recommendation>,
}

/// 已保存的推荐批次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRecord {
    pub id: String,
    pub project_id: Option<ProjectId>,
    pub team_id: Option<TeamId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub threshold: f64,
    pub status: OptimizationStatus,
    pub recommendations: Vec<Recommendation>,
    pub created_at: NaiveDateTime,
    pub applied_at: Option<NaiveDateTime>,
}

/// 再分配方案记录（analysis 以 JSON 保存）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedistributionRecord {
    pub id: String,
    pub project_id: Option<ProjectId>,
    pub plan: Vec<RedistributionPlanEntry>,
    pub analysis: serde_json::Value,
    pub created_at: NaiveDateTime,
}

/// 采纳记录（逐行 SUCCESS/FAILED）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedOptimizationRecord {
    pub id: String,
    pub optimization_id: String,
    pub results: Vec<ModificationResult>,
    pub created_at: NaiveDateTime,
}

/// 待保存的预测
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrediction {
    pub project_id: Option<ProjectId>,
    pub team_id: Option<TeamId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub new_task_ids: Vec<TaskId>,
    pub diff: PredictionDiff,
}

// ==========================================
// TaskRepository Trait
// ==========================================
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 查询与 [start, end] 有交集的任务
    ///
    /// # 参数
    /// - project_id: 按项目过滤（None 不过滤）
    /// - team_id: 按已分配资源所属团队过滤（None 不过滤）
    async fn get_tasks_by_date_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        project_id: Option<ProjectId>,
        team_id: Option<TeamId>,
    ) -> RepositoryResult<Vec<Task>>;

    /// 查询分配给指定资源、且与 [start, end] 有交集的任务
    async fn get_tasks_by_resource_ids(
        &self,
        resource_ids: &[ResourceId],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepositoryResult<Vec<Task>>;

    /// 更新任务的分配资源
    ///
    /// # 返回
    /// - Err(NotFound): 任务不存在
    async fn update_task_resource(
        &self,
        task_id: TaskId,
        resource_id: ResourceId,
    ) -> RepositoryResult<()>;
}

// ==========================================
// ResourceRepository Trait
// ==========================================
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// 按ID查询资源（不存在的ID忽略,保持入参顺序）
    async fn get_resources_by_ids(&self, ids: &[ResourceId]) -> RepositoryResult<Vec<Resource>>;

    async fn get_all_active_resources(&self) -> RepositoryResult<Vec<Resource>>;

    async fn get_resources_by_team_id(&self, team_id: TeamId) -> RepositoryResult<Vec<Resource>>;
}

// ==========================================
// OptimizationRepository Trait
// ==========================================
// 状态机: PENDING（save_recommendations）→ APPLIED（mark_optimization_applied）
#[async_trait]
pub trait OptimizationRepository: Send + Sync {
    /// 保存推荐批次,状态 PENDING
    ///
    /// # 返回
    /// - Ok(String): optimizationId
    async fn save_recommendations(&self, optimization: NewOptimization) -> RepositoryResult<String>;

    /// 查询推荐批次
    ///
    /// # 返回
    /// - Err(NotFound): 批次不存在
    async fn get_optimization(&self, optimization_id: &str) -> RepositoryResult<OptimizationRecord>;

    /// 将批次标记为 APPLIED
    async fn mark_optimization_applied(&self, optimization_id: &str) -> RepositoryResult<()>;

    /// 保存再分配方案
    ///
    /// # 返回
    /// - Ok(String): redistributionId
    async fn save_redistribution_plan(
        &self,
        project_id: Option<ProjectId>,
        plan: &[RedistributionPlanEntry],
        analysis: serde_json::Value,
    ) -> RepositoryResult<String>;

    /// 保存采纳结果
    ///
    /// # 返回
    /// - Ok(String): appliedId
    async fn save_applied_optimization(
        &self,
        optimization_id: &str,
        results: &[ModificationResult],
    ) -> RepositoryResult<String>;

    /// 保存预测
    ///
    /// # 返回
    /// - Ok(String): predictionId
    async fn save_prediction(&self, prediction: NewPrediction) -> RepositoryResult<String>;
}
