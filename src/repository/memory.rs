// ==========================================
// 项目资源负载优化引擎 - 内存仓储实现
// ==========================================
// 职责: 三个协作方 Trait 的内存实现（驱动程序与测试使用）
// 存储: 单把 Mutex 保护的任务/资源/批次表
// ==========================================

use crate::domain::optimization::{ModificationResult, RedistributionPlanEntry};
use crate::domain::resource::Resource;
use crate::domain::task::Task;
use crate::domain::types::{OptimizationStatus, ProjectId, ResourceId, TaskId, TeamId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::workload_repo::{
    AppliedOptimizationRecord, NewOptimization, NewPrediction, OptimizationRecord,
    OptimizationRepository, RedistributionRecord, ResourceRepository, TaskRepository,
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

/// 已保存的预测
#[derive(Debug, Clone)]
pub struct PredictionRecord {
    pub id: String,
    pub prediction: NewPrediction,
    pub created_at: NaiveDateTime,
}

#[derive(Default)]
struct StoreState {
    tasks: Vec<Task>,
    resources: Vec<Resource>,
    optimizations: HashMap<String, OptimizationRecord>,
    redistributions: Vec<RedistributionRecord>,
    applied: Vec<AppliedOptimizationRecord>,
    predictions: Vec<PredictionRecord>,
    failing_updates: HashSet<TaskId>,
}

// ==========================================
// InMemoryWorkloadStore
// ==========================================
#[derive(Default)]
pub struct InMemoryWorkloadStore {
    state: Mutex<StoreState>,
}

impl InMemoryWorkloadStore {
    pub fn new(tasks: Vec<Task>, resources: Vec<Resource>) -> Self {
        Self {
            state: Mutex::new(StoreState {
                tasks,
                resources,
                ..StoreState::default()
            }),
        }
    }

    fn get_state(&self) -> RepositoryResult<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 令指定任务的资源更新失败（模拟协作方写入异常）
    pub fn fail_updates_for(&self, task_id: TaskId) -> RepositoryResult<()> {
        self.get_state()?.failing_updates.insert(task_id);
        Ok(())
    }

    pub fn task(&self, task_id: TaskId) -> RepositoryResult<Option<Task>> {
        Ok(self.get_state()?.tasks.iter().find(|t| t.id == task_id).cloned())
    }

    pub fn optimization_count(&self) -> RepositoryResult<usize> {
        Ok(self.get_state()?.optimizations.len())
    }

    pub fn redistributions(&self) -> RepositoryResult<Vec<RedistributionRecord>> {
        Ok(self.get_state()?.redistributions.clone())
    }

    pub fn applied_records(&self) -> RepositoryResult<Vec<AppliedOptimizationRecord>> {
        Ok(self.get_state()?.applied.clone())
    }

    pub fn predictions(&self) -> RepositoryResult<Vec<PredictionRecord>> {
        Ok(self.get_state()?.predictions.clone())
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ==========================================
// TaskRepository 实现
// ==========================================
#[async_trait]
impl TaskRepository for InMemoryWorkloadStore {
    async fn get_tasks_by_date_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        project_id: Option<ProjectId>,
        team_id: Option<TeamId>,
    ) -> RepositoryResult<Vec<Task>> {
        let state = self.get_state()?;

        let team_resources: Option<HashSet<ResourceId>> = team_id.map(|team| {
            state
                .resources
                .iter()
                .filter(|r| r.team_id == Some(team))
                .map(|r| r.id)
                .collect()
        });

        Ok(state
            .tasks
            .iter()
            .filter(|t| t.overlaps(start_date, end_date))
            .filter(|t| project_id.map_or(true, |p| t.project_id == Some(p)))
            .filter(|t| match &team_resources {
                Some(ids) => t.resource_id.map_or(false, |r| ids.contains(&r)),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get_tasks_by_resource_ids(
        &self,
        resource_ids: &[ResourceId],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepositoryResult<Vec<Task>> {
        let state = self.get_state()?;
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.resource_id.map_or(false, |r| resource_ids.contains(&r)))
            .filter(|t| t.overlaps(start_date, end_date))
            .cloned()
            .collect())
    }

    async fn update_task_resource(
        &self,
        task_id: TaskId,
        resource_id: ResourceId,
    ) -> RepositoryResult<()> {
        let mut state = self.get_state()?;
        if state.failing_updates.contains(&task_id) {
            return Err(RepositoryError::PersistenceFailed(format!(
                "任务 {} 资源更新被拒绝",
                task_id
            )));
        }
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| RepositoryError::not_found("Task", task_id))?;
        task.resource_id = Some(resource_id);
        debug!(task_id, resource_id, "任务资源已更新");
        Ok(())
    }
}

// ==========================================
// ResourceRepository 实现
// ==========================================
#[async_trait]
impl ResourceRepository for InMemoryWorkloadStore {
    async fn get_resources_by_ids(&self, ids: &[ResourceId]) -> RepositoryResult<Vec<Resource>> {
        let state = self.get_state()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.resources.iter().find(|r| r.id == *id))
            .cloned()
            .collect())
    }

    async fn get_all_active_resources(&self) -> RepositoryResult<Vec<Resource>> {
        let state = self.get_state()?;
        Ok(state.resources.iter().filter(|r| r.is_active).cloned().collect())
    }

    async fn get_resources_by_team_id(&self, team_id: TeamId) -> RepositoryResult<Vec<Resource>> {
        let state = self.get_state()?;
        Ok(state
            .resources
            .iter()
            .filter(|r| r.is_active && r.team_id == Some(team_id))
            .cloned()
            .collect())
    }
}

// ==========================================
// OptimizationRepository 实现
// ==========================================
#[async_trait]
impl OptimizationRepository for InMemoryWorkloadStore {
    async fn save_recommendations(&self, optimization: NewOptimization) -> RepositoryResult<String> {
        let id = new_id();
        let record = OptimizationRecord {
            id: id.clone(),
            project_id: optimization.project_id,
            team_id: optimization.team_id,
            start_date: optimization.start_date,
            end_date: optimization.end_date,
            threshold: optimization.threshold,
            status: OptimizationStatus::Pending,
            recommendations: optimization.recommendations,
            created_at: now(),
            applied_at: None,
        };
        self.get_state()?.optimizations.insert(id.clone(), record);
        Ok(id)
    }

    async fn get_optimization(&self, optimization_id: &str) -> RepositoryResult<OptimizationRecord> {
        self.get_state()?
            .optimizations
            .get(optimization_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("Optimization", optimization_id))
    }

    async fn mark_optimization_applied(&self, optimization_id: &str) -> RepositoryResult<()> {
        let mut state = self.get_state()?;
        let record = state
            .optimizations
            .get_mut(optimization_id)
            .ok_or_else(|| RepositoryError::not_found("Optimization", optimization_id))?;
        record.status = OptimizationStatus::Applied;
        record.applied_at = Some(now());
        Ok(())
    }

    async fn save_redistribution_plan(
        &self,
        project_id: Option<ProjectId>,
        plan: &[RedistributionPlanEntry],
        analysis: serde_json::Value,
    ) -> RepositoryResult<String> {
        let id = new_id();
        self.get_state()?.redistributions.push(RedistributionRecord {
            id: id.clone(),
            project_id,
            plan: plan.to_vec(),
            analysis,
            created_at: now(),
        });
        Ok(id)
    }

    async fn save_applied_optimization(
        &self,
        optimization_id: &str,
        results: &[ModificationResult],
    ) -> RepositoryResult<String> {
        let id = new_id();
        self.get_state()?.applied.push(AppliedOptimizationRecord {
            id: id.clone(),
            optimization_id: optimization_id.to_string(),
            results: results.to_vec(),
            created_at: now(),
        });
        Ok(id)
    }

    async fn save_prediction(&self, prediction: NewPrediction) -> RepositoryResult<String> {
        let id = new_id();
        self.get_state()?.predictions.push(PredictionRecord {
            id: id.clone(),
            prediction,
            created_at: now(),
        });
        Ok(id)
    }
}
