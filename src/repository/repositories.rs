// ==========================================
// 项目资源负载优化引擎 - 仓储聚合
// ==========================================
// 职责: 聚合服务层所需的全部协作方 Repository
// ==========================================

use std::sync::Arc;

use crate::repository::memory::InMemoryWorkloadStore;
use crate::repository::workload_repo::{
    OptimizationRepository, ResourceRepository, TaskRepository,
};

/// 负载优化仓储集合
///
/// 将 3 个协作方合并为 1 个结构体参数，便于测试时整体替换。
///
/// # 包含的仓储
/// - `task_repo`: 任务查询与资源更新
/// - `resource_repo`: 资源查询
/// - `optimization_repo`: 推荐/方案/采纳/预测持久化
#[derive(Clone)]
pub struct WorkloadRepositories {
    pub task_repo: Arc<dyn TaskRepository>,
    pub resource_repo: Arc<dyn ResourceRepository>,
    pub optimization_repo: Arc<dyn OptimizationRepository>,
}

impl WorkloadRepositories {
    pub fn new(
        task_repo: Arc<dyn TaskRepository>,
        resource_repo: Arc<dyn ResourceRepository>,
        optimization_repo: Arc<dyn OptimizationRepository>,
    ) -> Self {
        Self {
            task_repo,
            resource_repo,
            optimization_repo,
        }
    }

    /// 三个仓储共用同一个内存存储
    pub fn in_memory(store: Arc<InMemoryWorkloadStore>) -> Self {
        Self {
            task_repo: store.clone(),
            resource_repo: store.clone(),
            optimization_repo: store,
        }
    }

    pub fn task_repo(&self) -> &Arc<dyn TaskRepository> {
        &self.task_repo
    }

    pub fn resource_repo(&self) -> &Arc<dyn ResourceRepository> {
        &self.resource_repo
    }

    pub fn optimization_repo(&self) -> &Arc<dyn OptimizationRepository> {
        &self.optimization_repo
    }
}
