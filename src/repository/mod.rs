// ==========================================
// 项目资源负载优化引擎 - 数据仓储层
// ==========================================
// 职责: 协作方数据访问接口 + 内存参考实现
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod error;
pub mod memory;
pub mod repositories;
pub mod workload_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use memory::{InMemoryWorkloadStore, PredictionRecord};
pub use repositories::WorkloadRepositories;
pub use workload_repo::{
    AppliedOptimizationRecord, NewOptimization, NewPrediction, OptimizationRecord,
    OptimizationRepository, RedistributionRecord, ResourceRepository, TaskRepository,
};
