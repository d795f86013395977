// ==========================================
// 项目资源负载优化引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、负载约束接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod calendar;
pub mod load;
pub mod optimization;
pub mod resource;
pub mod task;
pub mod types;

// 重导出核心类型
pub use load::{
    load_percent, round2, DailyLoad, LoadConstraint, ResourceLoadProfile, SystemLoadProfile,
    RAW_OVERLOAD_PCT,
};
pub use optimization::{
    BalanceScore, FixedAssignment, LoadSnapshot, ModificationResult, PredictionDiff,
    Recommendation, RedistributionConstraints, RedistributionPlanEntry, ResourceBalance,
    ResourceLoadDiff, TaskModification,
};
pub use resource::{Resource, DEFAULT_DAILY_CAPACITY_H};
pub use task::{ingest_tasks, IngestError, RawTaskRecord, Task};
pub use types::{
    ModificationStatus, OptimizationStatus, Priority, ProjectId, ResourceId, SkillId, TaskId, TeamId,
    Workload,
};
