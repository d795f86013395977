// ==========================================
// 项目资源负载优化引擎 - 引擎层
// ==========================================
// 职责: 负载计算、分析、推荐、再分配、均衡评分、预测
// 红线: 引擎无状态、无 I/O,所有输入通过参数传入
// ==========================================

pub mod balance;
pub mod dependency;
pub mod error;
pub mod load_analyzer;
pub mod prediction;
pub mod recommendation;
pub mod redistribution;
pub mod workload_calculator;

// 重导出核心引擎
pub use balance::{BalanceScorer, DEFAULT_BALANCE_TOLERANCE};
pub use dependency::{DependencyChain, DependencyChainBuilder, NoDependencyChains};
pub use error::{EngineError, EngineResult};
pub use load_analyzer::{
    system_average_load, LoadAnalyzer, LoadClassification, DEFAULT_OVERLOAD_THRESHOLD,
};
pub use prediction::{PredictionEngine, PredictionOutcome};
pub use recommendation::{expected_load_reduction, RecommendationEngine};
pub use redistribution::{planned_hours_by_resource, PlannedResourceLoad, RedistributionPlanner};
pub use workload_calculator::{index_tasks_by_resource, WorkloadCalculator};
