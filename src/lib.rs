// ==========================================
// 项目资源负载优化引擎 - 核心库
// ==========================================
// 职责: 负载计算、过载识别、转移推荐、自动再分配、负载预测
// 系统定位: 决策支持（推荐只建议,采纳由人工触发）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 纯计算,无 I/O
pub mod engine;

// 数据仓储层 - 协作方接口
pub mod repository;

// 配置层 - 运行配置
pub mod config;

// 缓存层 - 推荐缓存与运行锁
pub mod cache;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ModificationStatus, OptimizationStatus, Priority, ProjectId, ResourceId, SkillId, TaskId,
    TeamId, Workload,
};

// 领域实体
pub use domain::{
    BalanceScore, DailyLoad, LoadSnapshot, PredictionDiff, RawTaskRecord, Recommendation,
    RedistributionPlanEntry, Resource, ResourceLoadProfile, SystemLoadProfile, Task,
};

// 引擎
pub use engine::{
    BalanceScorer, LoadAnalyzer, PredictionEngine, RecommendationEngine, RedistributionPlanner,
    WorkloadCalculator,
};

// API
pub use api::{ApiError, WorkloadApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "项目资源负载优化引擎";
