// ==========================================
// 项目资源负载优化引擎 - API 层
// ==========================================
// 职责: 请求校验、错误映射、协作方与引擎的编排
// ==========================================

pub mod dto;
pub mod error;
pub mod validator;
pub mod workload_api;

// 重导出核心 API
pub use dto::{
    ApplyOptimizationResponse, AutoDistributeRequest, AutoDistributeResponse,
    PredictionResponse, RecommendationsResponse, RedistributionAnalysis,
};
pub use error::{ApiError, ApiResult};
pub use workload_api::{RecommendationCache, WorkloadApi};
