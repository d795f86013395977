// ==========================================
// 项目资源负载优化引擎 - 优化配置读取 Trait
// ==========================================
// 职责: 定义服务层所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::engine::balance::DEFAULT_BALANCE_TOLERANCE;
use crate::engine::load_analyzer::DEFAULT_OVERLOAD_THRESHOLD;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// OptimizerSettings - 已解析的配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerSettings {
    pub overload_threshold_pct: f64,
    pub balance_tolerance: i64,
    pub recommendation_cache_ttl_secs: u64,
    pub max_range_days: i64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            overload_threshold_pct: DEFAULT_OVERLOAD_THRESHOLD,
            balance_tolerance: DEFAULT_BALANCE_TOLERANCE,
            recommendation_cache_ttl_secs: 300,
            max_range_days: 366,
        }
    }
}

// ==========================================
// OptimizerConfigReader Trait
// ==========================================
// 用途: 服务层读取阈值、容差、缓存有效期等配置
// 实现者: ConfigManager（内存 key-value）
#[async_trait]
pub trait OptimizerConfigReader: Send + Sync {
    /// 获取默认过载阈值（调用方未显式传入时使用）
    ///
    /// # 默认值
    /// - 80.0
    async fn get_overload_threshold_pct(&self) -> ConfigResult<f64>;

    /// 获取均衡容差（任务数变化绝对值）
    ///
    /// # 默认值
    /// - 2
    async fn get_balance_tolerance(&self) -> ConfigResult<i64>;

    /// 获取推荐结果缓存有效期（秒）
    ///
    /// # 默认值
    /// - 300
    async fn get_recommendation_cache_ttl_secs(&self) -> ConfigResult<u64>;

    /// 获取单次查询允许的最大日期跨度（天）
    ///
    /// # 默认值
    /// - 366
    async fn get_max_range_days(&self) -> ConfigResult<i64>;

    /// 一次性读取全部配置
    async fn load_settings(&self) -> ConfigResult<OptimizerSettings> {
        Ok(OptimizerSettings {
            overload_threshold_pct: self.get_overload_threshold_pct().await?,
            balance_tolerance: self.get_balance_tolerance().await?,
            recommendation_cache_ttl_secs: self.get_recommendation_cache_ttl_secs().await?,
            max_range_days: self.get_max_range_days().await?,
        })
    }
}
