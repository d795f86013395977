// ==========================================
// 项目资源负载优化引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: 内存 key-value（global scope）,可从 JSON 快照加载
// ==========================================

use crate::config::optimizer_config_trait::{ConfigResult, OptimizerConfigReader};
use crate::engine::balance::DEFAULT_BALANCE_TOLERANCE;
use crate::engine::load_analyzer::DEFAULT_OVERLOAD_THRESHOLD;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;
use std::sync::RwLock;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Default)]
pub struct ConfigManager {
    values: RwLock<HashMap<String, String>>,
}

impl ConfigManager {
    /// 创建空配置（全部使用默认值）
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    /// 从 JSON 快照创建
    ///
    /// # 参数
    /// - snapshot_json: `{"key": "value", ...}`
    pub fn from_snapshot_json(snapshot_json: &str) -> ConfigResult<Self> {
        let manager = Self::new();
        manager.restore_config_from_snapshot(snapshot_json)?;
        Ok(manager)
    }

    /// 从 JSON 文件创建
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_snapshot_json(&content)
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|e| format!("锁获取失败: {}", e))?;
        Ok(values.get(key).cloned())
    }

    /// 写入 global scope 的配置值（覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| format!("锁获取失败: {}", e))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 解析配置值,格式错误时回落到默认值
    fn parse_or_default<T: FromStr + Copy>(&self, key: &str, default: T) -> ConfigResult<T> {
        let Some(raw) = self.get_global_config_value(key)? else {
            return Ok(default);
        };
        Ok(raw.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
            default
        }))
    }

    /// 获取所有配置的快照（JSON格式,按 key 排序）
    ///
    /// # 用途
    /// - 随推荐批次记录配置,保证结果可复现
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let values = self
            .values
            .read()
            .map_err(|e| format!("锁获取失败: {}", e))?;
        let ordered: BTreeMap<&String, &String> = values.iter().collect();
        Ok(serde_json::to_string(&ordered)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 覆盖同名配置；`__meta_` 前缀的元信息不回写
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut values = self
            .values
            .write()
            .map_err(|e| format!("锁获取失败: {}", e))?;

        let mut count = 0;
        for (key, value) in config_map {
            if key.starts_with("__meta_") {
                continue;
            }
            values.insert(key, value);
            count += 1;
        }
        Ok(count)
    }
}

// ==========================================
// OptimizerConfigReader Trait 实现
// ==========================================
#[async_trait]
impl OptimizerConfigReader for ConfigManager {
    async fn get_overload_threshold_pct(&self) -> ConfigResult<f64> {
        let value: f64 =
            self.parse_or_default(config_keys::OVERLOAD_THRESHOLD_PCT, DEFAULT_OVERLOAD_THRESHOLD)?;
        if !value.is_finite() || value < 0.0 {
            tracing::warn!(value, fallback = DEFAULT_OVERLOAD_THRESHOLD, "过载阈值无效，使用默认值");
            return Ok(DEFAULT_OVERLOAD_THRESHOLD);
        }
        Ok(value)
    }

    async fn get_balance_tolerance(&self) -> ConfigResult<i64> {
        Ok(self.parse_or_default(config_keys::BALANCE_TOLERANCE, DEFAULT_BALANCE_TOLERANCE)?.abs())
    }

    async fn get_recommendation_cache_ttl_secs(&self) -> ConfigResult<u64> {
        self.parse_or_default(config_keys::RECOMMENDATION_CACHE_TTL_SECS, 300_u64)
    }

    async fn get_max_range_days(&self) -> ConfigResult<i64> {
        let value = self.get_config_or_default(config_keys::MAX_RANGE_DAYS, "366")?;
        Ok(value.trim().parse::<i64>().ok().filter(|v| *v > 0).unwrap_or(366))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 负载分析
    pub const OVERLOAD_THRESHOLD_PCT: &str = "overload_threshold_pct";

    // 再分配均衡
    pub const BALANCE_TOLERANCE: &str = "balance_tolerance";

    // 推荐缓存
    pub const RECOMMENDATION_CACHE_TTL_SECS: &str = "recommendation_cache_ttl_secs";

    // 输入校验
    pub const MAX_RANGE_DAYS: &str = "max_range_days";
}
