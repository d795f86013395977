// ==========================================
// 项目资源负载优化引擎 - 负载分析引擎
// ==========================================
// 职责: 资源画像聚合为系统日负载 + 过载/闲置分类
// 输入: ResourceLoadProfile[] / 阈值
// 输出: SystemLoadProfile[] / LoadClassification
// ==========================================

use crate::domain::calendar::date_range;
use crate::domain::load::{round2, LoadConstraint, ResourceLoadProfile, SystemLoadProfile};
use crate::engine::error::{ensure_chronological, EngineResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// 默认过载阈值（负载百分比）
pub const DEFAULT_OVERLOAD_THRESHOLD: f64 = 80.0;

/// 闲置判定系数: avg_load < threshold * 0.5
pub const UNDERUTILIZATION_RATIO: f64 = 0.5;

// ==========================================
// LoadClassification - 分类结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadClassification {
    pub overloaded: Vec<ResourceLoadProfile>,
    pub underutilized: Vec<ResourceLoadProfile>,
}

// ==========================================
// LoadAnalyzer - 负载分析引擎
// ==========================================
pub struct LoadAnalyzer;

impl LoadAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// 聚合系统日负载
    ///
    /// 每天: 平均负载 = 当日所有资源 load_percent 的算术平均（无资源时为 0）；
    /// overloaded_count = 当日负载 > 100% 的资源数
    #[instrument(skip(self, profiles), fields(profiles_count = profiles.len()))]
    pub fn aggregate(
        &self,
        profiles: &[ResourceLoadProfile],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> EngineResult<Vec<SystemLoadProfile>> {
        ensure_chronological(start_date, end_date)?;

        let system: Vec<SystemLoadProfile> = date_range(start_date, end_date)
            .map(|date| {
                let mut sum = 0.0;
                let mut overloaded_count = 0;
                for day in profiles.iter().filter_map(|p| p.load_on(date)) {
                    sum += day.load_percent;
                    if day.is_overloaded() {
                        overloaded_count += 1;
                    }
                }
                let average_load = if profiles.is_empty() {
                    0.0
                } else {
                    round2(sum / profiles.len() as f64)
                };
                SystemLoadProfile {
                    date,
                    average_load,
                    overloaded_count,
                    resource_count: profiles.len(),
                }
            })
            .collect();

        debug!(days = system.len(), "系统负载聚合完成");
        Ok(system)
    }

    /// 过载/闲置分类
    ///
    /// - 过载: max_load > threshold
    /// - 闲置: avg_load < threshold * 0.5
    ///
    /// 单个资源可能同时落入两类（如单日尖峰但整体空闲）
    pub fn classify(&self, profiles: &[ResourceLoadProfile], threshold: f64) -> LoadClassification {
        let underutilized_line = threshold * UNDERUTILIZATION_RATIO;

        let overloaded: Vec<ResourceLoadProfile> = profiles
            .iter()
            .filter(|p| p.max_load > threshold)
            .cloned()
            .collect();
        let underutilized: Vec<ResourceLoadProfile> = profiles
            .iter()
            .filter(|p| p.avg_load < underutilized_line)
            .cloned()
            .collect();

        debug!(
            threshold,
            overloaded = overloaded.len(),
            underutilized = underutilized.len(),
            "资源负载分类完成"
        );

        LoadClassification {
            overloaded,
            underutilized,
        }
    }
}

/// 系统平均负载: 各日平均负载的算术平均（无日期时为 0）
pub fn system_average_load(system: &[SystemLoadProfile]) -> f64 {
    if system.is_empty() {
        return 0.0;
    }
    round2(system.iter().map(|s| s.average_load).sum::<f64>() / system.len() as f64)
}

impl Default for LoadAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
