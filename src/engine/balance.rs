// ==========================================
// 项目资源负载优化引擎 - 均衡评分引擎
// ==========================================
// 职责: 评价再分配方案在资源间的任务数分布均匀程度
// 输入: 方案 + 资源 + 基线任务数
// 输出: BalanceScore（score ∈ [0, 100]）
// ==========================================

use crate::domain::load::round2;
use crate::domain::optimization::{BalanceScore, RedistributionPlanEntry, ResourceBalance};
use crate::domain::resource::Resource;
use crate::domain::types::ResourceId;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// 默认均衡容差（任务数变化绝对值）
pub const DEFAULT_BALANCE_TOLERANCE: i64 = 2;

// ==========================================
// BalanceScorer - 均衡评分引擎
// ==========================================
pub struct BalanceScorer {
    tolerance: i64,
}

impl BalanceScorer {
    pub fn new() -> Self {
        Self {
            tolerance: DEFAULT_BALANCE_TOLERANCE,
        }
    }

    pub fn with_tolerance(tolerance: i64) -> Self {
        Self {
            tolerance: tolerance.abs(),
        }
    }

    /// 计算均衡评分
    ///
    /// 规则:
    /// 1) task_count: 方案中分配到该资源的任务数
    /// 2) task_count_change = task_count - baseline（基线缺省为 0）
    /// 3) 资源数 <= 1 或标准差为 0 → 100
    /// 4) worst_case = sqrt((avg * n)^2) / n（全部集中到单一资源的参照值）
    /// 5) score = clamp(100 * (1 - std_dev / worst_case), 0, 100)
    #[instrument(skip_all, fields(
        plan_size = plan.len(),
        resources_count = resources.len(),
        tolerance = self.tolerance
    ))]
    pub fn score(
        &self,
        plan: &[RedistributionPlanEntry],
        resources: &[Resource],
        baseline: &HashMap<ResourceId, usize>,
    ) -> BalanceScore {
        let mut counts: HashMap<ResourceId, usize> = HashMap::new();
        for entry in plan {
            *counts.entry(entry.resource_id).or_default() += 1;
        }

        let balances: Vec<ResourceBalance> = resources
            .iter()
            .map(|r| {
                let task_count = counts.get(&r.id).copied().unwrap_or(0);
                let before = baseline.get(&r.id).copied().unwrap_or(0);
                let task_count_change = task_count as i64 - before as i64;
                ResourceBalance {
                    resource_id: r.id,
                    resource_name: r.name.clone(),
                    task_count,
                    task_count_change,
                    is_balanced: task_count_change.abs() <= self.tolerance,
                }
            })
            .collect();

        let n = balances.len();
        if n == 0 {
            return BalanceScore {
                score: 100.0,
                std_dev: 0.0,
                avg_task_count: 0.0,
                resources: balances,
            };
        }

        let n_f = n as f64;
        let avg = balances.iter().map(|b| b.task_count as f64).sum::<f64>() / n_f;
        let variance = balances
            .iter()
            .map(|b| (b.task_count as f64 - avg).powi(2))
            .sum::<f64>()
            / n_f;
        let std_dev = variance.sqrt();

        let score = if n <= 1 || std_dev == 0.0 {
            100.0
        } else {
            let worst_case = ((avg * n_f).powi(2)).sqrt() / n_f;
            if worst_case == 0.0 {
                100.0
            } else {
                (100.0 * (1.0 - std_dev / worst_case)).clamp(0.0, 100.0)
            }
        };

        debug!(score, std_dev, avg, "均衡评分完成");

        BalanceScore {
            score: round2(score),
            std_dev: round2(std_dev),
            avg_task_count: round2(avg),
            resources: balances,
        }
    }
}

impl Default for BalanceScorer {
    fn default() -> Self {
        Self::new()
    }
}
