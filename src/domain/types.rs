// ==========================================
// 项目资源负载优化引擎 - 领域类型定义
// ==========================================
// 职责: 优先级、工作量、批次状态等有序/标签类型
// 红线: 优先级是有序枚举,禁止比较原始字符串
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 资源ID / 任务ID（由外部持久化层分配）
pub type TaskId = i64;
pub type ResourceId = i64;
pub type SkillId = i64;
pub type ProjectId = i64;
pub type TeamId = i64;

// ==========================================
// 任务优先级 (Priority)
// ==========================================
// 顺序: Low < Medium < High < Urgent
// "可移动任务" 判定依赖此顺序 (priority < High)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,    // 低
    Medium, // 中
    High,   // 高
    Urgent, // 紧急
}

impl Priority {
    /// 是否低于 High（可被推荐引擎移动的优先级）
    pub fn is_below_high(&self) -> bool {
        *self < Priority::High
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(format!("未知优先级: {}", other)),
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

// ==========================================
// 工作量 (Workload)
// ==========================================
// effort / duration 在导入时统一为此标签类型,下游只有一条计算路径
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Workload {
    /// 总工时
    #[serde(rename_all = "camelCase")]
    Effort { total_hours: f64 },
    /// 持续工时（附带按日历天摊分的日工时）
    #[serde(rename_all = "camelCase")]
    Duration { total_hours: f64, daily_hours: f64 },
}

impl Workload {
    /// 总工时（两种表示统一出口）
    pub fn total_hours(&self) -> f64 {
        match self {
            Workload::Effort { total_hours } => *total_hours,
            Workload::Duration { total_hours, .. } => *total_hours,
        }
    }

    /// 构造 Duration 工作量，span_days 至少按 1 天计
    pub fn duration(total_hours: f64, span_days: i64) -> Self {
        let span = span_days.max(1) as f64;
        Workload::Duration {
            total_hours,
            daily_hours: total_hours / span,
        }
    }
}

impl Default for Workload {
    fn default() -> Self {
        Workload::Effort { total_hours: 0.0 }
    }
}

// ==========================================
// 优化批次状态 (Optimization Status)
// ==========================================
// 状态机归外部持久化层所有: PENDING → APPLIED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizationStatus {
    Pending, // 已生成,待采纳
    Applied, // 已采纳(部分或全部)
}

impl OptimizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationStatus::Pending => "PENDING",
            OptimizationStatus::Applied => "APPLIED",
        }
    }
}

impl fmt::Display for OptimizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 单条调整结果状态 (Modification Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModificationStatus {
    Success,
    Failed,
}

impl ModificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModificationStatus::Success => "SUCCESS",
            ModificationStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ModificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
