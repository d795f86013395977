// ==========================================
// 项目资源负载优化引擎 - 资源领域模型
// ==========================================
// 职责: 资源实体 + 类型/技能匹配
// ==========================================

use crate::domain::types::{ResourceId, SkillId, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 默认日产能（小时/天）
pub const DEFAULT_DAILY_CAPACITY_H: f64 = 8.0;

fn default_daily_capacity() -> f64 {
    DEFAULT_DAILY_CAPACITY_H
}

fn default_active() -> bool {
    true
}

// ==========================================
// Resource - 资源
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub skills: BTreeSet<SkillId>,

    // ===== 产能 =====
    #[serde(default)]
    pub capacity: f64,       // 周期产能（小时）,缺失按 0 计（数据异常）
    #[serde(default = "default_daily_capacity")]
    pub daily_capacity: f64, // 日产能（小时/天）

    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Resource {
    /// 技能是否覆盖 required（空集视为无要求）
    pub fn has_skills(&self, required: &BTreeSet<SkillId>) -> bool {
        required.is_subset(&self.skills)
    }

    /// 资源类型匹配（None 视为不限类型）
    pub fn matches_type(&self, resource_type: Option<&str>) -> bool {
        match resource_type {
            Some(t) => self.resource_type == t,
            None => true,
        }
    }

    /// 周期产能是否有效（> 0 且有限）
    pub fn has_valid_capacity(&self) -> bool {
        self.capacity.is_finite() && self.capacity > 0.0
    }

    /// 日产能是否有效（> 0 且有限）
    pub fn has_valid_daily_capacity(&self) -> bool {
        self.daily_capacity.is_finite() && self.daily_capacity > 0.0
    }
}
