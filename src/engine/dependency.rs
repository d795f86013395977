// ==========================================
// 项目资源负载优化引擎 - 任务依赖链接口
// ==========================================
// 职责: 任务前后置依赖分层的扩展点
// 现状: 仅提供空实现,再分配算法只对无依赖任务集正确
// ==========================================

use crate::domain::task::Task;
use crate::domain::types::TaskId;
use serde::{Deserialize, Serialize};

/// 依赖链（按拓扑层级排列的任务ID）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyChain {
    pub levels: Vec<Vec<TaskId>>,
}

/// 依赖链构建器 Trait
///
/// 由外部实现注入；未注入时使用 `NoDependencyChains`
pub trait DependencyChainBuilder: Send + Sync {
    fn build_dependency_chains(&self, tasks: &[Task]) -> Vec<DependencyChain>;
}

/// 空实现: 始终返回空依赖链
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDependencyChains;

impl DependencyChainBuilder for NoDependencyChains {
    fn build_dependency_chains(&self, _tasks: &[Task]) -> Vec<DependencyChain> {
        Vec::new()
    }
}
