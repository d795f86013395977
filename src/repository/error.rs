// ==========================================
// 项目资源负载优化引擎 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 引擎不重试、不持有事务,错误原样向上传递
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据访问错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("持久化失败: {0}")]
    PersistenceFailed(String),

    #[error("查询失败: {0}")]
    QueryFailed(String),

    #[error("锁获取失败: {0}")]
    LockError(String),

    // ===== 数据质量错误 =====
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
