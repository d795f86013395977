// ==========================================
// 项目资源负载优化引擎 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 引擎为纯函数,只在计算前拒绝非法输入
// ==========================================

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("日期范围非法: start={start} > end={end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("输入为空: {0}")]
    EmptyInput(String),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;

/// 校验日期范围（start <= end）
pub fn ensure_chronological(start: NaiveDate, end: NaiveDate) -> EngineResult<()> {
    if start > end {
        return Err(EngineError::InvalidDateRange { start, end });
    }
    Ok(())
}
