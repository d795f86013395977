// ==========================================
// 项目资源负载优化引擎 - 配置层
// ==========================================
// 职责: 阈值/容差/缓存有效期等运行配置
// 存储: 内存 key-value,支持 JSON 快照导入导出
// ==========================================

pub mod config_manager;
pub mod optimizer_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use optimizer_config_trait::{ConfigResult, OptimizerConfigReader, OptimizerSettings};
