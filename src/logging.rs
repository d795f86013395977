// ==========================================
// 日志系统初始化
// ==========================================
// 日志统一写 stderr,stdout 只留给报告
// RUST_LOG 控制级别；WORKLOAD_OPTIMIZER_LOG_JSON 切换 JSON 格式
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 设置后输出 JSON 日志（值为 0/false/off 时视为未设置）
pub const LOG_JSON_ENV: &str = "WORKLOAD_OPTIMIZER_LOG_JSON";

const DEFAULT_DIRECTIVE: &str = "info";
const TEST_DIRECTIVE: &str = "workload_optimizer=debug";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 人读格式（带 target 与行号）
    Pretty,
    /// 单行 JSON,便于采集
    Json,
}

impl LogFormat {
    /// 按环境变量取值解析格式
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            None => LogFormat::Pretty,
            Some(v) if v.is_empty() || v == "0" || v == "false" || v == "off" => {
                LogFormat::Pretty
            }
            Some(_) => LogFormat::Json,
        }
    }

    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(LOG_JSON_ENV).ok().as_deref())
    }
}

/// RUST_LOG 优先,未设置或非法时回落到 default_directive
fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// 初始化日志系统（格式由 WORKLOAD_OPTIMIZER_LOG_JSON 决定）
///
/// # 示例
/// ```no_run
/// use workload_optimizer::logging;
/// logging::init();
/// ```
pub fn init() {
    init_with(LogFormat::from_env());
}

/// 以指定格式初始化
pub fn init_with(format: LogFormat) {
    let builder = fmt()
        .with_env_filter(env_filter(DEFAULT_DIRECTIVE))
        .with_target(true)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.with_line_number(true).init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// 测试环境日志: 本 crate debug 级别,输出交给测试框架捕获
///
/// 可重复调用,已初始化时静默忽略
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(env_filter(TEST_DIRECTIVE))
        .with_test_writer()
        .try_init();
}
