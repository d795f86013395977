// ==========================================
// 项目资源负载优化引擎 - 命令行入口
// ==========================================
// 用法: workload-optimizer <scenario.json> [threshold]
// 场景文件: { resources, tasks, startDate, endDate, projectId?, teamId? }
// 输出: JSON 报告写 stdout,日志写 stderr
// 配置: 环境变量 WORKLOAD_OPTIMIZER_CONFIG 指向配置快照文件（可选）
// 日志: 设置 WORKLOAD_OPTIMIZER_LOG_JSON（0/false/off 除外）时输出 JSON 格式
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use workload_optimizer::api::{
    AutoDistributeRequest, AutoDistributeResponse, RecommendationsResponse, WorkloadApi,
};
use workload_optimizer::cache::InMemoryOptimizationCache;
use workload_optimizer::config::{config_keys, ConfigManager, OptimizerConfigReader};
use workload_optimizer::domain::{
    ingest_tasks, LoadSnapshot, ProjectId, RawTaskRecord, Resource, TeamId,
};
use workload_optimizer::logging;
use workload_optimizer::repository::{InMemoryWorkloadStore, WorkloadRepositories};

const CONFIG_ENV: &str = "WORKLOAD_OPTIMIZER_CONFIG";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scenario {
    resources: Vec<Resource>,
    tasks: Vec<RawTaskRecord>,
    start_date: String,
    end_date: String,
    #[serde(default)]
    project_id: Option<ProjectId>,
    #[serde(default)]
    team_id: Option<TeamId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    app: &'static str,
    version: &'static str,
    load: LoadSnapshot,
    recommendations: RecommendationsResponse,
    redistribution: AutoDistributeResponse,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let scenario_path: PathBuf = match args.next() {
        Some(path) => path.into(),
        None => bail!("用法: workload-optimizer <scenario.json> [threshold]"),
    };
    let threshold_arg = args.next();

    info!("==================================================");
    info!("{} v{}", workload_optimizer::APP_NAME, workload_optimizer::VERSION);
    info!("场景文件: {}", scenario_path.display());
    info!("==================================================");

    let raw = std::fs::read_to_string(&scenario_path)
        .with_context(|| format!("无法读取场景文件: {}", scenario_path.display()))?;
    let scenario: Scenario = serde_json::from_str(&raw).context("场景文件解析失败")?;

    // ===== 配置 =====
    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => ConfigManager::from_file(&path)
            .map_err(|e| anyhow!("配置文件加载失败: {}", e))?,
        None => ConfigManager::new(),
    };
    if let Some(threshold) = &threshold_arg {
        config
            .set_config_value(config_keys::OVERLOAD_THRESHOLD_PCT, threshold)
            .map_err(|e| anyhow!("阈值设置失败: {}", e))?;
    }
    let config = Arc::new(config);
    let settings = config
        .load_settings()
        .await
        .map_err(|e| anyhow!("配置读取失败: {}", e))?;

    // ===== 内存协作方 =====
    let tasks = ingest_tasks(scenario.tasks.clone()).context("任务数据导入失败")?;
    let store = Arc::new(InMemoryWorkloadStore::new(tasks, scenario.resources.clone()));
    let cache: Arc<InMemoryOptimizationCache<RecommendationsResponse>> =
        Arc::new(InMemoryOptimizationCache::with_ttl_secs(
            settings.recommendation_cache_ttl_secs,
        ));
    let api = WorkloadApi::new(WorkloadRepositories::in_memory(store), config, cache);

    // ===== 负载 → 推荐 → 自动分配 =====
    let load = api
        .get_load_data(
            &scenario.start_date,
            &scenario.end_date,
            scenario.project_id,
            scenario.team_id,
        )
        .await?;
    let recommendations = api
        .get_recommendations(
            scenario.project_id,
            scenario.team_id,
            &scenario.start_date,
            &scenario.end_date,
            None,
        )
        .await?;
    let redistribution = api
        .auto_distribute(
            scenario.project_id,
            AutoDistributeRequest {
                tasks: scenario.tasks,
                resources: scenario.resources,
                ..AutoDistributeRequest::default()
            },
        )
        .await?;

    info!(
        overloaded = recommendations.overloaded.len(),
        recommendations = recommendations.recommendations.len(),
        balance_score = redistribution.analysis.balance.score,
        "优化完成"
    );

    let report = Report {
        app: workload_optimizer::APP_NAME,
        version: workload_optimizer::VERSION,
        load,
        recommendations,
        redistribution,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
