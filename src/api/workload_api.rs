// ==========================================
// 项目资源负载优化引擎 - 负载优化 API
// ==========================================
// 职责: 校验 → 协作方取数 → 引擎计算 → 持久化 → 返回
// 架构: API 层 → Engine 层（纯计算）/ Repository 层（协作方）
// 红线: 引擎不做 I/O；批次状态与事务边界归协作方所有
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::api::dto::{
    ApplyOptimizationResponse, AutoDistributeRequest, AutoDistributeResponse,
    PredictionResponse, RecommendationsResponse, RedistributionAnalysis,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator;
use crate::cache::{OptimizationCache, OptimizationKey};
use crate::config::{OptimizerConfigReader, OptimizerSettings};
use crate::domain::load::ResourceLoadProfile;
use crate::domain::optimization::{
    LoadSnapshot, ModificationResult, Recommendation, TaskModification,
};
use crate::domain::resource::Resource;
use crate::domain::task::{ingest_tasks, RawTaskRecord, Task};
use crate::domain::types::{ModificationStatus, ProjectId, ResourceId, TaskId, TeamId};
use crate::engine::{
    planned_hours_by_resource, BalanceScorer, DependencyChainBuilder, LoadAnalyzer,
    PredictionEngine, RecommendationEngine, RedistributionPlanner, WorkloadCalculator,
};
use crate::repository::{NewOptimization, NewPrediction, WorkloadRepositories};

/// 推荐结果缓存
pub type RecommendationCache = dyn OptimizationCache<RecommendationsResponse>;

// ==========================================
// WorkloadApi - 负载优化 API
// ==========================================
pub struct WorkloadApi {
    repos: WorkloadRepositories,
    config: Arc<dyn OptimizerConfigReader>,
    cache: Arc<RecommendationCache>,
    calculator: WorkloadCalculator,
    analyzer: LoadAnalyzer,
    recommender: RecommendationEngine,
    planner: RedistributionPlanner,
    predictor: PredictionEngine,
}

impl WorkloadApi {
    /// 创建新的 WorkloadApi 实例
    ///
    /// # 参数
    /// - repos: 协作方仓储集合
    /// - config: 配置读取器
    /// - cache: 推荐结果缓存/运行锁
    pub fn new(
        repos: WorkloadRepositories,
        config: Arc<dyn OptimizerConfigReader>,
        cache: Arc<RecommendationCache>,
    ) -> Self {
        Self {
            repos,
            config,
            cache,
            calculator: WorkloadCalculator::new(),
            analyzer: LoadAnalyzer::new(),
            recommender: RecommendationEngine::new(),
            planner: RedistributionPlanner::new(),
            predictor: PredictionEngine::new(),
        }
    }

    /// 注入依赖链构建器
    pub fn with_dependency_builder(mut self, builder: Arc<dyn DependencyChainBuilder>) -> Self {
        self.planner = RedistributionPlanner::with_dependency_builder(builder);
        self
    }

    // ==========================================
    // 负载查询
    // ==========================================

    /// 查询负载数据（资源画像 + 系统日负载）
    ///
    /// # 参数
    /// - team_id: 指定时只统计该团队的活跃资源,否则统计全部活跃资源
    #[instrument(skip(self))]
    pub async fn get_load_data(
        &self,
        start_date: &str,
        end_date: &str,
        project_id: Option<ProjectId>,
        team_id: Option<TeamId>,
    ) -> ApiResult<LoadSnapshot> {
        let settings = self.load_settings().await?;
        let (start, end) =
            validator::validate_date_range(start_date, end_date, settings.max_range_days)?;

        let (snapshot, _, _) = self.load_snapshot(start, end, project_id, team_id).await?;
        Ok(snapshot)
    }

    /// 查询指定资源的负载画像（未指定时为全部活跃资源）
    #[instrument(skip(self))]
    pub async fn get_resource_load(
        &self,
        resource_ids: Option<&[ResourceId]>,
        start_date: &str,
        end_date: &str,
    ) -> ApiResult<Vec<ResourceLoadProfile>> {
        let settings = self.load_settings().await?;
        let (start, end) =
            validator::validate_date_range(start_date, end_date, settings.max_range_days)?;

        let resources = match resource_ids {
            Some(ids) if !ids.is_empty() => {
                let ids = validator::dedup_resource_ids(ids);
                self.repos.resource_repo.get_resources_by_ids(&ids).await?
            }
            _ => self.repos.resource_repo.get_all_active_resources().await?,
        };

        self.compute_profiles(&resources, start, end).await
    }

    // ==========================================
    // 转移推荐
    // ==========================================

    /// 生成转移推荐并持久化为 PENDING 批次
    ///
    /// 同一 (项目, 团队, 窗口, 阈值) 优先返回缓存；并发的重复请求返回 OptimizationInProgress
    #[instrument(skip(self))]
    pub async fn get_recommendations(
        &self,
        project_id: Option<ProjectId>,
        team_id: Option<TeamId>,
        start_date: &str,
        end_date: &str,
        threshold: Option<f64>,
    ) -> ApiResult<RecommendationsResponse> {
        let settings = self.load_settings().await?;
        let (start, end) =
            validator::validate_date_range(start_date, end_date, settings.max_range_days)?;
        let threshold =
            validator::validate_threshold(threshold.unwrap_or(settings.overload_threshold_pct))?;

        let key = OptimizationKey::new(project_id, team_id, start, end, threshold);
        if let Some(cached) = self.cache.get(&key) {
            info!(optimization_id = %cached.optimization_id, "返回缓存的推荐结果");
            return Ok(cached);
        }

        let _guard = self.cache.try_acquire(&key).ok_or_else(|| {
            ApiError::OptimizationInProgress(format!(
                "项目{:?} {}~{} 阈值{} 的优化正在执行",
                project_id, start, end, threshold
            ))
        })?;

        let (snapshot, resources, tasks) =
            self.load_snapshot(start, end, project_id, team_id).await?;

        let classification = self.analyzer.classify(&snapshot.resource_loads, threshold);
        let recommendations =
            self.recommender
                .recommend(&classification, &resources, &tasks, threshold);

        let optimization_id = self
            .repos
            .optimization_repo
            .save_recommendations(NewOptimization {
                project_id,
                team_id,
                start_date: start,
                end_date: end,
                threshold,
                recommendations: recommendations.clone(),
            })
            .await?;

        let response = RecommendationsResponse {
            optimization_id,
            threshold,
            overloaded: classification.overloaded,
            underutilized: classification.underutilized,
            recommendations,
        };
        self.cache.set(key, response.clone());

        info!(
            optimization_id = %response.optimization_id,
            recommendations = response.recommendations.len(),
            "推荐批次已保存"
        );
        Ok(response)
    }

    // ==========================================
    // 自动分配
    // ==========================================

    /// 在给定任务与资源上生成再分配方案并持久化
    ///
    /// 基线任务数取自任务当前的 resource_id
    #[instrument(skip(self, request), fields(
        tasks_count = request.tasks.len(),
        resources_count = request.resources.len()
    ))]
    pub async fn auto_distribute(
        &self,
        project_id: Option<ProjectId>,
        request: AutoDistributeRequest,
    ) -> ApiResult<AutoDistributeResponse> {
        let settings = self.load_settings().await?;
        validator::validate_auto_distribute(
            &request.tasks,
            &request.resources,
            &request.constraints,
        )?;

        let tasks = ingest_tasks(request.tasks)?;
        let resources = request.resources;

        let plan = self
            .planner
            .plan(&tasks, &resources, &request.constraints)?;

        let mut baseline: HashMap<ResourceId, usize> = HashMap::new();
        for resource_id in tasks.iter().filter_map(|t| t.resource_id) {
            *baseline.entry(resource_id).or_default() += 1;
        }
        let balance = BalanceScorer::with_tolerance(settings.balance_tolerance)
            .score(&plan, &resources, &baseline);

        let task_by_id: HashMap<TaskId, &Task> = tasks.iter().map(|t| (t.id, t)).collect();
        let moved_count = plan
            .iter()
            .filter(|entry| {
                task_by_id
                    .get(&entry.task_id)
                    .map_or(true, |t| t.resource_id != Some(entry.resource_id))
            })
            .count();

        let analysis = RedistributionAnalysis {
            balance,
            resource_loads: planned_hours_by_resource(&plan, &tasks, &resources),
            total_tasks: plan.len(),
            fixed_count: plan.iter().filter(|e| e.is_fixed).count(),
            moved_count,
        };

        let analysis_json = serde_json::to_value(&analysis)
            .map_err(|e| ApiError::InternalError(format!("分析结果序列化失败: {}", e)))?;
        let redistribution_id = self
            .repos
            .optimization_repo
            .save_redistribution_plan(project_id, &plan, analysis_json)
            .await?;

        info!(
            %redistribution_id,
            score = analysis.balance.score,
            moved = analysis.moved_count,
            "再分配方案已保存"
        );

        Ok(AutoDistributeResponse {
            redistribution_id,
            plan,
            analysis,
        })
    }

    // ==========================================
    // 采纳调整
    // ==========================================

    /// 采纳推荐批次中的调整
    ///
    /// 规则:
    /// 1) 批次不存在 → NotFound
    /// 2) 逐行更新任务资源,失败行记 FAILED 并继续
    /// 3) 保存采纳记录,批次标记 APPLIED,清除项目缓存
    /// 4) 重算受影响资源在批次窗口内的负载
    #[instrument(skip(self, modifications), fields(modifications_count = modifications.len()))]
    pub async fn apply_optimization(
        &self,
        optimization_id: &str,
        modifications: &[TaskModification],
    ) -> ApiResult<ApplyOptimizationResponse> {
        validator::validate_modifications(optimization_id, modifications)?;

        let optimization = self
            .repos
            .optimization_repo
            .get_optimization(optimization_id)
            .await?;

        let mut update_results = Vec::with_capacity(modifications.len());
        for modification in modifications {
            let result = match self
                .repos
                .task_repo
                .update_task_resource(modification.task_id, modification.new_resource_id)
                .await
            {
                Ok(()) => ModificationResult {
                    task_id: modification.task_id,
                    new_resource_id: modification.new_resource_id,
                    status: ModificationStatus::Success,
                    error: None,
                },
                Err(e) => {
                    warn!(
                        task_id = modification.task_id,
                        new_resource_id = modification.new_resource_id,
                        error = %e,
                        "任务资源更新失败"
                    );
                    ModificationResult {
                        task_id: modification.task_id,
                        new_resource_id: modification.new_resource_id,
                        status: ModificationStatus::Failed,
                        error: Some(e.to_string()),
                    }
                }
            };
            update_results.push(result);
        }

        let applied_id = self
            .repos
            .optimization_repo
            .save_applied_optimization(optimization_id, &update_results)
            .await?;
        self.repos
            .optimization_repo
            .mark_optimization_applied(optimization_id)
            .await?;
        self.cache.invalidate_project(optimization.project_id);

        // 受影响资源: 成功行的新资源 + 推荐中记录的原资源
        let mut affected: Vec<ResourceId> = Vec::new();
        for result in update_results
            .iter()
            .filter(|r| r.status == ModificationStatus::Success)
        {
            affected.push(result.new_resource_id);
            if let Some(source) = source_resource_of(&optimization.recommendations, result.task_id) {
                affected.push(source);
            }
        }
        let affected = validator::dedup_resource_ids(&affected);

        let post_optimization_load = if affected.is_empty() {
            Vec::new()
        } else {
            let resources = self
                .repos
                .resource_repo
                .get_resources_by_ids(&affected)
                .await?;
            self.compute_profiles(&resources, optimization.start_date, optimization.end_date)
                .await?
        };

        let succeeded = update_results
            .iter()
            .filter(|r| r.status == ModificationStatus::Success)
            .count();
        info!(%applied_id, succeeded, total = update_results.len(), "调整采纳完成");

        Ok(ApplyOptimizationResponse {
            applied_id,
            update_results,
            post_optimization_load,
        })
    }

    // ==========================================
    // 负载预测
    // ==========================================

    /// 预测新任务对负载的影响并持久化
    #[instrument(skip(self, new_tasks), fields(new_tasks_count = new_tasks.len()))]
    pub async fn predict_future_load(
        &self,
        project_id: Option<ProjectId>,
        team_id: Option<TeamId>,
        start_date: &str,
        end_date: &str,
        new_tasks: Vec<RawTaskRecord>,
    ) -> ApiResult<PredictionResponse> {
        let settings = self.load_settings().await?;
        let (start, end) =
            validator::validate_date_range(start_date, end_date, settings.max_range_days)?;
        validator::validate_new_tasks(&new_tasks)?;
        let new_tasks = ingest_tasks(new_tasks)?;

        let (current, mut resources, _) =
            self.load_snapshot(start, end, project_id, team_id).await?;

        // 新任务指向当前范围外的资源时补充查询
        let missing: Vec<ResourceId> = validator::dedup_resource_ids(
            &new_tasks
                .iter()
                .filter_map(|t| t.resource_id)
                .filter(|id| !resources.iter().any(|r| r.id == *id))
                .collect::<Vec<_>>(),
        );
        if !missing.is_empty() {
            resources.extend(self.repos.resource_repo.get_resources_by_ids(&missing).await?);
        }

        let outcome =
            self.predictor
                .predict(&current.resource_loads, &resources, &new_tasks, start, end)?;

        let prediction_id = self
            .repos
            .optimization_repo
            .save_prediction(NewPrediction {
                project_id,
                team_id,
                start_date: start,
                end_date: end,
                new_task_ids: new_tasks.iter().map(|t| t.id).collect::<Vec<TaskId>>(),
                diff: outcome.diff.clone(),
            })
            .await?;

        Ok(PredictionResponse {
            prediction_id,
            current_load: current,
            predicted_load: LoadSnapshot {
                resource_loads: outcome.predicted_profiles,
                system_load_by_date: outcome.predicted_system,
            },
            difference: outcome.diff,
        })
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    async fn load_settings(&self) -> ApiResult<OptimizerSettings> {
        self.config
            .load_settings()
            .await
            .map_err(|e| ApiError::InternalError(format!("配置读取失败: {}", e)))
    }

    /// 取数并计算负载快照,同时返回参与计算的资源与任务
    async fn load_snapshot(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        project_id: Option<ProjectId>,
        team_id: Option<TeamId>,
    ) -> ApiResult<(LoadSnapshot, Vec<Resource>, Vec<Task>)> {
        let resources = match team_id {
            Some(team) => self.repos.resource_repo.get_resources_by_team_id(team).await?,
            None => self.repos.resource_repo.get_all_active_resources().await?,
        };
        let tasks = self
            .repos
            .task_repo
            .get_tasks_by_date_range(start, end, project_id, team_id)
            .await?;

        let resource_loads = self.calculator.compute_all(&tasks, &resources, start, end)?;
        let system_load_by_date = self.analyzer.aggregate(&resource_loads, start, end)?;

        Ok((
            LoadSnapshot {
                resource_loads,
                system_load_by_date,
            },
            resources,
            tasks,
        ))
    }

    async fn compute_profiles(
        &self,
        resources: &[Resource],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ApiResult<Vec<ResourceLoadProfile>> {
        let ids: Vec<ResourceId> = resources.iter().map(|r| r.id).collect();
        let tasks = self
            .repos
            .task_repo
            .get_tasks_by_resource_ids(&ids, start, end)
            .await?;
        Ok(self.calculator.compute_all(&tasks, resources, start, end)?)
    }
}

/// 推荐中记录的任务原资源
fn source_resource_of(
    recommendations: &[Recommendation],
    task_id: TaskId,
) -> Option<ResourceId> {
    recommendations
        .iter()
        .find(|r| r.task_id == task_id)
        .map(|r| r.current_resource_id)
}
