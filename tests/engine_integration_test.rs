// ==========================================
// 引擎集成测试
// ==========================================
// 覆盖: 负载计算 → 分析分类 → 转移推荐 → 再分配/均衡评分 → 负载预测
// 日期基准: 2026-01-19 为周一
// ==========================================


use std::collections::HashMap;

use test_helpers::{date, ResourceBuilder, TaskBuilder};
use workload_optimizer::domain::calendar::days_between;
use workload_optimizer::domain::{
    FixedAssignment, LoadConstraint, Priority, RedistributionConstraints, RedistributionPlanEntry,
    ResourceId, ResourceLoadProfile,
};
use workload_optimizer::engine::{
    BalanceScorer, LoadAnalyzer, PredictionEngine, RecommendationEngine, RedistributionPlanner,
    WorkloadCalculator,
};

fn profile_of(profiles: &[ResourceLoadProfile], resource_id: ResourceId) -> &ResourceLoadProfile {
    profiles
        .iter()
        .find(|p| p.resource_id == resource_id)
        .unwrap()
}

// ==========================================
// 负载计算
// ==========================================

#[test]
fn test_profile_covers_every_calendar_day() {
    let calculator = WorkloadCalculator::new();
    let resource = ResourceBuilder::new(1).build();
    let task = TaskBuilder::new(1, date(2026, 1, 5), date(2026, 1, 9))
        .effort(20.0)
        .resource(1)
        .build();

    let windows = [
        (date(2026, 1, 19), date(2026, 1, 19)),
        (date(2026, 1, 1), date(2026, 1, 31)),
        (date(2025, 12, 1), date(2026, 2, 28)),
    ];
    for (start, end) in windows {
        let profile = calculator
            .compute_resource_load(&[&task], &resource, start, end)
            .unwrap();
        assert_eq!(
            profile.load_by_date.len() as i64,
            days_between(start, end) + 1
        );
        assert_eq!(profile.load_by_date.first().unwrap().date, start);
        assert_eq!(profile.load_by_date.last().unwrap().date, end);
    }
}

#[test]
fn test_stats_ignore_weekends() {
    let calculator = WorkloadCalculator::new();
    let resource = ResourceBuilder::new(1).build();
    // 周六/周日各 8h
    let weekend = TaskBuilder::new(1, date(2026, 1, 24), date(2026, 1, 25))
        .effort(16.0)
        .resource(1)
        .build();

    let only_weekend = calculator
        .compute_resource_load(&[&weekend], &resource, date(2026, 1, 24), date(2026, 1, 25))
        .unwrap();
    assert_eq!(only_weekend.load_by_date[0].load_percent, 100.0);
    assert_eq!(only_weekend.avg_load, 0.0);
    assert_eq!(only_weekend.max_load, 0.0);

    // 周五 4h + 周末满载: 统计只看周五
    let friday = TaskBuilder::new(2, date(2026, 1, 23), date(2026, 1, 23))
        .effort(4.0)
        .resource(1)
        .build();
    let with_friday = calculator
        .compute_resource_load(
            &[&weekend, &friday],
            &resource,
            date(2026, 1, 23),
            date(2026, 1, 25),
        )
        .unwrap();
    assert_eq!(with_friday.avg_load, 50.0);
    assert_eq!(with_friday.max_load, 50.0);
}

#[test]
fn test_daily_hours_sum_back_to_effort() {
    let calculator = WorkloadCalculator::new();
    let resource = ResourceBuilder::new(1).build();

    let tasks = [
        TaskBuilder::new(1, date(2026, 1, 19), date(2026, 1, 21))
            .effort(10.0)
            .resource(1)
            .build(),
        TaskBuilder::new(2, date(2026, 1, 19), date(2026, 1, 25))
            .duration(37.0)
            .resource(1)
            .build(),
    ];

    for task in &tasks {
        let profile = calculator
            .compute_resource_load(&[task], &resource, task.start_date, task.end_date)
            .unwrap();
        let total: f64 = profile.load_by_date.iter().map(|d| d.work_hours).sum();
        assert!((total - task.total_hours()).abs() <= 0.01);
    }
}

#[test]
fn test_three_day_task_fills_capacity() {
    let calculator = WorkloadCalculator::new();
    let resource = ResourceBuilder::new(1).daily_capacity(8.0).build();
    let task = TaskBuilder::new(1, date(2026, 1, 19), date(2026, 1, 21))
        .effort(24.0)
        .resource(1)
        .build();

    let profile = calculator
        .compute_resource_load(&[&task], &resource, date(2026, 1, 19), date(2026, 1, 21))
        .unwrap();

    assert_eq!(profile.load_by_date.len(), 3);
    for day in &profile.load_by_date {
        assert_eq!(day.work_hours, 8.0);
        assert_eq!(day.load_percent, 100.0);
        assert_eq!(day.task_ids, vec![1]);
    }
}

#[test]
fn test_zero_daily_capacity_does_not_crash() {
    let calculator = WorkloadCalculator::new();
    let resource = ResourceBuilder::new(1).daily_capacity(0.0).build();
    let task = TaskBuilder::new(1, date(2026, 1, 19), date(2026, 1, 19))
        .effort(8.0)
        .resource(1)
        .build();

    let profile = calculator
        .compute_resource_load(&[&task], &resource, date(2026, 1, 19), date(2026, 1, 19))
        .unwrap();
    assert_eq!(profile.load_by_date[0].work_hours, 8.0);
    assert_eq!(profile.load_by_date[0].load_percent, 0.0);
}

// ==========================================
// 负载分析
// ==========================================

#[test]
fn test_classify_overloaded_and_underutilized() {
    let calculator = WorkloadCalculator::new();
    let analyzer = LoadAnalyzer::new();
    let resources = vec![ResourceBuilder::new(1).build(), ResourceBuilder::new(2).build()];
    let tasks = vec![
        // A: 周一 8.8h → 110%
        TaskBuilder::new(1, date(2026, 1, 19), date(2026, 1, 19))
            .effort(8.8)
            .resource(1)
            .build(),
        // B: 每天 2.8h → 35%
        TaskBuilder::new(2, date(2026, 1, 19), date(2026, 1, 23))
            .effort(14.0)
            .resource(2)
            .build(),
    ];

    let profiles = calculator
        .compute_all(&tasks, &resources, date(2026, 1, 19), date(2026, 1, 23))
        .unwrap();
    assert_eq!(profile_of(&profiles, 1).max_load, 110.0);
    assert_eq!(profile_of(&profiles, 2).avg_load, 35.0);

    let classification = analyzer.classify(&profiles, 80.0);
    let overloaded: Vec<ResourceId> = classification.overloaded.iter().map(|p| p.resource_id).collect();
    let underutilized: Vec<ResourceId> = classification
        .underutilized
        .iter()
        .map(|p| p.resource_id)
        .collect();

    assert_eq!(overloaded, vec![1]);
    assert!(underutilized.contains(&2));
}

#[test]
fn test_system_profile_averages_resources() {
    let calculator = WorkloadCalculator::new();
    let analyzer = LoadAnalyzer::new();
    let resources = vec![ResourceBuilder::new(1).build(), ResourceBuilder::new(2).build()];
    let tasks = vec![TaskBuilder::new(1, date(2026, 1, 19), date(2026, 1, 19))
        .effort(12.0)
        .resource(1)
        .build()];

    let profiles = calculator
        .compute_all(&tasks, &resources, date(2026, 1, 19), date(2026, 1, 20))
        .unwrap();
    let system = analyzer
        .aggregate(&profiles, date(2026, 1, 19), date(2026, 1, 20))
        .unwrap();

    assert_eq!(system.len(), 2);
    assert_eq!(system[0].average_load, 75.0);
    assert_eq!(system[0].overloaded_count, 1);
    assert_eq!(system[1].average_load, 0.0);
    assert_eq!(system[1].overloaded_count, 0);

    let empty = analyzer
        .aggregate(&[], date(2026, 1, 19), date(2026, 1, 20))
        .unwrap();
    assert!(empty.iter().all(|d| d.average_load == 0.0));
}

// ==========================================
// 转移推荐
// ==========================================

#[test]
fn test_recommendations_respect_target_threshold() {
    let calculator = WorkloadCalculator::new();
    let analyzer = LoadAnalyzer::new();
    let recommender = RecommendationEngine::new();
    let threshold = 80.0;

    let resources = vec![
        ResourceBuilder::new(1).build(),
        ResourceBuilder::new(2).daily_capacity(24.0).build(),
        ResourceBuilder::new(3).build(),
        ResourceBuilder::new(4).resource_type("designer").build(),
    ];
    let tasks = vec![
        TaskBuilder::new(1, date(2026, 1, 19), date(2026, 1, 20))
            .effort(16.0)
            .resource(1)
            .build(),
        TaskBuilder::new(2, date(2026, 1, 19), date(2026, 1, 19))
            .effort(8.0)
            .priority(Priority::Low)
            .resource(1)
            .build(),
        TaskBuilder::new(3, date(2026, 1, 19), date(2026, 1, 19))
            .effort(8.0)
            .priority(Priority::High)
            .resource(1)
            .build(),
        TaskBuilder::new(4, date(2026, 1, 19), date(2026, 1, 23))
            .effort(20.0)
            .resource(3)
            .build(),
    ];

    let start = date(2026, 1, 19);
    let end = date(2026, 1, 23);
    let profiles = calculator.compute_all(&tasks, &resources, start, end).unwrap();
    let classification = analyzer.classify(&profiles, threshold);
    let recommendations = recommender.recommend(&classification, &resources, &tasks, threshold);

    let moved: Vec<_> = recommendations.iter().map(|r| r.task_id).collect();
    assert_eq!(moved, vec![1, 2]);

    // 同一目标同日的转入工时累计后仍不超过阈值
    let mut incoming = 0.0;
    for rec in &recommendations {
        assert_eq!(rec.current_resource_id, 1);
        assert_eq!(rec.suggested_resource_id, 2);
        assert_eq!(rec.overload_date, start);

        let task = tasks.iter().find(|t| t.id == rec.task_id).unwrap();
        let target = resources.iter().find(|r| r.id == rec.suggested_resource_id).unwrap();
        let target_day = profile_of(&profiles, target.id).load_on(rec.overload_date).unwrap();
        incoming += task.daily_hours();
        let after = target_day.load_percent + incoming / target.daily_capacity * 100.0;
        assert!(after <= threshold);
        assert!(target_day.can_absorb(incoming, threshold));
    }

    // 预期负载下降 = 总工时 / 源资源周期产能
    assert_eq!(recommendations[0].expected_load_reduction, 40.0);
    assert_eq!(recommendations[1].expected_load_reduction, 20.0);
}

#[test]
fn test_no_candidate_yields_empty_list() {
    let calculator = WorkloadCalculator::new();
    let analyzer = LoadAnalyzer::new();
    let recommender = RecommendationEngine::new();

    let resources = vec![
        ResourceBuilder::new(1).build(),
        ResourceBuilder::new(2).resource_type("designer").build(),
    ];
    let tasks = vec![TaskBuilder::new(1, date(2026, 1, 19), date(2026, 1, 19))
        .effort(12.0)
        .resource(1)
        .build()];

    let profiles = calculator
        .compute_all(&tasks, &resources, date(2026, 1, 19), date(2026, 1, 23))
        .unwrap();
    let classification = analyzer.classify(&profiles, 80.0);
    assert_eq!(classification.overloaded.len(), 1);

    let recommendations = recommender.recommend(&classification, &resources, &tasks, 80.0);
    assert!(recommendations.is_empty());
}

// ==========================================
// 再分配 + 均衡评分
// ==========================================

fn redistribution_fixture() -> (Vec<workload_optimizer::domain::Task>, Vec<workload_optimizer::domain::Resource>) {
    let resources = vec![
        ResourceBuilder::new(1).skills(&[1]).build(),
        ResourceBuilder::new(2).skills(&[1, 2]).build(),
        ResourceBuilder::new(3).resource_type("tester").build(),
    ];
    let tasks = vec![
        TaskBuilder::new(1, date(2026, 1, 19), date(2026, 1, 23))
            .effort(16.0)
            .priority(Priority::Low)
            .resource(1)
            .build(),
        TaskBuilder::new(2, date(2026, 1, 19), date(2026, 1, 20))
            .effort(8.0)
            .priority(Priority::Urgent)
            .resource(1)
            .build(),
        TaskBuilder::new(3, date(2026, 1, 19), date(2026, 1, 21))
            .effort(12.0)
            .skills(&[2])
            .resource(1)
            .build(),
        TaskBuilder::new(4, date(2026, 1, 19), date(2026, 1, 22))
            .effort(6.0)
            .resource_type("tester")
            .resource(1)
            .build(),
        TaskBuilder::new(5, date(2026, 1, 19), date(2026, 1, 19))
            .effort(40.0)
            .priority(Priority::High)
            .resource(1)
            .build(),
    ];
    (tasks, resources)
}

#[test]
fn test_plan_is_deterministic() {
    let planner = RedistributionPlanner::new();
    let (tasks, resources) = redistribution_fixture();
    let constraints = RedistributionConstraints::default();

    let first = planner.plan(&tasks, &resources, &constraints).unwrap();
    for _ in 0..5 {
        assert_eq!(planner.plan(&tasks, &resources, &constraints).unwrap(), first);
    }
    assert_eq!(first.len(), tasks.len());

    // 优先级降序: Urgent(2) → High(5) → Medium(3, 4 按结束日) → Low(1)
    let order: Vec<_> = first.iter().map(|e| e.task_id).collect();
    assert_eq!(order, vec![2, 5, 3, 4, 1]);
}

#[test]
fn test_fixed_assignment_is_unconditional() {
    let planner = RedistributionPlanner::new();
    let (tasks, resources) = redistribution_fixture();
    let constraints = RedistributionConstraints {
        fixed_assignments: vec![
            FixedAssignment { task_id: 5, resource_id: 2 },
            FixedAssignment { task_id: 2, resource_id: 2 },
            FixedAssignment { task_id: 1, resource_id: 2 },
        ],
    };

    let plan = planner.plan(&tasks, &resources, &constraints).unwrap();
    let entry: &RedistributionPlanEntry = plan.iter().find(|e| e.task_id == 5).unwrap();
    assert_eq!(entry.resource_id, 2);
    assert_eq!(entry.resource_name, "R2");
    assert!(entry.is_fixed);

    assert_eq!(plan.iter().filter(|e| e.is_fixed).count(), 3);
    // 非固定任务不会被标记为固定
    assert!(plan
        .iter()
        .filter(|e| ![1, 2, 5].contains(&e.task_id))
        .all(|e| !e.is_fixed));
}

#[test]
fn test_balance_score_edges() {
    let scorer = BalanceScorer::new();
    let baseline = HashMap::new();

    let empty = scorer.score(&[], &[], &baseline);
    assert_eq!(empty.score, 100.0);

    let single = vec![ResourceBuilder::new(1).build()];
    let plan_single = vec![RedistributionPlanEntry {
        task_id: 1,
        task_name: "任务1".to_string(),
        resource_id: 1,
        resource_name: "R1".to_string(),
        is_fixed: false,
    }];
    assert_eq!(scorer.score(&plan_single, &single, &baseline).score, 100.0);

    let resources: Vec<_> = (1..=3).map(|id| ResourceBuilder::new(id).build()).collect();
    let plan: Vec<RedistributionPlanEntry> = (1..=6)
        .map(|task_id| {
            let resource_id = (task_id - 1) % 3 + 1;
            RedistributionPlanEntry {
                task_id,
                task_name: format!("任务{}", task_id),
                resource_id,
                resource_name: format!("R{}", resource_id),
                is_fixed: false,
            }
        })
        .collect();
    let even = scorer.score(&plan, &resources, &baseline);
    assert_eq!(even.score, 100.0);
    assert_eq!(even.std_dev, 0.0);
    assert_eq!(even.avg_task_count, 2.0);
}

#[test]
fn test_planned_balance_stays_in_range() {
    let planner = RedistributionPlanner::new();
    let scorer = BalanceScorer::new();
    let (tasks, resources) = redistribution_fixture();

    let plan = planner
        .plan(&tasks, &resources, &RedistributionConstraints::default())
        .unwrap();
    let mut baseline = HashMap::new();
    baseline.insert(1, tasks.len());

    let balance = scorer.score(&plan, &resources, &baseline);
    assert!((0.0..=100.0).contains(&balance.score));
    assert_eq!(balance.resources.len(), resources.len());

    let r1 = balance.resources.iter().find(|b| b.resource_id == 1).unwrap();
    assert_eq!(
        r1.task_count_change,
        r1.task_count as i64 - tasks.len() as i64
    );
}

// ==========================================
// 负载预测
// ==========================================

#[test]
fn test_prediction_raises_load_inside_window_only() {
    let calculator = WorkloadCalculator::new();
    let predictor = PredictionEngine::new();
    let start = date(2026, 1, 19);
    let end = date(2026, 1, 23);

    let resources = vec![ResourceBuilder::new(1).build()];
    let existing = vec![TaskBuilder::new(1, start, end).effort(20.0).resource(1).build()];
    let current = calculator.compute_all(&existing, &resources, start, end).unwrap();
    assert_eq!(current[0].avg_load, 50.0);

    // 周五~下周一,工作日 2 天各 8h；下周一落在窗口外
    let new_task = TaskBuilder::new(99, date(2026, 1, 23), date(2026, 1, 26))
        .effort(16.0)
        .resource(1)
        .build();

    let outcome = predictor
        .predict(&current, &resources, &[new_task], start, end)
        .unwrap();

    let predicted = &outcome.predicted_profiles[0];
    assert_eq!(predicted.load_by_date.len(), 5);
    let friday = predicted.load_on(date(2026, 1, 23)).unwrap();
    assert_eq!(friday.work_hours, 12.0);
    assert_eq!(friday.load_percent, 150.0);
    assert!(friday.task_ids.contains(&99));
    assert_eq!(predicted.avg_load, 70.0);
    assert_eq!(predicted.max_load, 150.0);

    let diff = &outcome.diff.resources[0];
    assert_eq!(diff.avg_load_before, 50.0);
    assert_eq!(diff.avg_load_after, 70.0);
    assert_eq!(diff.avg_load_diff, 20.0);
    assert_eq!(diff.max_load_diff, 100.0);
    assert_eq!(diff.overloaded_days_before, 0);
    assert_eq!(diff.overloaded_days_after, 1);

    assert_eq!(outcome.diff.system_avg_load_before, 50.0);
    assert_eq!(outcome.diff.system_avg_load_after, 70.0);
    assert_eq!(outcome.diff.system_avg_load_diff, 20.0);
    assert_eq!(outcome.predicted_system.len(), 5);
}
