// ==========================================
// 项目资源负载优化引擎 - 请求校验器
// ==========================================
// 职责: 在任何计算之前拒绝非法输入（→ ApiError::InvalidInput）
// ==========================================

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::calendar::days_between;
use crate::domain::optimization::{RedistributionConstraints, TaskModification};
use crate::domain::resource::Resource;
use crate::domain::task::RawTaskRecord;
use crate::domain::types::{ResourceId, TaskId};

/// 阈值上限（负载百分比）
pub const MAX_THRESHOLD_PCT: f64 = 1000.0;

/// 解析 YYYY-MM-DD 日期
pub fn parse_date(field: &str, value: &str) -> ApiResult<NaiveDate> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err(ApiError::InvalidInput(format!("{}不能为空", field)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ApiError::InvalidInput(format!("{}格式错误（应为 YYYY-MM-DD）: {}", field, raw))
    })
}

/// 校验日期窗口: 格式、先后顺序、最大跨度
pub fn validate_date_range(
    start_date: &str,
    end_date: &str,
    max_range_days: i64,
) -> ApiResult<(NaiveDate, NaiveDate)> {
    let start = parse_date("开始日期", start_date)?;
    let end = parse_date("结束日期", end_date)?;
    if end < start {
        return Err(ApiError::InvalidInput(
            "结束日期不能早于开始日期".to_string(),
        ));
    }
    let days = days_between(start, end) + 1;
    if days > max_range_days {
        return Err(ApiError::InvalidInput(format!(
            "日期跨度{}天超过上限{}天",
            days, max_range_days
        )));
    }
    Ok((start, end))
}

/// 校验过载阈值
pub fn validate_threshold(threshold: f64) -> ApiResult<f64> {
    if !threshold.is_finite() || !(0.0..=MAX_THRESHOLD_PCT).contains(&threshold) {
        return Err(ApiError::InvalidInput(format!(
            "阈值必须在 0 ~ {} 之间: {}",
            MAX_THRESHOLD_PCT, threshold
        )));
    }
    Ok(threshold)
}

/// 校验自动分配请求
///
/// - 任务、资源列表不能为空
/// - 任务/资源ID不能重复
/// - 固定分配必须引用本次提交的任务与资源
pub fn validate_auto_distribute(
    tasks: &[RawTaskRecord],
    resources: &[Resource],
    constraints: &RedistributionConstraints,
) -> ApiResult<()> {
    if tasks.is_empty() {
        return Err(ApiError::InvalidInput("任务列表不能为空".to_string()));
    }
    if resources.is_empty() {
        return Err(ApiError::InvalidInput("资源列表不能为空".to_string()));
    }

    let task_ids = unique_ids(tasks.iter().map(|t| t.id), "任务")?;
    let resource_ids = unique_ids(resources.iter().map(|r| r.id), "资源")?;

    let mut pinned: HashSet<TaskId> = HashSet::new();
    for fixed in &constraints.fixed_assignments {
        if !task_ids.contains(&fixed.task_id) {
            return Err(ApiError::InvalidInput(format!(
                "固定分配引用了未提交的任务: {}",
                fixed.task_id
            )));
        }
        if !resource_ids.contains(&fixed.resource_id) {
            return Err(ApiError::InvalidInput(format!(
                "固定分配引用了未提交的资源: {}",
                fixed.resource_id
            )));
        }
        if !pinned.insert(fixed.task_id) {
            return Err(ApiError::InvalidInput(format!(
                "任务{}存在多条固定分配",
                fixed.task_id
            )));
        }
    }
    Ok(())
}

/// 校验采纳请求
pub fn validate_modifications(
    optimization_id: &str,
    modifications: &[TaskModification],
) -> ApiResult<()> {
    if optimization_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("优化批次ID不能为空".to_string()));
    }
    if modifications.is_empty() {
        return Err(ApiError::InvalidInput("调整列表不能为空".to_string()));
    }
    unique_ids(modifications.iter().map(|m| m.task_id), "调整任务")?;
    Ok(())
}

/// 校验预测请求中的新任务: 必须指定目标资源
pub fn validate_new_tasks(new_tasks: &[RawTaskRecord]) -> ApiResult<()> {
    if let Some(task) = new_tasks.iter().find(|t| t.resource_id.is_none()) {
        return Err(ApiError::InvalidInput(format!(
            "新任务{}未指定目标资源",
            task.id
        )));
    }
    Ok(())
}

fn unique_ids<I>(ids: I, label: &str) -> ApiResult<HashSet<i64>>
where
    I: IntoIterator<Item = i64>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ApiError::InvalidInput(format!("{}ID重复: {}", label, id)));
        }
    }
    Ok(seen)
}

/// 资源ID去重（保持顺序）
pub fn dedup_resource_ids(ids: &[ResourceId]) -> Vec<ResourceId> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::optimization::FixedAssignment;
    use std::collections::BTreeSet;

    fn raw(id: TaskId, resource_id: Option<ResourceId>) -> RawTaskRecord {
        RawTaskRecord {
            id,
            start_date: "2026-01-19".to_string(),
            end_date: "2026-01-20".to_string(),
            effort: Some(8.0),
            resource_id,
            ..RawTaskRecord::default()
        }
    }

    fn resource(id: ResourceId) -> Resource {
        Resource {
            id,
            name: format!("R{}", id),
            resource_type: "developer".to_string(),
            skills: BTreeSet::new(),
            capacity: 40.0,
            daily_capacity: 8.0,
            team_id: None,
            is_active: true,
        }
    }

    #[test]
    fn test_date_range_validation() {
        assert!(validate_date_range("2026-01-01", "2026-01-31", 366).is_ok());
        assert!(validate_date_range("2026-01-01", "2026-01-01", 366).is_ok());
        assert!(matches!(
            validate_date_range("2026-01-31", "2026-01-01", 366),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(validate_date_range("2026/01/01", "2026-01-31", 366).is_err());
        assert!(validate_date_range("", "2026-01-31", 366).is_err());
        assert!(validate_date_range("2026-01-01", "2026-01-31", 30).is_err());
    }

    #[test]
    fn test_threshold_validation() {
        assert_eq!(validate_threshold(80.0).unwrap(), 80.0);
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(-1.0).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
        assert!(validate_threshold(1000.5).is_err());
    }

    #[test]
    fn test_auto_distribute_validation() {
        let tasks = vec![raw(1, None), raw(5, None)];
        let resources = vec![resource(1), resource(2)];
        let ok = RedistributionConstraints {
            fixed_assignments: vec![FixedAssignment { task_id: 5, resource_id: 2 }],
        };
        assert!(validate_auto_distribute(&tasks, &resources, &ok).is_ok());

        assert!(validate_auto_distribute(&[], &resources, &ok).is_err());
        assert!(validate_auto_distribute(&tasks, &[], &ok).is_err());

        let unknown_resource = RedistributionConstraints {
            fixed_assignments: vec![FixedAssignment { task_id: 5, resource_id: 9 }],
        };
        assert!(validate_auto_distribute(&tasks, &resources, &unknown_resource).is_err());

        let unknown_task = RedistributionConstraints {
            fixed_assignments: vec![FixedAssignment { task_id: 9, resource_id: 1 }],
        };
        assert!(validate_auto_distribute(&tasks, &resources, &unknown_task).is_err());

        let duplicated = vec![raw(1, None), raw(1, None)];
        assert!(validate_auto_distribute(&duplicated, &resources, &ok).is_err());
    }

    #[test]
    fn test_modifications_and_new_tasks() {
        let mods = vec![TaskModification { task_id: 1, new_resource_id: 2 }];
        assert!(validate_modifications("opt-1", &mods).is_ok());
        assert!(validate_modifications("", &mods).is_err());
        assert!(validate_modifications("opt-1", &[]).is_err());

        assert!(validate_new_tasks(&[raw(1, Some(1))]).is_ok());
        assert!(validate_new_tasks(&[]).is_ok());
        assert!(validate_new_tasks(&[raw(1, Some(1)), raw(2, None)]).is_err());
    }

    #[test]
    fn test_dedup_resource_ids_keeps_order() {
        assert_eq!(dedup_resource_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }
}
