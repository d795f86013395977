// ==========================================
// 项目资源负载优化引擎 - 任务领域模型
// ==========================================
// 职责: 任务实体 + 外部原始记录的导入归一
// 红线: effort / duration 只在导入时归一一次
// ==========================================

use crate::domain::calendar::span_days;
use crate::domain::types::{Priority, ProjectId, ResourceId, SkillId, TaskId, Workload};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::warn;

// ==========================================
// Task - 任务
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,

    // ===== 时间区间（闭区间,日历天） =====
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    // ===== 工作量 =====
    pub workload: Workload,

    // ===== 约束 =====
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub required_skills: BTreeSet<SkillId>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub is_fixed: bool,

    // ===== 归属 =====
    #[serde(default)]
    pub resource_id: Option<ResourceId>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
}

impl Task {
    /// 任务自身区间的日历天数（至少 1）
    pub fn span_days(&self) -> i64 {
        span_days(self.start_date, self.end_date)
    }

    /// 总工时
    pub fn total_hours(&self) -> f64 {
        self.workload.total_hours()
    }

    /// 日工时 = 总工时 / 日历天数
    pub fn daily_hours(&self) -> f64 {
        self.total_hours() / self.span_days() as f64
    }

    /// 指定日期是否处于任务区间内
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// 与查询窗口 [start, end] 是否有交集
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }

    /// 可移动任务: 非固定 且 优先级低于 High
    pub fn is_movable(&self) -> bool {
        !self.is_fixed && self.priority.is_below_high()
    }
}

// ==========================================
// 导入错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestError {
    #[error("日期格式错误 (task_id={task_id}, field={field}): {value}")]
    InvalidDate {
        task_id: TaskId,
        field: String,
        value: String,
    },

    #[error("任务区间倒置 (task_id={task_id}): {start_date} > {end_date}")]
    ReversedSpan {
        task_id: TaskId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

// ==========================================
// RawTaskRecord - 外部原始任务记录
// ==========================================
// 来源: 协作方查询结果 / 预测请求中的假设任务
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTaskRecord {
    pub id: TaskId,
    #[serde(default)]
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub effort: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub required_skills: Option<Vec<SkillId>>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub is_fixed: Option<bool>,
    #[serde(default)]
    pub resource_id: Option<ResourceId>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
}

impl RawTaskRecord {
    /// 归一为 Task
    ///
    /// 规则:
    /// 1) effort 与 duration 同时存在时 effort 优先
    /// 2) 缺失/负数/非有限工时记为 0（数据异常,告警不报错）
    /// 3) 未知优先级回落为 Medium（告警）
    /// 4) 日期格式错误或区间倒置 → IngestError
    pub fn into_task(self) -> Result<Task, IngestError> {
        let start_date = parse_task_date(self.id, "startDate", &self.start_date)?;
        let end_date = parse_task_date(self.id, "endDate", &self.end_date)?;
        if end_date < start_date {
            return Err(IngestError::ReversedSpan {
                task_id: self.id,
                start_date,
                end_date,
            });
        }

        let workload = match (sanitize_hours(self.effort), sanitize_hours(self.duration)) {
            (Some(effort), _) => Workload::Effort { total_hours: effort },
            (None, Some(duration)) => Workload::duration(duration, span_days(start_date, end_date)),
            (None, None) => {
                warn!(task_id = self.id, "数据异常: 任务缺少有效工时,按 0 计");
                Workload::default()
            }
        };

        let priority = match self.priority.as_deref() {
            None => Priority::default(),
            Some(raw) => raw.parse::<Priority>().unwrap_or_else(|e: String| {
                warn!(task_id = self.id, "{}，按 medium 处理", e);
                Priority::default()
            }),
        };

        Ok(Task {
            id: self.id,
            name: self.name,
            start_date,
            end_date,
            workload,
            priority,
            required_skills: self.required_skills.unwrap_or_default().into_iter().collect(),
            resource_type: self.resource_type.filter(|t| !t.trim().is_empty()),
            is_fixed: self.is_fixed.unwrap_or(false),
            resource_id: self.resource_id,
            project_id: self.project_id,
        })
    }
}

fn parse_task_date(task_id: TaskId, field: &str, value: &str) -> Result<NaiveDate, IngestError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| IngestError::InvalidDate {
        task_id,
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn sanitize_hours(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

/// 批量导入
pub fn ingest_tasks(records: Vec<RawTaskRecord>) -> Result<Vec<Task>, IngestError> {
    records.into_iter().map(RawTaskRecord::into_task).collect()
}
