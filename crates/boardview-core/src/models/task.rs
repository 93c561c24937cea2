//! Task board records.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Priority;
use crate::aggregate::{Aggregate, StatusSummary, count_by_dimension, mean, status_summary};
use crate::schema::{Lifecycle, Record, Schema};
use crate::time::start_of_day;

label_enum! {
    pub enum TaskStatus {
        Todo => "todo",
        InProgress => "in_progress",
        Review => "review",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

label_enum! {
    pub enum TaskType {
        Call => "call",
        Email => "email",
        Meeting => "meeting",
        FollowUp => "follow_up",
        SiteVisit => "site_visit",
        Document => "document",
        Other => "other",
    }
}

/// A unit of work on a lead or project.
///
/// # Constraints
/// - `progress`: 0-100; larger values are clamped when aggregated.
/// - `due_date`: a calendar date, overdue from midnight UTC of that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub task_type: TaskType,
    #[serde(default)]
    pub assignee: Option<String>,
    /// Lead or company the task belongs to.
    #[serde(default)]
    pub lead_name: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub actual_hours: Option<f64>,
}

impl Task {
    /// A `todo` / `medium` / `other` task with no optional fields set.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            task_type: TaskType::Other,
            assignee: None,
            lead_name: None,
            due_date: None,
            created_at,
            progress: 0,
            estimated_hours: 0.0,
            actual_hours: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn sample(id: &str, title: &str) -> Self {
        let created_at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .map(start_of_day)
            .unwrap_or_default();
        Self::new(id, title, created_at)
    }
}

static TASK_SCHEMA: LazyLock<Schema<Task>> = LazyLock::new(|| {
    Schema::<Task>::new(
        "tasks",
        Lifecycle {
            status: |t| t.status.as_str(),
            statuses: TaskStatus::LABELS,
            terminal: &["completed", "cancelled"],
            completed: &["completed"],
            due: Some(|t: &Task| t.due_date.map(start_of_day)),
        },
    )
    .search("title", |t| Some(t.title.as_str()))
    .search("description", |t| Some(t.description.as_str()))
    .search("lead_name", |t| t.lead_name.as_deref())
    .search("assignee", |t| t.assignee.as_deref())
    .dimension("priority", |t| Some(t.priority.as_str()), Priority::LABELS)
    .dimension("task_type", |t| Some(t.task_type.as_str()), TaskType::LABELS)
    .dimension("assignee", |t| t.assignee.as_deref(), &[])
    .date("due_date", |t| t.due_date.map(start_of_day))
    .date("created_at", |t| Some(t.created_at))
});

impl Record for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn schema() -> &'static Schema<Self> {
        &TASK_SCHEMA
    }
}

/// Task board dashboard cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSummary {
    #[serde(flatten)]
    pub status: StatusSummary,
    pub avg_progress: f64,
    pub estimated_hours: f64,
    pub actual_hours: f64,
    pub by_priority: IndexMap<String, usize>,
}

impl Aggregate for Task {
    type Summary = TaskSummary;

    fn summarize(records: &[Self], now: NaiveDateTime) -> TaskSummary {
        let by_priority = Self::schema()
            .dimension_field("priority")
            .map(|field| count_by_dimension(records, field))
            .unwrap_or_default();
        TaskSummary {
            status: status_summary(records, now),
            avg_progress: mean(records.iter().map(|t| f64::from(t.progress.min(100)))),
            estimated_hours: records.iter().map(|t| t.estimated_hours).sum(),
            actual_hours: records.iter().filter_map(|t| t.actual_hours).sum(),
            by_priority,
        }
    }
}
