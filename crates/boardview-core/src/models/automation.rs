//! Automation run history.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    Aggregate, StatusSummary, count_by_dimension, mean, rate, saturating_total, status_summary,
};
use crate::schema::{Lifecycle, Record, Schema};

label_enum! {
    /// What started an automation run.
    pub enum Trigger {
        LeadCreated => "lead_created",
        StatusChanged => "status_changed",
        FormSubmitted => "form_submitted",
        Scheduled => "scheduled",
        Webhook => "webhook",
        Manual => "manual",
    }
}

label_enum! {
    pub enum RunStatus {
        Running => "running",
        Success => "success",
        Failed => "failed",
        Skipped => "skipped",
    }
}

/// One execution of an automation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationLog {
    pub id: String,
    pub automation_name: String,
    pub trigger: Trigger,
    pub status: RunStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub lead_name: Option<String>,
    pub started_at: NaiveDateTime,
    /// Unset while the run is still in flight.
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub actions_executed: u32,
}

static AUTOMATION_SCHEMA: LazyLock<Schema<AutomationLog>> = LazyLock::new(|| {
    Schema::<AutomationLog>::new(
        "automation_logs",
        Lifecycle {
            status: |log| log.status.as_str(),
            statuses: RunStatus::LABELS,
            terminal: &["success", "failed", "skipped"],
            completed: &["success"],
            due: None,
        },
    )
    .search("automation_name", |log| Some(log.automation_name.as_str()))
    .search("message", |log| Some(log.message.as_str()))
    .search("lead_name", |log| log.lead_name.as_deref())
    .dimension("trigger", |log| Some(log.trigger.as_str()), Trigger::LABELS)
    .dimension("automation", |log| Some(log.automation_name.as_str()), &[])
    .date("started_at", |log| Some(log.started_at))
});

impl Record for AutomationLog {
    fn id(&self) -> &str {
        &self.id
    }

    fn schema() -> &'static Schema<Self> {
        &AUTOMATION_SCHEMA
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomationSummary {
    #[serde(flatten)]
    pub status: StatusSummary,
    pub failed: usize,
    /// `success / (success + failed) × 100`; skipped and running runs are
    /// left out.
    pub success_rate: f64,
    pub avg_duration_ms: f64,
    pub total_actions: u64,
    pub by_trigger: IndexMap<String, usize>,
}

impl Aggregate for AutomationLog {
    type Summary = AutomationSummary;

    #[allow(clippy::cast_precision_loss)]
    fn summarize(records: &[Self], now: NaiveDateTime) -> AutomationSummary {
        let succeeded = records
            .iter()
            .filter(|log| log.status == RunStatus::Success)
            .count();
        let failed = records
            .iter()
            .filter(|log| log.status == RunStatus::Failed)
            .count();

        AutomationSummary {
            status: status_summary(records, now),
            failed,
            success_rate: rate(succeeded, succeeded + failed),
            avg_duration_ms: mean(
                records
                    .iter()
                    .filter_map(|log| log.duration_ms)
                    .map(|ms| ms as f64),
            ),
            total_actions: saturating_total(
                records.iter().map(|log| u64::from(log.actions_executed)),
            ),
            by_trigger: Self::schema()
                .dimension_field("trigger")
                .map(|field| count_by_dimension(records, field))
                .unwrap_or_default(),
        }
    }
}
