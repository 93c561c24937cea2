//! Data-quality issues raised by validation rules.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, StatusSummary, count_by, count_by_dimension, status_summary};
use crate::schema::{Lifecycle, Record, Schema};

label_enum! {
    pub enum ValidationRule {
        Required => "required",
        Format => "format",
        Range => "range",
        Duplicate => "duplicate",
        Consistency => "consistency",
    }
}

label_enum! {
    pub enum Severity {
        Error => "error",
        Warning => "warning",
        Info => "info",
    }
}

label_enum! {
    pub enum IssueStatus {
        Open => "open",
        Resolved => "resolved",
        Ignored => "ignored",
    }
}

/// One failed check on one field of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub id: String,
    /// Display name of the record that failed.
    pub record_name: String,
    pub field: String,
    pub rule: ValidationRule,
    pub severity: Severity,
    pub status: IssueStatus,
    #[serde(default)]
    pub message: String,
    pub detected_at: NaiveDateTime,
}

static VALIDATION_SCHEMA: LazyLock<Schema<ValidationIssue>> = LazyLock::new(|| {
    Schema::<ValidationIssue>::new(
        "validation_issues",
        Lifecycle {
            status: |issue| issue.status.as_str(),
            statuses: IssueStatus::LABELS,
            terminal: &["resolved", "ignored"],
            completed: &["resolved"],
            due: None,
        },
    )
    .search("record_name", |issue| Some(issue.record_name.as_str()))
    .search("field", |issue| Some(issue.field.as_str()))
    .search("message", |issue| Some(issue.message.as_str()))
    .dimension("severity", |issue| Some(issue.severity.as_str()), Severity::LABELS)
    .dimension("rule", |issue| Some(issue.rule.as_str()), ValidationRule::LABELS)
    .dimension("field", |issue| Some(issue.field.as_str()), &[])
    .date("detected_at", |issue| Some(issue.detected_at))
});

impl Record for ValidationIssue {
    fn id(&self) -> &str {
        &self.id
    }

    fn schema() -> &'static Schema<Self> {
        &VALIDATION_SCHEMA
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSummary {
    #[serde(flatten)]
    pub status: StatusSummary,
    /// Open issues with `error` severity.
    pub open_errors: usize,
    pub resolution_rate: f64,
    pub by_severity: IndexMap<String, usize>,
    /// Issue counts per field name, first-seen order.
    pub by_field: IndexMap<String, usize>,
}

impl Aggregate for ValidationIssue {
    type Summary = ValidationSummary;

    fn summarize(records: &[Self], now: NaiveDateTime) -> ValidationSummary {
        let status = status_summary(records, now);
        ValidationSummary {
            open_errors: records
                .iter()
                .filter(|i| i.status == IssueStatus::Open && i.severity == Severity::Error)
                .count(),
            // resolved is the completed set
            resolution_rate: status.completion_rate,
            by_severity: Self::schema()
                .dimension_field("severity")
                .map(|field| count_by_dimension(records, field))
                .unwrap_or_default(),
            by_field: count_by(records, |i| i.field.clone()),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_instant;

    fn issue(id: &str, field: &str, severity: Severity, status: IssueStatus) -> ValidationIssue {
        ValidationIssue {
            id: id.into(),
            record_name: "Acme Roofing".into(),
            field: field.into(),
            rule: ValidationRule::Format,
            severity,
            status,
            message: format!("{field} looks wrong"),
            detected_at: parse_instant("2024-05-01").unwrap(),
        }
    }

    #[test]
    fn summary_counts_open_errors_and_fields() {
        let records = [
            issue("v1", "email", Severity::Error, IssueStatus::Open),
            issue("v2", "phone", Severity::Error, IssueStatus::Resolved),
            issue("v3", "email", Severity::Warning, IssueStatus::Open),
            issue("v4", "zip", Severity::Info, IssueStatus::Ignored),
        ];
        let summary = ValidationIssue::summarize(&records, parse_instant("2024-06-01").unwrap());
        assert_eq!(summary.open_errors, 1);
        assert!((summary.resolution_rate - 25.0).abs() < 1e-9);
        assert_eq!(summary.status.active, 2);
        assert_eq!(
            summary.by_field.into_iter().collect::<Vec<_>>(),
            vec![
                ("email".to_string(), 2),
                ("phone".to_string(), 1),
                ("zip".to_string(), 1)
            ]
        );
        assert_eq!(
            summary.by_severity.keys().collect::<Vec<_>>(),
            vec!["error", "warning", "info"]
        );
    }
}
