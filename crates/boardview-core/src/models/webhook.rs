//! Outbound webhook subscriptions.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    Aggregate, StatusSummary, count_by_dimension, ratio_pct, saturating_total, status_summary,
};
use crate::schema::{Lifecycle, Record, Schema};

label_enum! {
    pub enum WebhookEvent {
        LeadCreated => "lead.created",
        LeadUpdated => "lead.updated",
        TaskCompleted => "task.completed",
        ProposalSent => "proposal.sent",
        ProposalAccepted => "proposal.accepted",
        FormSubmitted => "form.submitted",
    }
}

label_enum! {
    pub enum WebhookStatus {
        Active => "active",
        Paused => "paused",
        Failing => "failing",
        Disabled => "disabled",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: String,
    pub name: String,
    pub url: String,
    pub event: WebhookEvent,
    pub status: WebhookStatus,
    /// Delivery attempts, failed ones included.
    #[serde(default)]
    pub deliveries: u64,
    #[serde(default)]
    pub failures: u64,
    #[serde(default)]
    pub last_triggered_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

static WEBHOOK_SCHEMA: LazyLock<Schema<Webhook>> = LazyLock::new(|| {
    Schema::<Webhook>::new(
        "webhooks",
        Lifecycle {
            status: |w| w.status.as_str(),
            statuses: WebhookStatus::LABELS,
            terminal: &["disabled"],
            completed: &["active"],
            due: None,
        },
    )
    .search("name", |w| Some(w.name.as_str()))
    .search("url", |w| Some(w.url.as_str()))
    .dimension("event", |w| Some(w.event.as_str()), WebhookEvent::LABELS)
    .date("created_at", |w| Some(w.created_at))
    .date("last_triggered_at", |w| w.last_triggered_at)
});

impl Record for Webhook {
    fn id(&self) -> &str {
        &self.id
    }

    fn schema() -> &'static Schema<Self> {
        &WEBHOOK_SCHEMA
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookSummary {
    #[serde(flatten)]
    pub status: StatusSummary,
    pub deliveries: u64,
    pub failures: u64,
    /// `(deliveries - failures) / deliveries × 100` across all hooks.
    pub delivery_success_rate: f64,
    pub failing: usize,
    pub by_event: IndexMap<String, usize>,
}

impl Aggregate for Webhook {
    type Summary = WebhookSummary;

    #[allow(clippy::cast_precision_loss)]
    fn summarize(records: &[Self], now: NaiveDateTime) -> WebhookSummary {
        let deliveries = saturating_total(records.iter().map(|w| w.deliveries));
        let failures = saturating_total(records.iter().map(|w| w.failures));
        // Rate inputs stay in f64 so it holds when the counters saturate.
        let (succeeded_f, deliveries_f) = records.iter().fold((0.0, 0.0), |(ok, all), w| {
            (
                ok + w.deliveries.saturating_sub(w.failures) as f64,
                all + w.deliveries as f64,
            )
        });

        WebhookSummary {
            status: status_summary(records, now),
            deliveries,
            failures,
            delivery_success_rate: ratio_pct(succeeded_f, deliveries_f),
            failing: records
                .iter()
                .filter(|w| w.status == WebhookStatus::Failing)
                .count(),
            by_event: Self::schema()
                .dimension_field("event")
                .map(|field| count_by_dimension(records, field))
                .unwrap_or_default(),
        }
    }
}
