//! Sales proposals and their pipeline.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    Aggregate, StatusSummary, count_by_dimension, mean, rate, status_summary, weighted_mean,
};
use crate::schema::{Lifecycle, Record, Schema};
use crate::time::start_of_day;

label_enum! {
    pub enum ProposalStatus {
        Draft => "draft",
        Sent => "sent",
        Viewed => "viewed",
        Negotiating => "negotiating",
        Accepted => "accepted",
        Rejected => "rejected",
        Expired => "expired",
    }
}

label_enum! {
    pub enum ProjectType {
        Residential => "residential",
        Commercial => "commercial",
        Renovation => "renovation",
        Infrastructure => "infrastructure",
        Industrial => "industrial",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub title: String,
    pub client_name: String,
    #[serde(default)]
    pub owner: Option<String>,
    pub project_type: ProjectType,
    pub status: ProposalStatus,
    /// Quoted contract value.
    pub value: f64,
    /// Win probability, 0-100.
    #[serde(default)]
    pub probability: u8,
    pub created_at: NaiveDateTime,
    /// Last day the quote holds. An open proposal past this date is overdue.
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
}

impl Proposal {
    const fn is_open(&self) -> bool {
        !matches!(
            self.status,
            ProposalStatus::Accepted | ProposalStatus::Rejected | ProposalStatus::Expired
        )
    }

    fn weighted_value(&self) -> f64 {
        self.value * f64::from(self.probability.min(100)) / 100.0
    }
}

static PROPOSAL_SCHEMA: LazyLock<Schema<Proposal>> = LazyLock::new(|| {
    Schema::<Proposal>::new(
        "proposals",
        Lifecycle {
            status: |p| p.status.as_str(),
            statuses: ProposalStatus::LABELS,
            terminal: &["accepted", "rejected", "expired"],
            completed: &["accepted"],
            due: Some(|p: &Proposal| p.valid_until.map(start_of_day)),
        },
    )
    .search("title", |p| Some(p.title.as_str()))
    .search("client_name", |p| Some(p.client_name.as_str()))
    .search("owner", |p| p.owner.as_deref())
    .dimension(
        "project_type",
        |p| Some(p.project_type.as_str()),
        ProjectType::LABELS,
    )
    .dimension("owner", |p| p.owner.as_deref(), &[])
    .date("created_at", |p| Some(p.created_at))
    .date("valid_until", |p| p.valid_until.map(start_of_day))
});

impl Record for Proposal {
    fn id(&self) -> &str {
        &self.id
    }

    fn schema() -> &'static Schema<Self> {
        &PROPOSAL_SCHEMA
    }
}

/// Pipeline cards for the proposals page.
///
/// | Metric | Formula |
/// |--------|---------|
/// | `pipeline_value` | `Σ value × probability / 100` over open proposals |
/// | `win_rate` | `accepted / (accepted + rejected) × 100` |
/// | `avg_probability` | value-weighted mean probability over open proposals |
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalSummary {
    #[serde(flatten)]
    pub status: StatusSummary,
    pub total_value: f64,
    pub accepted_value: f64,
    pub pipeline_value: f64,
    pub avg_value: f64,
    pub win_rate: f64,
    pub avg_probability: f64,
    pub by_project_type: IndexMap<String, usize>,
}

impl Aggregate for Proposal {
    type Summary = ProposalSummary;

    fn summarize(records: &[Self], now: NaiveDateTime) -> ProposalSummary {
        let accepted = records
            .iter()
            .filter(|p| p.status == ProposalStatus::Accepted)
            .count();
        let rejected = records
            .iter()
            .filter(|p| p.status == ProposalStatus::Rejected)
            .count();
        let open = || records.iter().filter(|p| p.is_open());

        ProposalSummary {
            status: status_summary(records, now),
            total_value: records.iter().map(|p| p.value).sum(),
            accepted_value: records
                .iter()
                .filter(|p| p.status == ProposalStatus::Accepted)
                .map(|p| p.value)
                .sum(),
            pipeline_value: open().map(Self::weighted_value).sum(),
            avg_value: mean(records.iter().map(|p| p.value)),
            win_rate: rate(accepted, accepted + rejected),
            avg_probability: weighted_mean(
                open().map(|p| (f64::from(p.probability.min(100)), p.value)),
            ),
            by_project_type: Self::schema()
                .dimension_field("project_type")
                .map(|field| count_by_dimension(records, field))
                .unwrap_or_default(),
        }
    }
}
