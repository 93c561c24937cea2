//! Duplicate-contact detection groups.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    Aggregate, StatusSummary, count_by_dimension, mean, rate, saturating_total, status_summary,
};
use crate::schema::{Lifecycle, Record, Schema};

/// Match score at or above which a group counts as high confidence.
pub const HIGH_CONFIDENCE_SCORE: f64 = 90.0;

label_enum! {
    /// Field the detector matched the group on.
    pub enum MatchField {
        Email => "email",
        Phone => "phone",
        Name => "name",
        Company => "company",
        Address => "address",
    }
}

label_enum! {
    pub enum DuplicateStatus {
        Pending => "pending",
        Merged => "merged",
        Dismissed => "dismissed",
    }
}

/// A set of contact records the detector believes are the same person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub id: String,
    pub primary_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    pub match_field: MatchField,
    /// Detector confidence, 0-100.
    pub match_score: f64,
    pub status: DuplicateStatus,
    /// Records in the group, the primary included.
    pub record_count: u32,
    pub detected_at: NaiveDateTime,
}

static DUPLICATE_SCHEMA: LazyLock<Schema<DuplicateGroup>> = LazyLock::new(|| {
    Schema::<DuplicateGroup>::new(
        "duplicates",
        Lifecycle {
            status: |g| g.status.as_str(),
            statuses: DuplicateStatus::LABELS,
            terminal: &["merged", "dismissed"],
            completed: &["merged"],
            due: None,
        },
    )
    .search("primary_name", |g| Some(g.primary_name.as_str()))
    .search("email", |g| g.email.as_deref())
    .search("company", |g| g.company.as_deref())
    .dimension(
        "match_field",
        |g| Some(g.match_field.as_str()),
        MatchField::LABELS,
    )
    .date("detected_at", |g| Some(g.detected_at))
});

impl Record for DuplicateGroup {
    fn id(&self) -> &str {
        &self.id
    }

    fn schema() -> &'static Schema<Self> {
        &DUPLICATE_SCHEMA
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateSummary {
    #[serde(flatten)]
    pub status: StatusSummary,
    /// Extra records beyond each group's primary.
    pub duplicate_records: u64,
    pub avg_match_score: f64,
    pub high_confidence: usize,
    /// Share of groups that are merged or dismissed.
    pub resolution_rate: f64,
    pub by_match_field: IndexMap<String, usize>,
}

impl Aggregate for DuplicateGroup {
    type Summary = DuplicateSummary;

    fn summarize(records: &[Self], now: NaiveDateTime) -> DuplicateSummary {
        let status = status_summary(records, now);
        let resolved = status.total - status.active;
        DuplicateSummary {
            duplicate_records: saturating_total(
                records
                    .iter()
                    .map(|g| u64::from(g.record_count.saturating_sub(1))),
            ),
            avg_match_score: mean(
                records
                    .iter()
                    .map(|g| g.match_score)
                    .filter(|score| score.is_finite()),
            ),
            high_confidence: records
                .iter()
                .filter(|g| g.match_score >= HIGH_CONFIDENCE_SCORE)
                .count(),
            resolution_rate: rate(resolved, status.total),
            by_match_field: Self::schema()
                .dimension_field("match_field")
                .map(|field| count_by_dimension(records, field))
                .unwrap_or_default(),
            status,
        }
    }
}
