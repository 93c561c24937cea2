//! Form template library.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    Aggregate, StatusSummary, count_by_dimension, mean, saturating_total, status_summary,
    weighted_mean,
};
use crate::schema::{Lifecycle, Record, Schema};

label_enum! {
    pub enum TemplateCategory {
        LeadCapture => "lead_capture",
        Survey => "survey",
        Inspection => "inspection",
        Contract => "contract",
        Onboarding => "onboarding",
        Safety => "safety",
    }
}

label_enum! {
    pub enum TemplateStatus {
        Draft => "draft",
        Active => "active",
        Archived => "archived",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: TemplateCategory,
    pub status: TemplateStatus,
    #[serde(default)]
    pub field_count: u32,
    /// Forms submitted from this template.
    #[serde(default)]
    pub usage_count: u32,
    /// Average user rating, 1-5. Unrated templates have none.
    #[serde(default)]
    pub rating: Option<f64>,
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub author: Option<String>,
}

static TEMPLATE_SCHEMA: LazyLock<Schema<FormTemplate>> = LazyLock::new(|| {
    Schema::<FormTemplate>::new(
        "templates",
        Lifecycle {
            status: |t| t.status.as_str(),
            statuses: TemplateStatus::LABELS,
            terminal: &["archived"],
            completed: &["active"],
            due: None,
        },
    )
    .search("name", |t| Some(t.name.as_str()))
    .search("description", |t| Some(t.description.as_str()))
    .search("author", |t| t.author.as_deref())
    .dimension(
        "category",
        |t| Some(t.category.as_str()),
        TemplateCategory::LABELS,
    )
    .dimension("author", |t| t.author.as_deref(), &[])
    .date("updated_at", |t| Some(t.updated_at))
});

impl Record for FormTemplate {
    fn id(&self) -> &str {
        &self.id
    }

    fn schema() -> &'static Schema<Self> {
        &TEMPLATE_SCHEMA
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateSummary {
    #[serde(flatten)]
    pub status: StatusSummary,
    pub total_usage: u64,
    pub avg_fields: f64,
    /// Usage-weighted mean of the rated templates.
    pub avg_rating: f64,
    pub by_category: IndexMap<String, usize>,
}

impl Aggregate for FormTemplate {
    type Summary = TemplateSummary;

    fn summarize(records: &[Self], now: NaiveDateTime) -> TemplateSummary {
        TemplateSummary {
            status: status_summary(records, now),
            total_usage: saturating_total(records.iter().map(|t| u64::from(t.usage_count))),
            avg_fields: mean(records.iter().map(|t| f64::from(t.field_count))),
            avg_rating: weighted_mean(records.iter().filter_map(|t| {
                t.rating
                    .filter(|r| r.is_finite())
                    .map(|r| (r, f64::from(t.usage_count)))
            })),
            by_category: Self::schema()
                .dimension_field("category")
                .map(|field| count_by_dimension(records, field))
                .unwrap_or_default(),
        }
    }
}
