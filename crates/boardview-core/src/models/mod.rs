//! Record catalog for the listing pages.
//!
//! Each family is a plain serde struct with closed enums for its status-like
//! fields, plus a static [`Schema`](crate::schema::Schema) describing how the
//! engine reads it and an [`Aggregate`](crate::aggregate::Aggregate) impl with
//! its dashboard summary. Enum values serialize as `snake_case` labels, which
//! are also the values filter selections compare against.
//!
//! Status labels carry no transition rules; any status may follow any other.

/// Declare a closed label enum with serde names, `as_str`, `LABELS`,
/// `Display` and `FromStr`.
macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $label)] $variant),+
        }

        impl $name {
            /// Every variant, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Every label, in display order.
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::Error;

            fn from_str(value: &str) -> crate::error::Result<Self> {
                match value.trim() {
                    $($label => Ok(Self::$variant),)+
                    other => Err(crate::error::Error::InvalidArgument(format!(
                        concat!("unknown ", stringify!($name), " '{}' (expected one of: {})"),
                        other,
                        Self::LABELS.join(", ")
                    ))),
                }
            }
        }
    };
}

mod automation;
mod duplicate;
mod proposal;
mod task;
mod template;
mod validation;
mod webhook;

pub use automation::{AutomationLog, AutomationSummary, RunStatus, Trigger};
pub use duplicate::{
    DuplicateGroup, DuplicateStatus, DuplicateSummary, HIGH_CONFIDENCE_SCORE, MatchField,
};
pub use proposal::{ProjectType, Proposal, ProposalStatus, ProposalSummary};
pub use task::{Task, TaskStatus, TaskSummary, TaskType};
pub use template::{FormTemplate, TemplateCategory, TemplateStatus, TemplateSummary};
pub use validation::{IssueStatus, Severity, ValidationIssue, ValidationRule, ValidationSummary};
pub use webhook::{Webhook, WebhookEvent, WebhookStatus, WebhookSummary};

label_enum! {
    /// Urgency shared by tasks and follow-ups.
    pub enum Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

label_enum! {
    /// The record families a listing can be built over.
    pub enum RecordKind {
        Tasks => "tasks",
        Proposals => "proposals",
        AutomationLogs => "automation_logs",
        Duplicates => "duplicates",
        ValidationIssues => "validation_issues",
        Templates => "templates",
        Webhooks => "webhooks",
    }
}
