//! Filter-and-aggregate engine for boardview listing pages
//!
//! This crate provides:
//! - Field catalogs (`Schema`) describing how to read each record family
//! - Predicates, the composite filter and its `FilterState` input
//! - Aggregation into typed dashboard summaries
//! - Distinct-value extraction for filter dropdowns
//! - The record catalog (tasks, proposals, automation logs, ...)
//! - Record sources, configuration and common error types
//!
//! Every engine operation is a pure function of its inputs. Time-relative
//! predicates take an explicit `now`; only [`Config::now`] reads the clock.

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod config;
pub mod derived;
pub mod error;
pub mod filter;
pub mod models;
pub mod predicate;
pub mod query;
pub mod schema;
pub mod source;
pub mod time;
pub mod view;

// Re-export key types for convenience
pub use aggregate::{Aggregate, StatusSummary, aggregate, status_summary};
pub use config::{Config, OutputFormat};
pub use derived::{dimension_options, distinct_present, distinct_values};
pub use error::{Error as BoardError, Result as BoardResult};
pub use filter::{CompositeFilter, filter, filter_iter};
pub use models::{
    AutomationLog, DuplicateGroup, FormTemplate, Priority, Proposal, RecordKind, Task,
    ValidationIssue, Webhook,
};
pub use predicate::{Predicate, matches};
pub use query::{ALL, DateRange, FilterState, Selection};
pub use schema::{Record, Schema};
pub use source::{InMemorySource, JsonFileSource, RecordSource, parse_records};
pub use view::{ListingView, build_view};
