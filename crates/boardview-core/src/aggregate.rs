//! Summary statistics over a full record collection.
//!
//! # Formulas
//!
//! All formulas are deterministic for a given input and `now` snapshot, and
//! always finite.
//!
//! | Metric | Formula |
//! |--------|---------|
//! | `total` | `records.len()` |
//! | `completed` | records whose status is in the family's completed set |
//! | `active` | records whose status is not terminal |
//! | `overdue` | not terminal and `due < now` |
//! | `completion_rate` | `completed / total × 100`, `0` when `total == 0` |
//! | `mean` | `Σx / n`, `0` when `n == 0` |
//! | `weighted_mean` | `Σ(x·w) / Σw`, `0` when `Σw <= 0` |
//! | `saturating_total` | `Σx` over counters, clamped at `u64::MAX` |
//!
//! Aggregation never looks at filter state: dashboard cards describe the
//! whole collection regardless of what the list below them shows.

use std::fmt::Debug;
use std::hash::Hash;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::schema::{EnumField, Record, STATUS_DIMENSION};

/// `part / whole × 100`, defined as `0` for an empty whole.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Percentage of two float quantities, `0` when `whole` is not positive.
#[must_use]
pub fn ratio_pct(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 || !whole.is_finite() || !part.is_finite() {
        return 0.0;
    }
    part / whole * 100.0
}

/// Arithmetic mean, `0` for no values.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

/// Weighted mean of `(value, weight)` pairs, `0` when the total weight is
/// not positive.
#[must_use]
pub fn weighted_mean<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (weighted, weight) = pairs
        .into_iter()
        .fold((0.0, 0.0), |(acc, total), (value, w)| {
            (acc + value * w, total + w)
        });
    if weight <= 0.0 {
        return 0.0;
    }
    weighted / weight
}

/// Sum of counters, saturating at `u64::MAX` instead of overflowing.
#[must_use]
pub fn saturating_total<I>(values: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    values.into_iter().fold(0, u64::saturating_add)
}

/// Count records per key, in first-seen key order.
pub fn count_by<'a, R, K, F>(records: &'a [R], mut key: F) -> IndexMap<K, usize>
where
    K: Hash + Eq,
    F: FnMut(&'a R) -> K,
{
    let mut counts = IndexMap::new();
    for record in records {
        *counts.entry(key(record)).or_insert(0) += 1;
    }
    counts
}

/// Count records per value of an enum dimension.
///
/// Every legal value appears in declaration order, zero counts included, so
/// dashboard cards have a fixed shape. Values outside the legal set follow in
/// first-seen order. Records without the field are not counted.
pub fn count_by_dimension<R>(records: &[R], field: &EnumField<R>) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = field
        .legal
        .iter()
        .map(|value| ((*value).to_string(), 0))
        .collect();
    for record in records {
        if let Some(value) = (field.get)(record) {
            match counts.get_mut(value) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(value.to_string(), 1);
                }
            }
        }
    }
    counts
}

/// Status-level summary shared by every record family.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub overdue: usize,
    pub completion_rate: f64,
    pub by_status: IndexMap<String, usize>,
}

/// Compute the [`StatusSummary`] of `records` against one `now` snapshot.
pub fn status_summary<R: Record>(records: &[R], now: NaiveDateTime) -> StatusSummary {
    let schema = R::schema();
    let lifecycle = schema.lifecycle();

    let mut completed = 0;
    let mut terminal = 0;
    let mut overdue = 0;
    for record in records {
        if lifecycle.is_completed(record) {
            completed += 1;
        }
        if lifecycle.is_terminal(record) {
            terminal += 1;
        } else if lifecycle.due(record).is_some_and(|due| due < now) {
            overdue += 1;
        }
    }

    let by_status = schema
        .dimension_field(STATUS_DIMENSION)
        .map(|status| count_by_dimension(records, status))
        .unwrap_or_default();

    StatusSummary {
        total: records.len(),
        completed,
        active: records.len() - terminal,
        overdue,
        completion_rate: rate(completed, records.len()),
        by_status,
    }
}

/// A record family with a typed dashboard summary.
pub trait Aggregate: Record {
    type Summary: Serialize + Debug + Clone;

    /// Reduce the full collection. `now` is the single snapshot used for
    /// every time-relative metric in this pass.
    fn summarize(records: &[Self], now: NaiveDateTime) -> Self::Summary;
}

/// Aggregate `records` of one family.
pub fn aggregate<R: Aggregate>(records: &[R], now: NaiveDateTime) -> R::Summary {
    debug!(
        kind = R::schema().kind(),
        total = records.len(),
        %now,
        "aggregate pass"
    );
    R::summarize(records, now)
}
