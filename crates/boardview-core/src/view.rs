//! One listing page's worth of derived data.
//!
//! [`build_view`] runs the whole pipeline in one call: aggregate over the full
//! collection, filter by the current state, extract dropdown options.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Serialize;

use crate::aggregate::{Aggregate, aggregate};
use crate::derived::dimension_options;
use crate::filter::filter;
use crate::query::FilterState;

/// Everything a listing page renders.
#[derive(Debug, Serialize)]
#[serde(bound(serialize = "R: Serialize"))]
pub struct ListingView<'a, R: Aggregate> {
    pub kind: &'static str,
    /// Summary over the unfiltered collection.
    pub summary: R::Summary,
    pub total: usize,
    pub visible_count: usize,
    pub visible: Vec<&'a R>,
    /// Distinct values per enum dimension, from the unfiltered collection.
    pub options: IndexMap<&'static str, Vec<String>>,
}

impl<R: Aggregate> ListingView<'_, R> {
    /// True when the filter hid at least one record.
    #[must_use]
    pub const fn is_narrowed(&self) -> bool {
        self.visible_count < self.total
    }
}

/// Build the [`ListingView`] for `records` under `state` at `now`.
#[must_use]
pub fn build_view<'a, R: Aggregate>(
    records: &'a [R],
    state: &FilterState,
    now: NaiveDateTime,
) -> ListingView<'a, R> {
    let visible = filter(records, state);
    ListingView {
        kind: R::schema().kind(),
        summary: aggregate(records, now),
        total: records.len(),
        visible_count: visible.len(),
        visible,
        options: dimension_options(records),
    }
}
