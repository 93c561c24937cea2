//! Distinct-value extraction for filter dropdowns.
//!
//! Values keep first-seen order, never re-sorted, so option lists stay stable
//! as long as the source collection does.

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

use crate::schema::Record;

/// Distinct values of `selector` over `records`, first-seen order.
pub fn distinct_values<'a, R, T, F>(records: &'a [R], selector: F) -> IndexSet<T>
where
    T: Hash + Eq,
    F: FnMut(&'a R) -> T,
{
    records.iter().map(selector).collect()
}

/// Like [`distinct_values`] but skips records where the field is absent.
pub fn distinct_present<'a, R, T, F>(records: &'a [R], selector: F) -> IndexSet<T>
where
    T: Hash + Eq,
    F: FnMut(&'a R) -> Option<T>,
{
    records.iter().filter_map(selector).collect()
}

/// Options for every enum dimension of `R`, keyed by dimension name in
/// schema order.
///
/// Options are the values present in `records`, not the full legal set: a
/// dropdown only offers values that can match something.
pub fn dimension_options<R: Record>(records: &[R]) -> IndexMap<&'static str, Vec<String>> {
    R::schema()
        .dimensions()
        .iter()
        .map(|field| {
            let values = distinct_present(records, |record| (field.get)(record))
                .into_iter()
                .map(str::to_string)
                .collect();
            (field.name, values)
        })
        .collect()
}
