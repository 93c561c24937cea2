//! Composite filter compiler
//!
//! Compiles a [`FilterState`] into a list of [`Predicate`] clauses for one
//! record family and ANDs them over a collection:
//! - `search` - lowercased once, scanned across the schema's search fields
//! - one clause per non-`all` selection
//! - `date_range` - inclusive window on a named date field
//! - `overdue_as_of` - overdue relative to the given snapshot
//!
//! Pass-through values (`all`, empty search, unset window) compile to no
//! clause at all, so a cleared state is the identity. Output keeps input order.

use tracing::debug;

use crate::predicate::Predicate;
use crate::query::FilterState;
use crate::schema::Record;

/// Compiled filter: the active clauses for one [`FilterState`].
pub struct CompositeFilter<'s, R: Record> {
    clauses: Vec<Predicate<'s, R>>,
}

impl<'s, R: Record> CompositeFilter<'s, R> {
    /// Compile `state` against `R`'s schema.
    #[must_use]
    pub fn compile(state: &'s FilterState) -> Self {
        let schema = R::schema();
        let mut clauses = Vec::new();

        if !state.search.is_empty() {
            clauses.push(Predicate::Search {
                needle: state.search.to_lowercase(),
                fields: schema.search_fields(),
            });
        }

        for (dimension, selection) in &state.selections {
            let Some(value) = selection.as_value() else {
                continue;
            };
            match schema.dimension_field(dimension) {
                Some(field) => clauses.push(Predicate::Enum { field, value }),
                None => clauses.push(Predicate::Never { dimension }),
            }
        }

        if let Some(range) = &state.date_range {
            match schema.date_field(&range.field) {
                Some(field) => clauses.push(Predicate::DateRange { field, range }),
                None => clauses.push(Predicate::Never {
                    dimension: &range.field,
                }),
            }
        }

        if let Some(now) = state.overdue_as_of {
            clauses.push(Predicate::Overdue {
                lifecycle: schema.lifecycle(),
                now,
            });
        }

        Self { clauses }
    }

    /// Returns `true` if no clauses were produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Number of active clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Dimension names of the active clauses, in compile order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.clauses.iter().map(Predicate::label).collect()
    }

    /// Whether `record` satisfies every clause.
    #[must_use]
    pub fn matches(&self, record: &R) -> bool {
        self.clauses.iter().all(|clause| clause.evaluate(record))
    }

    /// Keep the records that satisfy every clause, in input order.
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a R>
    where
        I: IntoIterator<Item = &'a R>,
    {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect()
    }
}

/// Filter a collection by `state`, preserving order.
#[must_use]
pub fn filter<'a, R: Record>(records: &'a [R], state: &FilterState) -> Vec<&'a R> {
    filter_iter(records, state)
}

/// [`filter`] over any iterator of borrowed records, e.g. an earlier result.
pub fn filter_iter<'a, R, I>(records: I, state: &FilterState) -> Vec<&'a R>
where
    R: Record,
    I: IntoIterator<Item = &'a R>,
{
    let compiled = CompositeFilter::<R>::compile(state);
    let records = records.into_iter();
    let (input_hint, _) = records.size_hint();
    let visible = compiled.apply(records);
    debug!(
        kind = R::schema().kind(),
        input = input_hint,
        visible = visible.len(),
        clauses = ?compiled.labels(),
        "filter pass"
    );
    visible
}
