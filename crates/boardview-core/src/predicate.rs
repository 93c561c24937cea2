//! Single-criterion predicates.
//!
//! Every function here is pure and total. A missing optional field never
//! matches a non-trivial criterion; it is not an error.

use chrono::NaiveDateTime;

use crate::query::{DateRange, Selection};
use crate::schema::{DateField, EnumField, Lifecycle, Record, SEARCH_DIMENSION, TextField};

/// Case-insensitive substring match across `fields`.
///
/// An empty query matches every record.
#[must_use]
pub fn text_matches<R>(record: &R, fields: &[TextField<R>], query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    folded_text_matches(record, fields, &query.to_lowercase())
}

/// Like [`text_matches`] with a query that is already lowercased and
/// non-empty, so the filter folds it once per pass instead of per record.
#[must_use]
pub fn folded_text_matches<R>(record: &R, fields: &[TextField<R>], needle: &str) -> bool {
    fields.iter().any(|field| {
        (field.get)(record).is_some_and(|value| value.to_lowercase().contains(needle))
    })
}

/// `selection == all || record[field] == selection`.
#[must_use]
pub fn enum_matches<R>(record: &R, field: &EnumField<R>, selection: &Selection) -> bool {
    match selection {
        Selection::All => true,
        Selection::Value(expected) => (field.get)(record).is_some_and(|actual| actual == expected),
    }
}

/// Whether the record's `field` falls inside `range`.
#[must_use]
pub fn date_in_range<R>(record: &R, field: &DateField<R>, range: &DateRange) -> bool {
    (field.get)(record).is_some_and(|instant| range.contains(instant))
}

/// Not terminal and due strictly before `now`.
///
/// `now` is always supplied by the caller; this never reads the clock.
#[must_use]
pub fn is_overdue<R: Record>(record: &R, now: NaiveDateTime) -> bool {
    R::schema().lifecycle().is_overdue(record, now)
}

/// Evaluate one named dimension of `R`'s schema against `value`.
///
/// `dimension == "search"` runs the text predicate with the selection as the
/// query. Unknown dimensions only match the `all` sentinel.
#[must_use]
pub fn matches<R: Record>(record: &R, dimension: &str, value: &Selection) -> bool {
    let schema = R::schema();
    if dimension == SEARCH_DIMENSION {
        return match value {
            Selection::All => true,
            Selection::Value(query) => text_matches(record, schema.search_fields(), query),
        };
    }
    match schema.dimension_field(dimension) {
        Some(field) => enum_matches(record, field, value),
        None => value.is_all(),
    }
}

/// One compiled clause of a composite filter.
pub enum Predicate<'s, R: 'static> {
    /// `needle` is lowercased and non-empty.
    Search {
        needle: String,
        fields: &'static [TextField<R>],
    },
    Enum {
        field: &'static EnumField<R>,
        value: &'s str,
    },
    DateRange {
        field: &'static DateField<R>,
        range: &'s DateRange,
    },
    Overdue {
        lifecycle: &'static Lifecycle<R>,
        now: NaiveDateTime,
    },
    /// A clause that can never hold, e.g. a selection on a dimension the
    /// record family does not have.
    Never { dimension: &'s str },
}

impl<R: 'static> Predicate<'_, R> {
    #[must_use]
    pub fn evaluate(&self, record: &R) -> bool {
        match self {
            Self::Search { needle, fields } => folded_text_matches(record, fields, needle),
            Self::Enum { field, value } => {
                (field.get)(record).is_some_and(|actual| actual == *value)
            }
            Self::DateRange { field, range } => date_in_range(record, field, range),
            Self::Overdue { lifecycle, now } => lifecycle.is_overdue(record, *now),
            Self::Never { .. } => false,
        }
    }

    /// Dimension name, for logs.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Search { .. } => SEARCH_DIMENSION,
            Self::Enum { field, .. } => field.name,
            Self::DateRange { field, .. } => field.name,
            Self::Overdue { .. } => "overdue",
            Self::Never { dimension } => dimension,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Task, TaskStatus};
    use crate::time::parse_instant;

    fn task(id: &str, title: &str, status: TaskStatus, due: Option<&str>) -> Task {
        Task {
            status,
            due_date: due.map(|d| parse_instant(d).unwrap().date()),
            ..Task::sample(id, title)
        }
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let schema = Task::schema();
        let alpha = task("t1", "Alpha Corp", TaskStatus::Todo, None);
        let beta = task("t2", "Beta", TaskStatus::Todo, None);
        assert!(text_matches(&alpha, schema.search_fields(), "alpha"));
        assert!(text_matches(&alpha, schema.search_fields(), "PHA c"));
        assert!(!text_matches(&beta, schema.search_fields(), "alpha"));
    }

    #[test]
    fn empty_query_matches_everything() {
        let record = task("t1", "", TaskStatus::Todo, None);
        assert!(text_matches(&record, Task::schema().search_fields(), ""));
    }

    #[test]
    fn search_scans_every_listed_field() {
        let mut record = task("t1", "Call back", TaskStatus::Todo, None);
        record.lead_name = Some("Harbor Builders".into());
        assert!(matches(&record, "search", &Selection::from("harbor")));
        record.lead_name = None;
        assert!(
            !matches(&record, "search", &Selection::from("harbor")),
            "missing optional field does not match"
        );
    }

    #[test]
    fn enum_predicate_honors_all_sentinel() {
        let record = task("t1", "x", TaskStatus::InProgress, None);
        assert!(matches(&record, "status", &Selection::All));
        assert!(matches(&record, "status", &Selection::from("in_progress")));
        assert!(!matches(&record, "status", &Selection::from("todo")));
        assert!(
            !matches(&record, "status", &Selection::from("bogus")),
            "values outside the legal set match nothing"
        );
    }

    #[test]
    fn unknown_dimension_only_matches_all() {
        let record = task("t1", "x", TaskStatus::Todo, None);
        assert!(matches(&record, "colour", &Selection::All));
        assert!(!matches(&record, "colour", &Selection::from("red")));
    }

    #[test]
    fn optional_enum_field_missing_does_not_match() {
        let mut record = task("t1", "x", TaskStatus::Todo, None);
        record.assignee = None;
        assert!(matches(&record, "assignee", &Selection::All));
        assert!(!matches(&record, "assignee", &Selection::from("Dana")));
    }

    #[test]
    fn overdue_requires_non_terminal_and_past_due() {
        let now = parse_instant("2024-06-01").unwrap();
        let done = task("t1", "x", TaskStatus::Completed, Some("2024-01-01"));
        let cancelled = task("t2", "x", TaskStatus::Cancelled, Some("2024-01-01"));
        let late = task("t3", "x", TaskStatus::Todo, Some("2024-01-01"));
        let future = task("t4", "x", TaskStatus::Todo, Some("2099-01-01"));
        let undated = task("t5", "x", TaskStatus::Todo, None);
        let due_now = task("t6", "x", TaskStatus::Review, Some("2024-06-01"));

        assert!(!is_overdue(&done, now));
        assert!(!is_overdue(&cancelled, now));
        assert!(is_overdue(&late, now));
        assert!(!is_overdue(&future, now));
        assert!(!is_overdue(&undated, now));
        assert!(!is_overdue(&due_now, now), "strictly before now");
    }

    #[test]
    fn date_range_predicate_skips_missing_dates() {
        let schema = Task::schema();
        let field = schema.date_field("due_date").unwrap();
        let range = DateRange {
            field: "due_date".into(),
            from: Some(parse_instant("2024-01-01").unwrap()),
            to: None,
        };
        let dated = task("t1", "x", TaskStatus::Todo, Some("2024-03-01"));
        let undated = task("t2", "x", TaskStatus::Todo, None);
        assert!(date_in_range(&dated, field, &range));
        assert!(!date_in_range(&undated, field, &range));
    }
}
