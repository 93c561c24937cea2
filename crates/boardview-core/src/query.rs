//! Filter state model
//!
//! [`FilterState`] is the input the presentation layer owns and mutates. It
//! holds one active value per filterable dimension plus the free-text query,
//! an optional date window and an optional overdue-only snapshot.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::Record;
use crate::time::{end_of_day, start_of_day};

/// Sentinel selection value meaning "do not filter on this dimension".
pub const ALL: &str = "all";

/// One dimension's selected value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Value(String),
}

impl Selection {
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    #[must_use]
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Value(v) => Some(v),
        }
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        if value == ALL {
            Self::All
        } else {
            Self::Value(value.to_string())
        }
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        if value == ALL {
            Self::All
        } else {
            Self::Value(value)
        }
    }
}

impl From<Selection> for String {
    fn from(value: Selection) -> Self {
        match value {
            Selection::All => ALL.to_string(),
            Selection::Value(v) => v,
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Value(v) => f.write_str(v),
        }
    }
}

/// Date window over one named date field (inclusive on both ends)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDateTime>,
}

impl DateRange {
    /// Window covering whole calendar days, `to` included through its last
    /// instant.
    #[must_use]
    pub fn between_days(
        field: impl Into<String>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Self {
        Self {
            field: field.into(),
            from: from.map(start_of_day),
            to: to.map(end_of_day),
        }
    }

    #[must_use]
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.from.is_none_or(|from| instant >= from) && self.to.is_none_or(|to| instant <= to)
    }
}

/// The active filter values for one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Case-insensitive substring query. Empty matches everything.
    #[serde(default)]
    pub search: String,
    /// Selected value per enum dimension, keyed by dimension name.
    #[serde(default)]
    pub selections: IndexMap<String, Selection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    /// When set, only records overdue at this instant are visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overdue_as_of: Option<NaiveDateTime>,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    #[must_use]
    pub fn with_selection(
        mut self,
        dimension: impl Into<String>,
        selection: impl Into<Selection>,
    ) -> Self {
        self.selections.insert(dimension.into(), selection.into());
        self
    }

    #[must_use]
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    #[must_use]
    pub const fn with_overdue_as_of(mut self, now: NaiveDateTime) -> Self {
        self.overdue_as_of = Some(now);
        self
    }

    /// Selection for `dimension`, `All` when unset.
    #[must_use]
    pub fn selection(&self, dimension: &str) -> &Selection {
        static UNSET: Selection = Selection::All;
        self.selections.get(dimension).unwrap_or(&UNSET)
    }

    /// True when every dimension is at its pass-through value.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.search.is_empty()
            && self.selections.values().all(Selection::is_all)
            && self.date_range.is_none()
            && self.overdue_as_of.is_none()
    }

    /// Reset every dimension to its pass-through value.
    pub fn clear(&mut self) {
        self.search.clear();
        for selection in self.selections.values_mut() {
            *selection = Selection::All;
        }
        self.date_range = None;
        self.overdue_as_of = None;
    }

    /// Check dimension names and values against `R`'s schema.
    ///
    /// Filtering never calls this: an unknown dimension or an illegal value
    /// simply matches nothing. Front ends use it to report typos.
    pub fn validate_for<R: Record>(&self) -> Result<()> {
        let schema = R::schema();
        for (dimension, selection) in &self.selections {
            let Some(field) = schema.dimension_field(dimension) else {
                return Err(Error::UnknownDimension {
                    kind: schema.kind().to_string(),
                    dimension: dimension.clone(),
                });
            };
            if let Some(value) = selection.as_value() {
                if !field.is_legal(value) {
                    return Err(Error::InvalidArgument(format!(
                        "'{value}' is not a valid {dimension} (expected one of: {})",
                        field.legal.join(", ")
                    )));
                }
            }
        }
        if let Some(range) = &self.date_range {
            if schema.date_field(&range.field).is_none() {
                return Err(Error::UnknownDimension {
                    kind: schema.kind().to_string(),
                    dimension: range.field.clone(),
                });
            }
            if let (Some(from), Some(to)) = (range.from, range.to) {
                if from > to {
                    return Err(Error::InvalidArgument(format!(
                        "date range on {} starts after it ends",
                        range.field
                    )));
                }
            }
        }
        Ok(())
    }
}
