//! Field catalogs for record families.
//!
//! A [`Schema`] tells the engine how to read a record type without knowing
//! its concrete shape: which fields text search scans, which fields are
//! filterable enum dimensions, which fields carry dates, and how the status
//! lifecycle maps onto terminal / completed / overdue.
//!
//! Accessors are plain function pointers, so a schema is `Sync` and lives in a
//! `static` per record type.

use chrono::NaiveDateTime;

/// Reads an optional string view of one field.
pub type TextAccessor<R> = fn(&R) -> Option<&str>;

/// Reads an optional instant from one field.
pub type DateAccessor<R> = fn(&R) -> Option<NaiveDateTime>;

/// Reads the status label of a record.
pub type StatusAccessor<R> = fn(&R) -> &str;

/// Name of the pseudo-dimension that carries the free-text query.
pub const SEARCH_DIMENSION: &str = "search";

/// Name under which every schema exposes its status field.
pub const STATUS_DIMENSION: &str = "status";

/// A free-text field scanned by search.
pub struct TextField<R> {
    pub name: &'static str,
    pub get: TextAccessor<R>,
}

/// A filterable enum-like dimension.
///
/// `legal` lists the closed value set in display order. It is empty for open
/// dimensions such as assignee or owner, whose options come from the data.
pub struct EnumField<R> {
    pub name: &'static str,
    pub get: TextAccessor<R>,
    pub legal: &'static [&'static str],
}

impl<R> EnumField<R> {
    /// Whether `value` is in the closed value set. Open dimensions accept
    /// anything.
    #[must_use]
    pub fn is_legal(&self, value: &str) -> bool {
        self.legal.is_empty() || self.legal.contains(&value)
    }
}

/// A date-valued field usable in range filters.
pub struct DateField<R> {
    pub name: &'static str,
    pub get: DateAccessor<R>,
}

/// Status lifecycle of a record family.
pub struct Lifecycle<R> {
    pub status: StatusAccessor<R>,
    /// Every legal status, in display order.
    pub statuses: &'static [&'static str],
    /// Statuses excluded from the overdue and active predicates.
    pub terminal: &'static [&'static str],
    /// Statuses counted as successfully finished.
    pub completed: &'static [&'static str],
    /// Due instant, for families that have one.
    pub due: Option<DateAccessor<R>>,
}

impl<R> Lifecycle<R> {
    #[must_use]
    pub fn is_terminal(&self, record: &R) -> bool {
        self.terminal.contains(&(self.status)(record))
    }

    #[must_use]
    pub fn is_completed(&self, record: &R) -> bool {
        self.completed.contains(&(self.status)(record))
    }

    #[must_use]
    pub fn due(&self, record: &R) -> Option<NaiveDateTime> {
        self.due.and_then(|get| get(record))
    }

    /// Overdue iff not terminal and due strictly before `now`.
    #[must_use]
    pub fn is_overdue(&self, record: &R, now: NaiveDateTime) -> bool {
        !self.is_terminal(record) && self.due(record).is_some_and(|due| due < now)
    }
}

/// Field catalog for one record family.
pub struct Schema<R> {
    kind: &'static str,
    search: Vec<TextField<R>>,
    dimensions: Vec<EnumField<R>>,
    dates: Vec<DateField<R>>,
    lifecycle: Lifecycle<R>,
}

impl<R: Record> Schema<R> {
    /// Start a schema. The lifecycle's status field is registered as the
    /// first dimension, named [`STATUS_DIMENSION`].
    #[must_use]
    pub fn new(kind: &'static str, lifecycle: Lifecycle<R>) -> Self {
        let status = EnumField {
            name: STATUS_DIMENSION,
            get: status_as_text::<R>,
            legal: lifecycle.statuses,
        };
        Self {
            kind,
            search: Vec::new(),
            dimensions: vec![status],
            dates: Vec::new(),
            lifecycle,
        }
    }
}

impl<R> Schema<R> {
    #[must_use]
    pub fn search(mut self, name: &'static str, get: TextAccessor<R>) -> Self {
        self.search.push(TextField { name, get });
        self
    }

    #[must_use]
    pub fn dimension(
        mut self,
        name: &'static str,
        get: TextAccessor<R>,
        legal: &'static [&'static str],
    ) -> Self {
        debug_assert!(
            self.dimension_field(name).is_none(),
            "duplicate dimension {name}"
        );
        self.dimensions.push(EnumField { name, get, legal });
        self
    }

    #[must_use]
    pub fn date(mut self, name: &'static str, get: DateAccessor<R>) -> Self {
        self.dates.push(DateField { name, get });
        self
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    #[must_use]
    pub fn search_fields(&self) -> &[TextField<R>] {
        &self.search
    }

    #[must_use]
    pub fn dimensions(&self) -> &[EnumField<R>] {
        &self.dimensions
    }

    #[must_use]
    pub fn dates(&self) -> &[DateField<R>] {
        &self.dates
    }

    #[must_use]
    pub const fn lifecycle(&self) -> &Lifecycle<R> {
        &self.lifecycle
    }

    #[must_use]
    pub fn dimension_field(&self, name: &str) -> Option<&EnumField<R>> {
        self.dimensions.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn date_field(&self, name: &str) -> Option<&DateField<R>> {
        self.dates.iter().find(|field| field.name == name)
    }
}

// Status dimension view over the lifecycle accessor.
fn status_as_text<R: Record>(record: &R) -> Option<&str> {
    Some((R::schema().lifecycle.status)(record))
}

/// A domain record the engine can filter and aggregate.
pub trait Record: Sized + 'static {
    /// Stable unique identifier.
    fn id(&self) -> &str;

    /// The field catalog shared by every record of this type.
    fn schema() -> &'static Schema<Self>;
}
