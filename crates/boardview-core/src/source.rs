//! Record sources.
//!
//! The engine never fetches data itself. A [`RecordSource`] hands it a full
//! collection; swapping the source (fixtures, a JSON export, a real store)
//! does not touch filtering or aggregation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::schema::Record;

/// Supplies the full collection for one record family.
pub trait RecordSource<R> {
    fn load(&self) -> Result<Vec<R>>;
}

/// Fixed in-memory collection, cloned on every load.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource<R> {
    records: Vec<R>,
}

impl<R> InMemorySource<R> {
    #[must_use]
    pub const fn new(records: Vec<R>) -> Self {
        Self { records }
    }
}

impl<R: Clone> RecordSource<R> for InMemorySource<R> {
    fn load(&self) -> Result<Vec<R>> {
        Ok(self.records.clone())
    }
}

/// JSON file holding either a bare array of records or `{"records": [...]}`.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<R: Record + DeserializeOwned> RecordSource<R> for JsonFileSource {
    fn load(&self) -> Result<Vec<R>> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {e}", self.path.display()),
            ))
        })?;
        let records = parse_records::<R>(&contents)?;
        debug!(
            path = %self.path.display(),
            kind = R::schema().kind(),
            count = records.len(),
            "loaded records"
        );
        Ok(records)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document<R> {
    Bare(Vec<R>),
    Wrapped { records: Vec<R> },
}

/// Parse a JSON document of records.
///
/// Duplicate ids are kept (the engine never dedups) but logged, since every
/// downstream consumer assumes ids are unique.
pub fn parse_records<R: Record + DeserializeOwned>(json: &str) -> Result<Vec<R>> {
    let records = match serde_json::from_str::<Document<R>>(json) {
        Ok(Document::Bare(records) | Document::Wrapped { records }) => records,
        // The untagged error says nothing useful; retry as a bare array to
        // surface the real field-level message.
        Err(_) => serde_json::from_str::<Vec<R>>(json)?,
    };

    let mut seen = HashSet::with_capacity(records.len());
    for record in &records {
        if !seen.insert(record.id()) {
            warn!(
                kind = R::schema().kind(),
                id = record.id(),
                "duplicate record id"
            );
        }
    }
    Ok(records)
}
