//! CLI output utilities: tables, TTY detection, JSON mode.
//!
//! Output adapts to where it goes:
//! - **JSON mode**: pretty JSON via `--json` or `BOARDVIEW_OUTPUT=json`
//! - **TTY mode**: bold headers and a rule under them
//! - **Pipe mode**: plain aligned columns

use std::fmt::Write as _;
use std::io::{IsTerminal, Write};

use boardview_core::BoardError;
use boardview_core::models::{
    AutomationLog, DuplicateGroup, FormTemplate, Proposal, Task, ValidationIssue, Webhook,
};
use serde::Serialize;
use serde_json::Value;

use crate::CliResult;

/// Detect whether stdout is a TTY.
#[must_use]
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

// ── Simple table renderer ────────────────────────────────────────────────

/// A CLI table that auto-sizes columns and renders to text.
pub struct CliTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Rows beyond this are summarized in a footer. 0 = unlimited.
    limit: usize,
}

impl CliTable {
    #[must_use]
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: Vec::new(),
            limit: 0,
        }
    }

    pub fn add_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn shown(&self) -> &[Vec<String>] {
        if self.limit == 0 || self.rows.len() <= self.limit {
            &self.rows
        } else {
            &self.rows[..self.limit]
        }
    }

    fn column_widths(&self) -> Vec<usize> {
        let ncols = self.headers.len();
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in self.shown() {
            for (i, cell) in row.iter().enumerate().take(ncols) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        widths
    }

    /// Render to a `String`. `styled` enables the bold header and rule.
    #[must_use]
    pub fn render_to_string(&self, styled: bool) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        let widths = self.column_widths();
        let mut out = String::new();

        let header_line = format_row(&self.headers, &widths);
        if styled {
            let _ = writeln!(out, "\x1b[1m{header_line}\x1b[0m");
            let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
            let _ = writeln!(out, "{}", rule.join("──"));
        } else {
            let _ = writeln!(out, "{header_line}");
        }

        for row in self.shown() {
            let _ = writeln!(out, "{}", format_row(row, &widths));
        }
        let hidden = self.rows.len() - self.shown().len();
        if hidden > 0 {
            let _ = writeln!(out, "… {hidden} more");
        }
        out
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let ncols = widths.len();
    let mut parts = Vec::with_capacity(ncols);
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map_or("", String::as_str);
        if i + 1 == ncols {
            // Last column: no padding
            parts.push(cell.to_string());
        } else {
            let pad = width.saturating_sub(cell.chars().count());
            parts.push(format!("{cell}{}", " ".repeat(pad)));
        }
    }
    parts.join("  ")
}

// ── Record rows ──────────────────────────────────────────────────────────

/// Columns a record family shows in `bv list`.
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

fn opt(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn opt_display<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

impl TableRow for Task {
    const HEADERS: &'static [&'static str] =
        &["ID", "STATUS", "PRIORITY", "TYPE", "ASSIGNEE", "DUE", "TITLE"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.status.to_string(),
            self.priority.to_string(),
            self.task_type.to_string(),
            opt(self.assignee.as_deref()),
            opt_display(self.due_date),
            self.title.clone(),
        ]
    }
}

impl TableRow for Proposal {
    const HEADERS: &'static [&'static str] =
        &["ID", "STATUS", "TYPE", "VALUE", "PROB", "CLIENT", "TITLE"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.status.to_string(),
            self.project_type.to_string(),
            format!("{:.2}", self.value),
            format!("{}%", self.probability),
            self.client_name.clone(),
            self.title.clone(),
        ]
    }
}

impl TableRow for AutomationLog {
    const HEADERS: &'static [&'static str] =
        &["ID", "STATUS", "TRIGGER", "STARTED", "MS", "AUTOMATION"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.status.to_string(),
            self.trigger.to_string(),
            self.started_at.to_string(),
            opt_display(self.duration_ms),
            self.automation_name.clone(),
        ]
    }
}

impl TableRow for DuplicateGroup {
    const HEADERS: &'static [&'static str] =
        &["ID", "STATUS", "MATCH", "SCORE", "RECORDS", "NAME"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.status.to_string(),
            self.match_field.to_string(),
            format!("{:.1}", self.match_score),
            self.record_count.to_string(),
            self.primary_name.clone(),
        ]
    }
}

impl TableRow for ValidationIssue {
    const HEADERS: &'static [&'static str] =
        &["ID", "STATUS", "SEVERITY", "RULE", "FIELD", "RECORD"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.status.to_string(),
            self.severity.to_string(),
            self.rule.to_string(),
            self.field.clone(),
            self.record_name.clone(),
        ]
    }
}

impl TableRow for FormTemplate {
    const HEADERS: &'static [&'static str] =
        &["ID", "STATUS", "CATEGORY", "FIELDS", "USES", "RATING", "NAME"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.status.to_string(),
            self.category.to_string(),
            self.field_count.to_string(),
            self.usage_count.to_string(),
            self.rating.map_or_else(|| "-".to_string(), |r| format!("{r:.1}")),
            self.name.clone(),
        ]
    }
}

impl TableRow for Webhook {
    const HEADERS: &'static [&'static str] =
        &["ID", "STATUS", "EVENT", "DELIVERIES", "FAILURES", "NAME"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.status.to_string(),
            self.event.to_string(),
            self.deliveries.to_string(),
            self.failures.to_string(),
            self.name.clone(),
        ]
    }
}

/// Table of `records` using the family's columns.
#[must_use]
pub fn records_table<R: TableRow>(records: &[&R], limit: usize) -> CliTable {
    let mut table = CliTable::new(R::HEADERS).with_limit(limit);
    for record in records {
        table.add_row(record.cells());
    }
    table
}

// ── Summaries ────────────────────────────────────────────────────────────

/// Two-column METRIC / VALUE table of a serialized summary.
///
/// Nested count maps collapse to `key=count` pairs on one line.
pub fn summary_table<T: Serialize>(summary: &T) -> CliResult<CliTable> {
    let mut table = CliTable::new(&["METRIC", "VALUE"]);
    let value = serde_json::to_value(summary).map_err(BoardError::from)?;
    if let Value::Object(fields) = value {
        for (name, value) in fields {
            table.add_row(vec![name, format_value(&value)]);
        }
    }
    Ok(table)
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|_| n.is_f64())
            .map_or_else(|| n.to_string(), |f| format!("{f:.2}")),
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}={}", format_value(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(items) => items.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Null => "-".to_string(),
        Value::Bool(b) => b.to_string(),
    }
}

// ── JSON or table output ─────────────────────────────────────────────────

/// Write `data` as pretty JSON.
pub fn print_json<T: Serialize>(out: &mut dyn Write, data: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(data).map_err(BoardError::from)?;
    writeln!(out, "{text}")?;
    Ok(())
}

/// Write a rendered table, or `empty` when it has no rows.
pub fn print_table(
    out: &mut dyn Write,
    table: &CliTable,
    styled: bool,
    empty: &str,
) -> CliResult<()> {
    let text = table.render_to_string(styled);
    if text.is_empty() {
        if !empty.is_empty() {
            writeln!(out, "{empty}")?;
        }
    } else {
        write!(out, "{text}")?;
    }
    Ok(())
}
