//! CLI commands for boardview
//!
//! `bv` loads a JSON export of one record family and runs the listing engine
//! over it:
//! - `list`: filtered records plus the visible/total count
//! - `stats`: the family's dashboard summary over the whole file
//! - `options`: distinct values per filter dimension
//! - `dimensions`: what a family can be searched, filtered and ranged on

#![forbid(unsafe_code)]

pub mod output;

use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use boardview_core::models::{
    AutomationLog, DuplicateGroup, FormTemplate, Proposal, RecordKind, Task, ValidationIssue,
    Webhook,
};
use boardview_core::time::{parse_instant, parse_upper_bound};
use boardview_core::{
    Aggregate, BoardError, Config, DateRange, FilterState, JsonFileSource, OutputFormat,
    RecordSource, aggregate, build_view, dimension_options,
};

use crate::output::{
    CliTable, TableRow, is_tty, print_json, print_table, records_table, summary_table,
};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Core(#[from] BoardError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "bv", version, about = "Filter and summarize boardview listings")]
pub struct Cli {
    /// Emit JSON instead of a table.
    #[arg(long, global = true)]
    pub json: bool,
    /// Snapshot for overdue checks (YYYY-MM-DD or date-time). Defaults to
    /// `BOARDVIEW_NOW`, then the wall clock.
    #[arg(long, global = true, value_name = "TIME")]
    pub now: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Records visible under a filter.
    List {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
        /// Max table rows (0 = all). Defaults to `BOARDVIEW_TABLE_LIMIT`.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Dashboard summary over the whole file.
    Stats {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Distinct values per filter dimension.
    Options {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Searchable fields, filter dimensions and date fields of a family.
    Dimensions {
        #[arg(long, short = 'k')]
        kind: RecordKind,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Record family in the file.
    #[arg(long, short = 'k')]
    pub kind: RecordKind,
    /// JSON array of records, or `{"records": [...]}`. Relative paths resolve
    /// against `BOARDVIEW_DATA_DIR`.
    #[arg(long, short = 'f')]
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Start from a saved filter state (JSON).
    #[arg(long, value_name = "PATH")]
    pub state: Option<PathBuf>,
    /// Case-insensitive substring across the family's search fields.
    #[arg(long, short = 's')]
    pub search: Option<String>,
    /// `DIMENSION=VALUE`, repeatable or comma-separated. `VALUE` may be `all`
    /// and may contain commas that are not followed by another `DIM=`.
    #[arg(long = "filter", value_name = "DIM=VALUE")]
    pub filters: Vec<String>,
    /// Only records overdue at the snapshot time.
    #[arg(long)]
    pub overdue: bool,
    /// Date field for `--from` / `--to`.
    #[arg(long, value_name = "FIELD")]
    pub date_field: Option<String>,
    #[arg(long, value_name = "TIME", requires = "date_field")]
    pub from: Option<String>,
    /// Inclusive upper bound. A bare date covers that whole day.
    #[arg(long, value_name = "TIME", requires = "date_field")]
    pub to: Option<String>,
    /// Reject unknown dimensions and illegal values instead of matching
    /// nothing.
    #[arg(long)]
    pub strict: bool,
}

impl FilterArgs {
    /// Build the filter state these flags describe.
    pub fn to_state(&self, now: NaiveDateTime) -> CliResult<FilterState> {
        let mut state = match &self.state {
            Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)
                .map_err(BoardError::from)?,
            None => FilterState::new(),
        };

        if let Some(search) = &self.search {
            state.search.clone_from(search);
        }
        for raw in &self.filters {
            for (dimension, value) in split_filter_entries(raw)? {
                state = state.with_selection(dimension, value);
            }
        }
        if self.overdue {
            state = state.with_overdue_as_of(now);
        }
        if let Some(field) = &self.date_field {
            state = state.with_date_range(DateRange {
                field: field.clone(),
                from: self.from.as_deref().map(parse_instant).transpose()?,
                to: self.to.as_deref().map(parse_upper_bound).transpose()?,
            });
        }
        Ok(state)
    }
}

/// Split one `--filter` argument into `(dimension, value)` pairs.
///
/// A comma starts a new entry only when a `DIM=` token follows it; any other
/// comma belongs to the value before it.
fn split_filter_entries(raw: &str) -> CliResult<Vec<(String, String)>> {
    let mut entries: Vec<(String, String)> = Vec::new();
    for piece in raw.split(',') {
        if piece.trim().is_empty() {
            continue;
        }
        match piece.split_once('=') {
            Some((dimension, value)) if is_dimension_name(dimension.trim()) => {
                entries.push((dimension.trim().to_string(), value.to_string()));
            }
            _ => match entries.last_mut() {
                Some((_, value)) => {
                    value.push(',');
                    value.push_str(piece);
                }
                None => {
                    return Err(CliError::InvalidArgument(format!(
                        "--filter expects DIM=VALUE, got '{}'",
                        piece.trim()
                    )));
                }
            },
        }
    }
    Ok(entries
        .into_iter()
        .map(|(dimension, value)| (dimension, value.trim().to_string()))
        .collect())
}

fn is_dimension_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Settings resolved once per invocation.
struct Context {
    config: Config,
    now: NaiveDateTime,
    json: bool,
    styled: bool,
}

impl Context {
    fn new(config: Config, cli: &Cli) -> CliResult<Self> {
        let now = match &cli.now {
            Some(value) => parse_instant(value)?,
            None => config.now(),
        };
        let json = cli.json || config.output_format == OutputFormat::Json;
        let styled = config.color && is_tty();
        Ok(Self {
            config,
            now,
            json,
            styled,
        })
    }

    fn load<R: boardview_core::Record + DeserializeOwned>(
        &self,
        source: &SourceArgs,
    ) -> CliResult<Vec<R>> {
        let path = self.config.resolve_path(&source.file);
        Ok(JsonFileSource::new(path).load()?)
    }
}

/// Run `$func::<Family>(args..)` for the family named by `$kind`.
macro_rules! for_kind {
    ($kind:expr, $func:ident ( $($arg:expr),* $(,)? )) => {
        match $kind {
            RecordKind::Tasks => $func::<Task>($($arg),*),
            RecordKind::Proposals => $func::<Proposal>($($arg),*),
            RecordKind::AutomationLogs => $func::<AutomationLog>($($arg),*),
            RecordKind::Duplicates => $func::<DuplicateGroup>($($arg),*),
            RecordKind::ValidationIssues => $func::<ValidationIssue>($($arg),*),
            RecordKind::Templates => $func::<FormTemplate>($($arg),*),
            RecordKind::Webhooks => $func::<Webhook>($($arg),*),
        }
    };
}

/// Parse arguments, execute, and map the outcome to a process exit code.
pub fn run(config: Config) -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };
    match execute(cli, config) {
        Ok(()) => 0,
        Err(err) => {
            emit_error(&err);
            err_exit_code(&err)
        }
    }
}

const fn err_exit_code(err: &CliError) -> i32 {
    match err {
        CliError::InvalidArgument(_) => 2,
        _ => 1,
    }
}

fn emit_error(err: &CliError) {
    eprintln!("error: {err}");
}

/// Execute a parsed command line, writing to stdout.
pub fn execute(cli: Cli, config: Config) -> CliResult<()> {
    execute_to(cli, config, &mut std::io::stdout().lock())
}

/// Execute a parsed command line, writing results to `out`.
pub fn execute_to(cli: Cli, config: Config, out: &mut dyn Write) -> CliResult<()> {
    let ctx = Context::new(config, &cli)?;
    debug!(command = ?cli.command, now = %ctx.now, json = ctx.json, "executing");
    match &cli.command {
        Commands::List {
            source,
            filter,
            limit,
        } => for_kind!(source.kind, handle_list(&ctx, out, source, filter, *limit)),
        Commands::Stats { source } => for_kind!(source.kind, handle_stats(&ctx, out, source)),
        Commands::Options { source } => {
            for_kind!(source.kind, handle_options(&ctx, out, source))
        }
        Commands::Dimensions { kind } => for_kind!(*kind, handle_dimensions(&ctx, out)),
    }
}

fn handle_list<R>(
    ctx: &Context,
    out: &mut dyn Write,
    source: &SourceArgs,
    filter: &FilterArgs,
    limit: Option<usize>,
) -> CliResult<()>
where
    R: Aggregate + DeserializeOwned + Serialize + TableRow,
{
    let records: Vec<R> = ctx.load(source)?;
    let state = filter.to_state(ctx.now)?;
    if filter.strict {
        state.validate_for::<R>()?;
    }
    let view = build_view(&records, &state, ctx.now);
    if ctx.json {
        return print_json(out, &view);
    }

    let table = records_table(&view.visible, limit.unwrap_or(ctx.config.table_limit));
    print_table(out, &table, ctx.styled, "No records match.")?;
    writeln!(out, "{} of {} {}", view.visible_count, view.total, view.kind)?;
    Ok(())
}

fn handle_stats<R>(ctx: &Context, out: &mut dyn Write, source: &SourceArgs) -> CliResult<()>
where
    R: Aggregate + DeserializeOwned,
{
    let records: Vec<R> = ctx.load(source)?;
    let summary = aggregate(&records, ctx.now);
    if ctx.json {
        return print_json(out, &summary);
    }
    print_table(out, &summary_table(&summary)?, ctx.styled, "")
}

fn handle_options<R>(ctx: &Context, out: &mut dyn Write, source: &SourceArgs) -> CliResult<()>
where
    R: Aggregate + DeserializeOwned,
{
    let records: Vec<R> = ctx.load(source)?;
    let options = dimension_options(&records);
    if ctx.json {
        return print_json(out, &options);
    }
    let mut table = CliTable::new(&["DIMENSION", "OPTIONS"]);
    for (dimension, values) in &options {
        let shown = if values.is_empty() {
            "-".to_string()
        } else {
            values.join(", ")
        };
        table.add_row(vec![(*dimension).to_string(), shown]);
    }
    print_table(out, &table, ctx.styled, "")
}

/// Serializable view of a family's schema.
#[derive(Debug, Serialize)]
pub struct SchemaReport {
    pub kind: &'static str,
    pub search: Vec<&'static str>,
    pub dimensions: Vec<DimensionReport>,
    pub dates: Vec<&'static str>,
    pub terminal: &'static [&'static str],
    pub completed: &'static [&'static str],
    pub has_due_date: bool,
}

#[derive(Debug, Serialize)]
pub struct DimensionReport {
    pub name: &'static str,
    /// Empty for open dimensions.
    pub legal: &'static [&'static str],
}

impl SchemaReport {
    #[must_use]
    pub fn of<R: boardview_core::Record>() -> Self {
        let schema = R::schema();
        let lifecycle = schema.lifecycle();
        Self {
            kind: schema.kind(),
            search: schema.search_fields().iter().map(|f| f.name).collect(),
            dimensions: schema
                .dimensions()
                .iter()
                .map(|f| DimensionReport {
                    name: f.name,
                    legal: f.legal,
                })
                .collect(),
            dates: schema.dates().iter().map(|f| f.name).collect(),
            terminal: lifecycle.terminal,
            completed: lifecycle.completed,
            has_due_date: lifecycle.due.is_some(),
        }
    }

    fn table(&self) -> CliTable {
        let mut table = CliTable::new(&["FIELD", "ROLE", "VALUES"]);
        for name in &self.search {
            table.add_row(vec![(*name).to_string(), "search".into(), String::new()]);
        }
        for dimension in &self.dimensions {
            let values = if dimension.legal.is_empty() {
                "(open)".to_string()
            } else {
                dimension.legal.join(", ")
            };
            table.add_row(vec![dimension.name.to_string(), "filter".into(), values]);
        }
        for name in &self.dates {
            table.add_row(vec![(*name).to_string(), "date".into(), String::new()]);
        }
        table.add_row(vec![
            "status".into(),
            "terminal".into(),
            self.terminal.join(", "),
        ]);
        table.add_row(vec![
            "status".into(),
            "completed".into(),
            self.completed.join(", "),
        ]);
        table
    }
}

fn handle_dimensions<R: boardview_core::Record>(
    ctx: &Context,
    out: &mut dyn Write,
) -> CliResult<()> {
    let report = SchemaReport::of::<R>();
    if ctx.json {
        return print_json(out, &report);
    }
    print_table(out, &report.table(), ctx.styled, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardview_core::Selection;

    const TASKS: &str = r#"[
        {"id": "t1", "title": "Call Alpha Corp", "status": "todo", "priority": "high",
         "task_type": "call", "assignee": "Dana", "due_date": "2024-01-10",
         "created_at": "2024-01-01T09:00:00"},
        {"id": "t2", "title": "Beta walkthrough", "status": "completed", "priority": "low",
         "task_type": "site_visit", "created_at": "2024-01-02T09:00:00"}
    ]"#;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bv").chain(args.iter().copied())).unwrap()
    }

    fn now() -> NaiveDateTime {
        parse_instant("2024-06-01").unwrap()
    }

    fn list_filter(cli: &Cli) -> &FilterArgs {
        match &cli.command {
            Commands::List { filter, .. } => filter,
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn parses_list_flags() {
        let cli = parse(&[
            "list",
            "--kind",
            "tasks",
            "--file",
            "tasks.json",
            "--search",
            "alpha",
            "--filter",
            "status=todo,priority=all",
            "--filter",
            "assignee=Dana",
            "--overdue",
            "--json",
        ]);
        assert!(cli.json);
        let state = list_filter(&cli).to_state(now()).unwrap();
        assert_eq!(state.search, "alpha");
        assert_eq!(state.selection("status").as_value(), Some("todo"));
        assert_eq!(state.selection("priority"), &Selection::All);
        assert_eq!(state.selection("assignee").as_value(), Some("Dana"));
        assert_eq!(state.overdue_as_of, Some(now()));
    }

    #[test]
    fn unknown_kind_is_a_usage_error() {
        let err = Cli::try_parse_from(["bv", "stats", "--kind", "leads", "--file", "x.json"])
            .unwrap_err();
        assert!(err.to_string().contains("leads"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn date_bounds_require_a_field() {
        assert!(
            Cli::try_parse_from([
                "bv", "list", "--kind", "tasks", "--file", "x.json", "--from", "2024-01-01"
            ])
            .is_err()
        );
    }

    #[test]
    fn malformed_filter_is_invalid_argument() {
        let cli = parse(&["list", "-k", "tasks", "-f", "x.json", "--filter", "status"]);
        let err = list_filter(&cli).to_state(now()).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
        assert_eq!(err_exit_code(&err), 2);
    }

    #[test]
    fn date_range_flags_build_inclusive_window() {
        let cli = parse(&[
            "list",
            "-k",
            "tasks",
            "-f",
            "x.json",
            "--date-field",
            "due_date",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
        ]);
        let state = list_filter(&cli).to_state(now()).unwrap();
        let range = state.date_range.unwrap();
        assert_eq!(range.field, "due_date");
        assert_eq!(range.from, Some(parse_instant("2024-01-01").unwrap()));
        assert_eq!(range.to, Some(parse_upper_bound("2024-01-31").unwrap()));
        assert!(range.contains(parse_instant("2024-01-31T17:45:00").unwrap()));
        assert!(!range.contains(parse_instant("2024-02-01").unwrap()));
    }

    #[test]
    fn filter_values_may_contain_commas() {
        let cli = parse(&[
            "list",
            "-k",
            "automation_logs",
            "-f",
            "x.json",
            "--filter",
            "automation=Welcome, day 2",
            "--filter",
            "owner=Smith, Jo,status=failed,",
        ]);
        let state = list_filter(&cli).to_state(now()).unwrap();
        assert_eq!(
            state.selection("automation").as_value(),
            Some("Welcome, day 2")
        );
        assert_eq!(state.selection("owner").as_value(), Some("Smith, Jo"));
        assert_eq!(state.selection("status").as_value(), Some("failed"));
    }

    #[test]
    fn saved_state_is_overridden_by_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"search": "beta", "selections": {"status": "completed"}}"#,
        )
        .unwrap();
        let cli = parse(&[
            "list",
            "-k",
            "tasks",
            "-f",
            "x.json",
            "--state",
            path.to_str().unwrap(),
            "--filter",
            "status=all",
        ]);
        let state = list_filter(&cli).to_state(now()).unwrap();
        assert_eq!(state.search, "beta");
        assert!(state.selection("status").is_all());
    }

    fn capture(args: &[&str], config: &Config) -> String {
        let config = Config {
            color: false,
            ..config.clone()
        };
        let mut out = Vec::new();
        execute_to(parse(args), config, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn list_prints_rows_and_visible_count() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tasks.json"), TASKS).unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };

        let text = capture(
            &["list", "-k", "tasks", "-f", "tasks.json", "--overdue", "--now", "2024-06-01"],
            &config,
        );
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].starts_with("t1"));
        assert!(lines[1].ends_with("Call Alpha Corp"));
        assert_eq!(lines.last(), Some(&"1 of 2 tasks"));

        let none = capture(
            &["list", "-k", "tasks", "-f", "tasks.json", "-s", "zzz"],
            &config,
        );
        assert_eq!(none, "No records match.\n0 of 2 tasks\n");
    }

    #[test]
    fn json_list_is_the_listing_view() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tasks.json"), TASKS).unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };

        let text = capture(
            &["list", "-k", "tasks", "-f", "tasks.json", "--json", "-s", "beta"],
            &config,
        );
        let view: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(view["kind"], "tasks");
        assert_eq!(view["total"], 2);
        assert_eq!(view["visible_count"], 1);
        assert_eq!(view["visible"][0]["id"], "t2");
        assert_eq!(view["summary"]["completed"], 1);
    }

    #[test]
    fn stats_and_options_print_their_tables() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tasks.json"), TASKS).unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };

        let stats = capture(
            &["stats", "-k", "tasks", "-f", "tasks.json", "--now", "2024-06-01"],
            &config,
        );
        assert!(stats.starts_with("METRIC"));
        assert!(stats.lines().any(|l| l.starts_with("total") && l.ends_with(" 2")));
        assert!(stats.lines().any(|l| l.starts_with("overdue") && l.ends_with(" 1")));

        let options = capture(&["options", "-k", "tasks", "-f", "tasks.json"], &config);
        assert!(options.starts_with("DIMENSION"));
        assert!(
            options
                .lines()
                .any(|l| l.starts_with("assignee") && l.ends_with("Dana"))
        );
    }

    #[test]
    fn commands_run_against_a_fixture() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tasks.json"), TASKS).unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };

        for args in [
            vec!["list", "-k", "tasks", "-f", "tasks.json", "--overdue"],
            vec!["list", "-k", "tasks", "-f", "tasks.json", "--json", "-s", "beta"],
            vec!["stats", "-k", "tasks", "-f", "tasks.json", "--now", "2024-06-01"],
            vec!["options", "-k", "tasks", "-f", "tasks.json", "--json"],
            vec!["dimensions", "-k", "webhooks"],
        ] {
            execute(parse(&args), config.clone()).unwrap();
        }
    }

    #[test]
    fn strict_mode_rejects_unknown_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tasks.json");
        std::fs::write(&file, TASKS).unwrap();
        let file = file.to_str().unwrap();

        let lenient = parse(&["list", "-k", "tasks", "-f", file, "--filter", "colour=red"]);
        assert!(execute(lenient, Config::default()).is_ok());

        let strict = parse(&[
            "list", "-k", "tasks", "-f", file, "--filter", "colour=red", "--strict",
        ]);
        let err = execute(strict, Config::default()).unwrap_err();
        assert!(matches!(
            err,
            CliError::Core(BoardError::UnknownDimension { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_core_io_error() {
        let cli = parse(&["stats", "-k", "proposals", "-f", "/nonexistent/p.json"]);
        let err = execute(cli, Config::default()).unwrap_err();
        assert!(matches!(err, CliError::Core(BoardError::Io(_))));
        assert_eq!(err_exit_code(&err), 1);
    }

    #[test]
    fn schema_report_lists_status_first() {
        let report = SchemaReport::of::<Proposal>();
        assert_eq!(report.kind, "proposals");
        assert_eq!(report.dimensions[0].name, "status");
        assert!(report.has_due_date);
        let owner = report.dimensions.iter().find(|d| d.name == "owner").unwrap();
        assert!(owner.legal.is_empty());
    }
}
