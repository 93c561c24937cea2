//! Shared proptest strategies for the engine suites.
//!
//! Generated boards draw titles, assignees and dates from small pools so
//! searches and selections hit a useful fraction of records.

#![allow(dead_code)]

use boardview_core::models::{Priority, Task, TaskStatus, TaskType};
use boardview_core::query::{FilterState, Selection};
use chrono::{Days, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use proptest::sample::select;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Shared proptest configuration: 256 cases, generous shrink budget.
#[must_use]
pub fn proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        max_shrink_iters: 5000,
        ..ProptestConfig::default()
    }
}

// ─── Leaf strategies ─────────────────────────────────────────────────────────

const TITLES: &[&str] = &[
    "Alpha Corp kickoff",
    "Beta site walk",
    "alpha roof quote",
    "Gamma permit",
    "Delta Corp invoice",
    "",
];

const ASSIGNEES: &[&str] = &["Dana", "Lee", "Morgan"];

const SEARCHES: &[&str] = &["", "alpha", "CORP", "site", "zzz"];

/// First day of the generated calendar.
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// A date within roughly a year of [`epoch`].
pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..400).prop_map(|offset| epoch().checked_add_days(Days::new(offset)).unwrap())
}

/// An instant within the generated calendar, at a whole hour.
pub fn arb_instant() -> impl Strategy<Value = NaiveDateTime> {
    (arb_date(), 0u32..24).prop_map(|(date, hour)| date.and_hms_opt(hour, 0, 0).unwrap())
}

pub fn arb_status() -> impl Strategy<Value = TaskStatus> {
    select(TaskStatus::ALL)
}

// ─── Composite strategies ────────────────────────────────────────────────────

/// A task board of up to `max` tasks with unique ids `t0..`.
pub fn arb_board(max: usize) -> impl Strategy<Value = Vec<Task>> {
    let task = (
        select(TITLES),
        arb_status(),
        select(Priority::ALL),
        select(TaskType::ALL),
        proptest::option::of(select(ASSIGNEES)),
        proptest::option::of(arb_date()),
        0u8..=100,
    );
    proptest::collection::vec(task, 0..=max).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(
                |(i, (title, status, priority, task_type, assignee, due_date, progress))| Task {
                    status,
                    priority,
                    task_type,
                    assignee: assignee.map(str::to_string),
                    due_date,
                    progress,
                    ..Task::new(format!("t{i}"), title, epoch().and_hms_opt(9, 0, 0).unwrap())
                },
            )
            .collect()
    })
}

/// A selection for `dimension` drawn from a mix of `all`, legal and unknown
/// values.
pub fn arb_selection(dimension: &'static str) -> impl Strategy<Value = (String, Selection)> {
    let values: &'static [&'static str] = match dimension {
        "status" => &["all", "todo", "in_progress", "completed", "cancelled", "done"],
        "priority" => &["all", "low", "high", "urgent"],
        "assignee" => &["all", "Dana", "Lee", "nobody"],
        _ => &["all", "call", "meeting"],
    };
    select(values).prop_map(move |value| (dimension.to_string(), Selection::from(value)))
}

/// Search text, status, priority and assignee selections, in that order.
pub fn arb_filter_state() -> impl Strategy<Value = FilterState> {
    (
        select(SEARCHES),
        arb_selection("status"),
        arb_selection("priority"),
        arb_selection("assignee"),
        proptest::option::of(arb_instant()),
    )
        .prop_map(|(search, status, priority, assignee, overdue_as_of)| {
            let mut state = FilterState::new().with_search(search);
            for (dimension, selection) in [status, priority, assignee] {
                state = state.with_selection(dimension, selection);
            }
            state.overdue_as_of = overdue_as_of;
            state
        })
}

/// Ids of a filter result, in output order.
pub fn ids(records: &[&Task]) -> Vec<String> {
    records.iter().map(|t| t.id.clone()).collect()
}
