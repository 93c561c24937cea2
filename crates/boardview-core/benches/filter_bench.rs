//! Criterion benchmarks for the listing hot paths.
//!
//! Covers: composite filter compile + apply, aggregation, dropdown options,
//! and the full `build_view` pipeline over generated task boards.

use std::hint::black_box;

use chrono::{Days, NaiveDate, NaiveDateTime};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use boardview_core::aggregate::aggregate;
use boardview_core::derived::dimension_options;
use boardview_core::filter::filter;
use boardview_core::models::{Priority, Task, TaskStatus, TaskType};
use boardview_core::query::FilterState;
use boardview_core::view::build_view;

const SIZES: &[usize] = &[100, 1_000, 10_000];

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap()
}

/// Deterministic board: statuses, priorities and assignees cycle.
fn board(n: usize) -> Vec<Task> {
    let assignees = ["Dana", "Lee", "Morgan", "Priya"];
    (0..n)
        .map(|i| {
            let created_at = start();
            let due = created_at
                .date()
                .checked_add_days(Days::new((i % 365) as u64));
            Task {
                status: TaskStatus::ALL[i % TaskStatus::ALL.len()],
                priority: Priority::ALL[i % Priority::ALL.len()],
                task_type: TaskType::ALL[i % TaskType::ALL.len()],
                assignee: Some(assignees[i % assignees.len()].to_string()),
                lead_name: Some(format!("Lead {}", i % 50)),
                due_date: due,
                progress: (i % 101) as u8,
                ..Task::new(format!("t{i}"), format!("Site visit #{i} for Alpha"), created_at)
            }
        })
        .collect()
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let state = FilterState::new()
        .with_search("alpha")
        .with_selection("status", "todo")
        .with_selection("assignee", "Dana");
    let cleared = FilterState::new();

    for &size in SIZES {
        let records = board(size);
        group.bench_with_input(BenchmarkId::new("composite", size), &records, |b, r| {
            b.iter(|| filter(black_box(r.as_slice()), &state));
        });
        group.bench_with_input(BenchmarkId::new("cleared", size), &records, |b, r| {
            b.iter(|| filter(black_box(r.as_slice()), &cleared));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Aggregate and options
// ---------------------------------------------------------------------------

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    for &size in SIZES {
        let records = board(size);
        group.bench_with_input(BenchmarkId::new("tasks", size), &records, |b, r| {
            b.iter(|| aggregate(black_box(r.as_slice()), now()));
        });
        group.bench_with_input(BenchmarkId::new("options", size), &records, |b, r| {
            b.iter(|| dimension_options(black_box(r.as_slice())));
        });
    }
    group.finish();
}

fn bench_build_view(c: &mut Criterion) {
    let records = board(1_000);
    let state = FilterState::new()
        .with_search("site")
        .with_overdue_as_of(now());
    c.bench_function("build_view_1000", |b| {
        b.iter(|| build_view(black_box(records.as_slice()), &state, now()));
    });
}

criterion_group!(benches, bench_filter, bench_aggregate, bench_build_view);
criterion_main!(benches);
