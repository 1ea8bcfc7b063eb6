//! Falsifiable claims about the progress table.
//!
//! Each test states one claim about observable behavior and fails with a
//! "FALSIFIED" message if the claim does not hold.
//!
//! Run: cargo test --test progress_table_test

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use approx::assert_relative_eq;
use progress_table::prelude::*;
use progress_table::render::ladder::peak_relative_tier;
use progress_table::series::{MetricSeries, Snapshot};
use std::sync::Arc;
use std::thread;

fn table(width: usize) -> (ProgressTable<FixedWidth, ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let table = ProgressTable::with_parts(
        Arc::new(Catalog::builtin()),
        Layout::default(),
        FixedWidth(width),
        clock.clone(),
    );
    (table, clock)
}

fn row(name: &str, host: &str, value: i64) -> EventRecord {
    EventRecord::aggregate(name, host, value, ValueKind::Cumulative)
}

fn live(table: &ProgressTable<FixedWidth, ManualClock>) -> (RenderOutcome, String) {
    let mut out = Vec::new();
    let outcome = table.write_table(&mut out, LiveMode::Table).unwrap();
    (outcome, String::from_utf8(out).unwrap())
}

// ============================================================================
// SERIES CLAIMS
// ============================================================================

/// Claim 1: reading value and rate twice without a new sample gives the
/// same answers.
#[test]
fn claim_01_snapshot_reads_are_idempotent() {
    let mut series = MetricSeries::new(ValueKind::Cumulative);
    series.apply(40, 1.0);
    series.apply(2, 1.2);

    assert_eq!(series.value(), series.value(), "Claim 1 FALSIFIED: value changed on read");
    assert_eq!(series.rate(1.3), series.rate(1.3), "Claim 1 FALSIFIED: rate changed on read");
}

/// Claim 2: after an idle gap the window restarts one second back, at the
/// last known value.
#[test]
fn claim_02_rebase_after_idle() {
    let mut series = MetricSeries::new(ValueKind::Cumulative);
    series.apply(10, 0.0);
    series.apply(5, 10.0);

    assert_eq!(series.previous(), Snapshot::new(10, 9.0), "Claim 2 FALSIFIED: window start");
    assert_eq!(series.current(), Snapshot::new(15, 10.0), "Claim 2 FALSIFIED: window end");
    assert_relative_eq!(series.rate(10.0), 5.0, epsilon = 1e-9);
}

/// Claim 3: the rate is the value change across the window divided by
/// its width.
#[test]
fn claim_03_windowed_rate() {
    let mut gauge = MetricSeries::new(ValueKind::Gauge);
    gauge.apply(100, 0.0);
    gauge.apply(150, 1.0);
    assert_relative_eq!(gauge.rate(1.0), 50.0, epsilon = 1e-9);

    // Cumulative samples are deltas: 150 more over one second.
    let mut counter = MetricSeries::new(ValueKind::Cumulative);
    counter.apply(100, 0.0);
    counter.apply(150, 1.0);
    assert_relative_eq!(counter.rate(1.0), 150.0, epsilon = 1e-9);
}

/// Claim 4: samples closer together than half a second do not move the
/// rate window.
#[test]
fn claim_04_close_samples_do_not_rotate_window() {
    let mut series = MetricSeries::new(ValueKind::Cumulative);
    series.apply(100, 1.0);
    let window = (series.previous(), series.current());

    series.apply(1, 1.1);
    series.apply(1, 1.2);

    assert_eq!((series.previous(), series.current()), window, "Claim 4 FALSIFIED");
    assert_eq!(series.value(), 102);
}

/// Claim 5: a gauge sample replaces the stored value.
#[test]
fn claim_05_gauge_replaces() {
    let mut series = MetricSeries::new(ValueKind::Gauge);
    series.apply(10, 0.0);
    series.apply(3, 1.0);
    assert_eq!(series.value(), 3, "Claim 5 FALSIFIED: gauge accumulated");
}

/// Claim 6: freshness lasts exactly three seconds, inclusive.
#[test]
fn claim_06_freshness_boundary() {
    let mut series = MetricSeries::new(ValueKind::Cumulative);
    series.apply(1, 5.0);

    assert!(series.is_fresh(8.0), "Claim 6 FALSIFIED: stale at the boundary");
    assert!(!series.is_fresh(8.01), "Claim 6 FALSIFIED: fresh past the boundary");
}

/// Claim 7: no rate is reported half a second after the last sample.
#[test]
fn claim_07_rate_drops_to_zero_when_idle() {
    let mut series = MetricSeries::new(ValueKind::Cumulative);
    series.apply(100, 1.0);
    assert!(series.rate(1.4) > 0.0);
    assert_eq!(series.rate(1.5), 0.0, "Claim 7 FALSIFIED");
}

// ============================================================================
// REGISTRY CLAIMS
// ============================================================================

/// Claim 8: zero-valued rows never create a metric.
#[test]
fn claim_08_zero_suppression() {
    let (table, _clock) = table(120);
    let stats = table.update_progress(&[row("Query", "h", 0), row("Query", "g", 0)]);

    assert_eq!(stats.zero_value, 2);
    assert!(table.is_empty(), "Claim 8 FALSIFIED: zero row created an entry");
}

/// Claim 9: per-thread rows and unknown names are ignored.
#[test]
fn claim_09_only_known_aggregate_rows() {
    let (table, _clock) = table(120);
    let mut thread_row = row("Query", "h", 5);
    thread_row.scope_id = 12;

    let stats = table.update_progress(&[thread_row, row("NoSuchEvent", "h", 5)]);

    assert_eq!(stats, IngestStats { accepted: 0, foreign_scope: 1, zero_value: 0, unknown_name: 1 });
    assert!(table.is_empty());
}

/// Claim 10: the most recently updated metric is listed first.
#[test]
fn claim_10_recency_ordering() {
    let (table, clock) = table(120);
    table.update_progress(&[row("SelectedRows", "h", 1)]);
    clock.advance(0.1);
    table.update_progress(&[row("SelectedBytes", "h", 1)]);
    clock.advance(0.1);
    table.update_progress(&[row("SelectedRows", "h", 1)]);

    let names: Vec<_> = table.summary().into_iter().map(|r| r.name).collect();
    assert_eq!(names, ["SelectedRows", "SelectedBytes"], "Claim 10 FALSIFIED");
}

/// Claim 11: values of one metric from several hosts are summed.
#[test]
fn claim_11_hosts_are_summed() {
    let (table, _clock) = table(120);
    table.update_progress(&[row("Query", "a", 2), row("Query", "b", 3), row("Query", "a", 4)]);

    let summary = table.summary();
    assert_eq!(summary.len(), 1);
    assert_relative_eq!(summary[0].value, 9.0);
}

/// Claim 12: the final summary lists every metric, stale or not.
#[test]
fn claim_12_final_summary_completeness() {
    let (table, clock) = table(120);
    clock.set(1.0);
    table.update_progress(&[row("Query", "h", 1)]);
    clock.set(50.0);
    table.update_progress(&[row("Seek", "h", 7)]);

    assert_eq!(table.fresh_count(), 1);
    let mut out = Vec::new();
    table.write_final_table(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("Query"), "Claim 12 FALSIFIED: stale metric missing");
    assert!(text.contains("Seek"));
}

/// Claim 13: a reset forgets every metric and restarts the clock.
#[test]
fn claim_13_reset() {
    let (table, clock) = table(120);
    clock.set(30.0);
    table.update_progress(&[row("Query", "h", 1)]);

    table.reset_table();

    assert!(table.is_empty());
    assert_eq!(clock.elapsed_seconds(), 0.0, "Claim 13 FALSIFIED: clock not restarted");
}

// ============================================================================
// RENDERING CLAIMS
// ============================================================================

/// Claim 14: with no peak yet, the count ladder picks the bottom tier;
/// otherwise tiers never decrease as the rate grows.
#[test]
fn claim_14_color_monotonicity() {
    assert_eq!(peak_relative_tier(1e9, 0.0), 0, "Claim 14 FALSIFIED: zero peak");

    let mut last = 0;
    for step in 0..=200 {
        let tier = peak_relative_tier(f64::from(step) * 0.01, 1.0);
        assert!(tier >= last, "Claim 14 FALSIFIED at fraction {}", f64::from(step) * 0.01);
        last = tier;
    }
    assert_eq!(last, 4);
}

/// Claim 15: one column too narrow means no output at all.
#[test]
fn claim_15_width_gating() {
    let required = Layout::default().live_min_width(20);
    let (table, clock) = table(required - 1);
    clock.set(1.0);
    table.update_progress(&[row("Query", "h", 1)]);

    let (outcome, text) = live(&table);
    assert!(matches!(outcome, RenderOutcome::TooNarrow { .. }));
    assert!(text.is_empty(), "Claim 15 FALSIFIED: {} bytes written", text.len());
}

/// Claim 16: an empty table draws nothing.
#[test]
fn claim_16_empty_table_draws_nothing() {
    let (table, _clock) = table(120);
    let (outcome, text) = live(&table);
    assert_eq!(outcome, RenderOutcome::Empty);
    assert!(text.is_empty());
}

/// Claim 17: the live view rewinds exactly over what it drew.
#[test]
fn claim_17_cursor_rewinds_rows_plus_header() {
    let (table, clock) = table(120);
    clock.set(1.0);
    table.update_progress(&[row("Query", "h", 1), row("Seek", "h", 1), row("FileOpen", "h", 1)]);

    let (outcome, text) = live(&table);
    assert_eq!(outcome, RenderOutcome::Drawn { rows: 3 });
    assert!(text.ends_with("\x1b[4A"), "Claim 17 FALSIFIED: {text:?}");
}

/// Claim 18: stale metrics are hidden from the live view.
#[test]
fn claim_18_stale_rows_hidden() {
    let (table, clock) = table(120);
    clock.set(1.0);
    table.update_progress(&[row("Query", "h", 1)]);
    clock.set(2.0);
    table.update_progress(&[row("Seek", "h", 1)]);
    clock.set(4.5);

    let (outcome, text) = live(&table);
    assert_eq!(outcome, RenderOutcome::Drawn { rows: 1 });
    assert!(text.contains("Seek"));
    assert!(!text.contains("Query"), "Claim 18 FALSIFIED: stale row drawn");
}

/// Claim 19: a row is colored against the peak from before its own tick.
#[test]
fn claim_19_peak_read_before_update() {
    let (table, clock) = table(120);
    clock.set(1.0);
    table.update_progress(&[row("Query", "h", 500)]);

    // First tick: no earlier peak, bottom tier even though the rate is
    // the highest ever seen.
    let (_, first) = live(&table);
    assert!(!first.contains("\x1b[1m"), "Claim 19 FALSIFIED: first tick drawn bold");

    // Second tick: same rate, now equal to the stored peak.
    let (_, second) = live(&table);
    assert!(second.contains("\x1b[1m"), "Claim 19 FALSIFIED: second tick not bold");
}

/// Claim 20: the final summary carries no control sequences.
#[test]
fn claim_20_final_table_is_plain() {
    let (table, clock) = table(120);
    clock.set(1.0);
    table.update_progress(&[row("NetworkReceiveBytes", "h", 2_500_000)]);

    let mut out = Vec::new();
    table.write_final_table(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(!text.contains('\x1b'), "Claim 20 FALSIFIED");
    assert!(text.contains("2.50 MB"));
}

/// Claim 21: hidden mode shows the hint, and clearing restores the cursor.
#[test]
fn claim_21_hint_and_clear() {
    let (table, _clock) = table(120);

    let mut out = Vec::new();
    assert_eq!(table.write_table(&mut out, LiveMode::Hidden).unwrap(), RenderOutcome::Hint);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Press the space key to toggle the display of the progress table."));

    let mut out = Vec::new();
    table.clear_table_output(&mut out).unwrap();
    assert!(String::from_utf8(out).unwrap().ends_with("\x1b[?25h"));
}

/// Claim 23: no live line is wider than the terminal, whatever the name
/// length or the size of the numbers.
#[test]
fn claim_23_rows_fit_terminal_width() {
    for width in [100, 120, 160] {
        let (table, clock) = table(width);
        clock.set(1.0);
        table.update_progress(&[
            row("ThreadPoolReaderPageCacheHitElapsedMicroseconds", "h", 1_000_000),
            row("SelectedRows", "h", i64::MAX),
        ]);

        let (_, text) = live(&table);
        for line in text.split('\n') {
            let visible = strip_escapes(line).chars().count();
            assert!(visible <= width, "Claim 23 FALSIFIED: {visible} columns at width {width}");
        }
    }
}

/// Claim 24: a gauge swinging across the whole `i64` range gives a finite
/// positive rate.
#[test]
fn claim_24_extreme_gauge_values() {
    let mut series = MetricSeries::new(ValueKind::Gauge);
    series.apply(i64::MIN, 0.0);
    series.apply(i64::MAX, 1.0);

    let rate = series.rate(1.0);
    assert!(rate.is_finite() && rate > 0.0, "Claim 24 FALSIFIED: rate {rate}");
    assert_relative_eq!(rate, 2.0 * 2f64.powi(63), max_relative = 1e-9);
    assert_eq!(series.value(), i64::MAX);
}

fn strip_escapes(line: &str) -> String {
    let mut visible = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            chars.by_ref().find(char::is_ascii_alphabetic);
        } else {
            visible.push(c);
        }
    }
    visible
}

// ============================================================================
// CONCURRENCY CLAIMS
// ============================================================================

/// Claim 22: a render never observes half of a batch.
#[test]
fn claim_22_batches_are_atomic() {
    let (table, clock) = table(200);
    clock.set(1.0);
    let table = Arc::new(table);

    let writer = {
        let table = Arc::clone(&table);
        thread::spawn(move || {
            for _ in 0..500 {
                table.update_progress(&[row("InsertedRows", "h", 1), row("SelectedRows", "h", 1)]);
            }
        })
    };

    for _ in 0..200 {
        let summary = table.summary();
        let value = |name: &str| summary.iter().find(|r| r.name == name).map(|r| r.value);
        assert_eq!(
            value("InsertedRows"),
            value("SelectedRows"),
            "Claim 22 FALSIFIED: torn batch observed"
        );
    }
    writer.join().unwrap();
    assert_eq!(table.summary().len(), 2);
}
