//! Human-readable number formatting.
//!
//! Values are scaled to the largest unit that keeps the mantissa below
//! 1000 and printed with two decimals.

use crate::catalog::Unit;

const QUANTITY_UNITS: [&str; 6] = ["", " thousand", " million", " billion", " trillion", " quadrillion"];
const SIZE_UNITS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

/// Scales `value` by 1000 until it fits, returning the mantissa and the
/// unit index.
fn scale_by_thousands(value: f64, unit_count: usize) -> (f64, usize) {
    let mut scaled = value;
    let mut index = 0;
    while scaled.abs() >= 1000.0 && index + 1 < unit_count {
        scaled /= 1000.0;
        index += 1;
    }
    (scaled, index)
}

/// Formats a plain count, e.g. `1.50 million`.
#[must_use]
pub fn format_quantity(value: f64, precision: usize) -> String {
    let (scaled, index) = scale_by_thousands(value, QUANTITY_UNITS.len());
    format!("{scaled:.precision$}{}", QUANTITY_UNITS[index])
}

/// Formats a byte count with decimal suffixes, e.g. `12.30 MB`.
#[must_use]
pub fn format_size_decimal(bytes: f64) -> String {
    let (scaled, index) = scale_by_thousands(bytes, SIZE_UNITS.len());
    format!("{scaled:.2} {}", SIZE_UNITS[index])
}

/// Formats a duration given in nanoseconds, e.g. `3.25 ms`.
#[must_use]
pub fn format_time(ns: f64) -> String {
    let magnitude = ns.abs();
    if magnitude < 1e3 {
        format!("{ns:.2} ns")
    } else if magnitude < 1e6 {
        format!("{:.2} us", ns / 1e3)
    } else if magnitude < 1e9 {
        format!("{:.2} ms", ns / 1e6)
    } else {
        format!("{:.2} s", ns / 1e9)
    }
}

fn format_number(value: f64) -> String {
    // Small whole counts read better without decimals.
    let precision = if value.floor() == value && value.abs() < 1000.0 { 0 } else { 2 };
    format_quantity(value, precision)
}

fn format_nanoseconds(value: f64) -> String {
    format_time(value)
}

fn format_microseconds(value: f64) -> String {
    format_time(value * 1e3)
}

fn format_milliseconds(value: f64) -> String {
    format_time(value * 1e6)
}

/// Formatter per unit, indexed by [`Unit::index`].
const FORMATTERS: [fn(f64) -> String; Unit::ALL.len()] = [
    format_number,
    format_size_decimal,
    format_nanoseconds,
    format_microseconds,
    format_milliseconds,
];

/// Formats a value in its unit.
#[must_use]
pub fn format_value(unit: Unit, value: f64) -> String {
    FORMATTERS[unit.index()](value)
}
