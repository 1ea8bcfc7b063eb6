//! Rate color ladders.
//!
//! Each unit maps to one ladder. A ladder is an ascending list of
//! breakpoints plus one more tint than breakpoints; the tier of a value is
//! the index of the first breakpoint strictly greater than it, so values
//! beyond the top breakpoint land in the last tier.

use crate::catalog::Unit;
use crossterm::queue;
use crossterm::style::{Attribute, Color, SetAttribute, SetForegroundColor};
use std::io::{self, Write};

/// Foreground styles used for rates and documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    /// 256-color 236.
    DarkGrey,
    /// 256-color 250.
    LightGrey,
    /// 256-color 34.
    Green,
    /// 256-color 226.
    Yellow,
    /// 256-color 208.
    Orange,
    /// Bold yellow.
    Bold,
    /// 256-color 160.
    Red,
}

impl Tint {
    /// Queues the SGR sequence for this tint.
    pub fn queue<W: Write>(self, out: &mut W) -> io::Result<()> {
        let palette = |value| SetForegroundColor(Color::AnsiValue(value));
        match self {
            Tint::DarkGrey => queue!(out, palette(236)),
            Tint::LightGrey => queue!(out, palette(250)),
            Tint::Green => queue!(out, palette(34)),
            Tint::Yellow => queue!(out, palette(226)),
            Tint::Orange => queue!(out, palette(208)),
            Tint::Bold => queue!(
                out,
                SetAttribute(Attribute::Bold),
                SetForegroundColor(Color::DarkYellow)
            ),
            Tint::Red => queue!(out, palette(160)),
        }
    }
}

const FIVE_TINTS: [Tint; 5] = [Tint::DarkGrey, Tint::LightGrey, Tint::Green, Tint::Yellow, Tint::Bold];

/// Red means at least a terabyte per second.
const SEVEN_TINTS: [Tint; 7] = [
    Tint::DarkGrey,
    Tint::LightGrey,
    Tint::Green,
    Tint::Yellow,
    Tint::Orange,
    Tint::Bold,
    Tint::Red,
];

/// Fractions of the peak rate.
const PEAK_FRACTIONS: [f64; 4] = [0.05, 0.20, 0.80, 0.95];

const MIB: f64 = (1u64 << 20) as f64;

/// Bytes per second.
const BYTE_RATE_THRESHOLDS: [f64; 6] = [
    MIB,
    100.0 * MIB,
    1_000.0 * MIB,
    10_000.0 * MIB,
    100_000.0 * MIB,
    1_000_000.0 * MIB,
];

/// Seconds of accumulated time per second of wall clock.
const BUSY_FRACTIONS: [f64; 4] = [0.001, 0.01, 0.1, 1.0];

/// Index of the first breakpoint strictly greater than `value`.
fn upper_bound(breakpoints: &[f64], value: f64) -> usize {
    breakpoints.partition_point(|&b| b <= value)
}

/// Tier for count-like rates, relative to the peak seen before this tick.
#[must_use]
pub fn peak_relative_tier(rate: f64, peak: f64) -> usize {
    if peak == 0.0 {
        return 0;
    }
    upper_bound(&PEAK_FRACTIONS, rate / peak)
}

/// Tier for byte rates, on absolute MiB/s breakpoints.
#[must_use]
pub fn byte_rate_tier(rate: f64) -> usize {
    upper_bound(&BYTE_RATE_THRESHOLDS, rate)
}

/// Tier for time rates given in `units_per_second` (1e3 for ms, ...).
#[must_use]
pub fn duration_tier(rate: f64, units_per_second: f64) -> usize {
    let breakpoints = BUSY_FRACTIONS.map(|f| f * units_per_second);
    upper_bound(&breakpoints, rate)
}

/// Color ladder selected by unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ladder {
    /// Five tiers against fractions of the peak rate.
    PeakRelative,
    /// Seven tiers against fixed byte-rate breakpoints.
    ByteRate,
    /// Five tiers against fractions of a second per second.
    Duration {
        /// Native units in one second.
        units_per_second: f64,
    },
}

/// Ladder per unit, indexed by [`Unit::index`].
const LADDERS: [Ladder; Unit::ALL.len()] = [
    Ladder::PeakRelative,
    Ladder::ByteRate,
    Ladder::Duration { units_per_second: 1e9 },
    Ladder::Duration { units_per_second: 1e6 },
    Ladder::Duration { units_per_second: 1e3 },
];

impl Ladder {
    /// Ladder used for `unit`.
    #[must_use]
    pub fn for_unit(unit: Unit) -> Self {
        LADDERS[unit.index()]
    }

    /// Tier of `rate`. `peak` is only consulted by [`Ladder::PeakRelative`].
    #[must_use]
    pub fn tier(self, rate: f64, peak: f64) -> usize {
        match self {
            Ladder::PeakRelative => peak_relative_tier(rate, peak),
            Ladder::ByteRate => byte_rate_tier(rate),
            Ladder::Duration { units_per_second } => duration_tier(rate, units_per_second),
        }
    }

    /// Tint of `rate`.
    #[must_use]
    pub fn tint(self, rate: f64, peak: f64) -> Tint {
        let tier = self.tier(rate, peak);
        match self {
            Ladder::ByteRate => SEVEN_TINTS[tier],
            Ladder::PeakRelative | Ladder::Duration { .. } => FIVE_TINTS[tier],
        }
    }
}
