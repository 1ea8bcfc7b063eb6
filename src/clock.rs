//! Elapsed-time sources for the metric registry.
//!
//! All timestamps inside the table are seconds (as `f64`) since the clock
//! was last restarted. A restart happens on every registry reset.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Monotonic source of elapsed seconds.
pub trait Clock {
    /// Seconds elapsed since construction or the last [`Clock::restart`].
    fn elapsed_seconds(&self) -> f64;

    /// Restarts the clock at zero.
    fn restart(&mut self);
}

/// Wall-clock stopwatch backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Creates a stopwatch started now.
    #[must_use]
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for Stopwatch {
    fn elapsed_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn restart(&mut self) {
        self.start = Instant::now();
    }
}

/// Manually driven clock.
///
/// Clones share the same time, so a test can keep a handle and advance
/// the clock while the registry owns another one.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading `0.0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current reading.
    pub fn set(&self, seconds: f64) {
        self.bits.store(seconds.to_bits(), Ordering::SeqCst);
    }

    /// Moves the reading forward.
    pub fn advance(&self, seconds: f64) {
        self.set(self.elapsed_seconds() + seconds);
    }
}

impl Clock for ManualClock {
    fn elapsed_seconds(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }

    fn restart(&mut self) {
        self.set(0.0);
    }
}
