//! Time system for tick-based simulation
//!
//! Simulation time is measured in seconds and advances in fixed ticks:
//! - `Tick` - Logical time unit
//! - `Clock` - Current tick and time in seconds

use serde::{Deserialize, Serialize};

/// A discrete tick identifier (logical time unit)
pub type Tick = u64;

/// Simulation clock state
///
/// Time is derived from the tick count since the last [`Clock::set_time`],
/// so advancing never accumulates rounding error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    tick: Tick,
    time: f64,
    tick_interval: f64,
    /// Tick and time of the last jump
    origin_tick: Tick,
    origin_time: f64,
}

impl Clock {
    /// Default seconds per tick
    pub const DEFAULT_TICK_INTERVAL: f64 = 0.015;

    /// Create a clock at time zero with the default tick interval
    pub fn new() -> Self {
        Self::with_tick_interval(Self::DEFAULT_TICK_INTERVAL)
    }

    /// Create a clock at time zero advancing `tick_interval` seconds per tick
    pub fn with_tick_interval(tick_interval: f64) -> Self {
        Self {
            tick: 0,
            time: 0.0,
            tick_interval,
            origin_tick: 0,
            origin_time: 0.0,
        }
    }

    /// Advance to the next tick
    pub fn advance(&mut self) {
        self.tick += 1;
        self.time = self.origin_time + (self.tick - self.origin_tick) as f64 * self.tick_interval;
    }

    /// Ticks advanced since the clock started
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Seconds per tick
    pub fn tick_interval(&self) -> f64 {
        self.tick_interval
    }

    /// Change the tick interval from the current time onward
    pub fn set_tick_interval(&mut self, tick_interval: f64) {
        self.tick_interval = tick_interval;
        self.rebase();
    }

    /// Current simulation time in seconds
    pub fn now(&self) -> f64 {
        self.time
    }

    /// Jump to an absolute time (level load, debugging, tests)
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
        self.rebase();
    }

    /// Seconds from now until `time` (negative if already past)
    pub fn until(&self, time: f64) -> f64 {
        time - self.time
    }

    fn rebase(&mut self) {
        self.origin_tick = self.tick;
        self.origin_time = self.time;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
