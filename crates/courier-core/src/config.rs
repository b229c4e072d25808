//! Scheduler configuration
//!
//! Tick rate and diagnostic switches for an [`EventScheduler`](crate::EventScheduler).
//! Configurations are plain serde structs so hosts can keep them in RON next
//! to their level data.

use crate::time::Clock;
use serde::{Deserialize, Serialize};

/// Smallest accepted tick interval, in seconds
pub const MIN_TICK_INTERVAL: f64 = 0.001;

/// Largest accepted tick interval, in seconds
pub const MAX_TICK_INTERVAL: f64 = 1.0;

/// Configuration for an event scheduler
///
/// # Example
///
/// ```
/// use courier_core::SchedulerConfig;
///
/// let config = SchedulerConfig::default();
/// assert_eq!(config.tick_interval(), 0.015);
///
/// // Out-of-range intervals are clamped
/// let config = SchedulerConfig::with_tick_interval(10.0);
/// assert_eq!(config.tick_interval(), courier_core::config::MAX_TICK_INTERVAL);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds per tick, clamped to `[MIN_TICK_INTERVAL, MAX_TICK_INTERVAL]`
    tick_interval: f64,
    /// Simulation time the clock starts at
    pub start_time: f64,
    /// Log every output firing at debug level
    pub trace_firings: bool,
    /// Log every input delivery at debug level
    pub trace_dispatch: bool,
    /// Start in single-step mode
    pub single_step: bool,
}

impl SchedulerConfig {
    /// Create a configuration with the given tick interval
    ///
    /// The interval is clamped to `[MIN_TICK_INTERVAL, MAX_TICK_INTERVAL]`.
    pub fn with_tick_interval(tick_interval: f64) -> Self {
        Self {
            tick_interval: clamp_interval(tick_interval),
            ..Self::default()
        }
    }

    /// Seconds per tick
    pub fn tick_interval(&self) -> f64 {
        clamp_interval(self.tick_interval)
    }

    /// Set the tick interval (clamped)
    pub fn set_tick_interval(&mut self, tick_interval: f64) {
        self.tick_interval = clamp_interval(tick_interval);
    }

    /// Build the clock described by this configuration
    pub fn clock(&self) -> Clock {
        let mut clock = Clock::with_tick_interval(self.tick_interval());
        clock.set_time(self.start_time);
        clock
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Clock::DEFAULT_TICK_INTERVAL,
            start_time: 0.0,
            trace_firings: true,
            trace_dispatch: true,
            single_step: false,
        }
    }
}

// A NaN interval would freeze the clock.
fn clamp_interval(tick_interval: f64) -> f64 {
    if tick_interval.is_nan() {
        Clock::DEFAULT_TICK_INTERVAL
    } else {
        tick_interval.clamp(MIN_TICK_INTERVAL, MAX_TICK_INTERVAL)
    }
}
