//! System-wide constants for the trajectory limiter workspace.
//!
//! Single source of truth for numeric limits and defaults.

use static_assertions::const_assert;

/// Maximum number of independently limited axes in one bank.
pub const MAX_AXES: usize = 16;

/// Default cycle time in microseconds (1 kHz = 1000 µs).
pub const CYCLE_TIME_US: u32 = 1000;

/// Shortest accepted cycle time [µs].
pub const CYCLE_TIME_US_MIN: u32 = 50;

/// Longest accepted cycle time [µs].
pub const CYCLE_TIME_US_MAX: u32 = 100_000;

/// Default number of cycles for a simulation run.
pub const DEFAULT_CYCLES: u64 = 5_000;

/// Settle threshold as a fraction of `max_acc · period²`.
///
/// An axis is settled once its position error is below
/// `max_acc · period² · SETTLE_FRACTION`.
pub const SETTLE_FRACTION: f64 = 1e-3;

/// Default configuration file path for the simulation driver.
pub const DEFAULT_CONFIG_PATH: &str = "config/limiter.toml";

const_assert!(MAX_AXES > 0 && MAX_AXES <= 64);
const_assert!(CYCLE_TIME_US_MIN <= CYCLE_TIME_US && CYCLE_TIME_US <= CYCLE_TIME_US_MAX);
