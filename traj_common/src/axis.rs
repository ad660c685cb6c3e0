//! Per-axis kinematic limits.
//!
//! [`AxisLimits`] is the configuration half of a limited axis: velocity and
//! acceleration caps, optional position bounds and the overshoot policy.
//! The limiter itself performs no checks at runtime, so every precondition
//! it relies on is enforced here by [`AxisLimits::validate`] at startup.
//!
//! # TOML Example
//!
//! ```toml
//! max_vel = 10.0
//! max_acc = 100.0
//! min_pos = -0.5       # optional, default -inf
//! max_pos = 0.5        # optional, default +inf
//! disallow_backoff = false
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Velocity/acceleration limits and position bounds for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisLimits {
    /// Maximum speed [units/s]. Must be finite and > 0.
    pub max_vel: f64,
    /// Maximum acceleration [units/s²]. Must be finite and > 0.
    pub max_acc: f64,
    /// Lower position bound [units]. `-inf` disables it.
    #[serde(default = "default_min_pos")]
    pub min_pos: f64,
    /// Upper position bound [units]. `+inf` disables it.
    #[serde(default = "default_max_pos")]
    pub max_pos: f64,
    /// Brake in place instead of backing off when overshooting the command.
    #[serde(default)]
    pub disallow_backoff: bool,
}

fn default_min_pos() -> f64 {
    f64::NEG_INFINITY
}
fn default_max_pos() -> f64 {
    f64::INFINITY
}

impl AxisLimits {
    /// Limits with no position bounds.
    pub const fn unbounded(max_vel: f64, max_acc: f64) -> Self {
        Self {
            max_vel,
            max_acc,
            min_pos: f64::NEG_INFINITY,
            max_pos: f64::INFINITY,
            disallow_backoff: false,
        }
    }

    /// Same limits with the given position bounds.
    pub const fn with_bounds(mut self, min_pos: f64, max_pos: f64) -> Self {
        self.min_pos = min_pos;
        self.max_pos = max_pos;
        self
    }

    /// True when at least one position bound is finite.
    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.min_pos.is_finite() || self.max_pos.is_finite()
    }

    /// Whether `position` lies within the bounds (inclusive).
    #[inline]
    pub fn contains(&self, position: f64) -> bool {
        position >= self.min_pos && position <= self.max_pos
    }

    /// Validate the limiter preconditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_vel.is_finite() || self.max_vel <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "max_vel must be finite and > 0, got {}",
                self.max_vel
            )));
        }
        if !self.max_acc.is_finite() || self.max_acc <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "max_acc must be finite and > 0, got {}",
                self.max_acc
            )));
        }
        if self.min_pos.is_nan() || self.max_pos.is_nan() {
            return Err(ConfigError::ValidationError(
                "position bounds must not be NaN".to_string(),
            ));
        }
        if self.min_pos > self.max_pos {
            return Err(ConfigError::ValidationError(format!(
                "min_pos {} greater than max_pos {}",
                self.min_pos, self.max_pos
            )));
        }
        Ok(())
    }
}
