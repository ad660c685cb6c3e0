//! Simulation driver configuration: TOML loading and validation.
//!
//! One file describes the cycle time, the run length and up to
//! [`MAX_AXES`] independent axes, each with its limits, starting position,
//! command profile and an optional disabled window. Everything the limiter
//! assumes as a precondition is checked here, before the first cycle.
//!
//! # TOML Example
//!
//! ```toml
//! cycle_time_us = 1000
//! cycles = 3000
//!
//! [shared]
//! service_name = "limiter-sim"
//!
//! [[axes]]
//! name = "x"
//! initial_position = 0.0
//! disabled = { start = 1500, end = 1600 }
//!
//! [axes.limits]
//! max_vel = 10.0
//! max_acc = 100.0
//! max_pos = 0.5
//!
//! [axes.profile]
//! kind = "step"
//! from = 0.0
//! to = 1.0
//! at_cycle = 0
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use traj_common::axis::AxisLimits;
use traj_common::config::{ConfigError, ConfigLoader, SharedConfig};
use traj_common::consts::{
    CYCLE_TIME_US, CYCLE_TIME_US_MAX, CYCLE_TIME_US_MIN, DEFAULT_CYCLES, MAX_AXES,
};

use crate::profile::{CommandProfile, CycleSpan};

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    pub shared: SharedConfig,

    /// Control period in microseconds (default: 1000).
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,

    /// Number of cycles to run (default: 5000).
    #[serde(default = "default_cycles")]
    pub cycles: u64,

    /// Independently limited axes.
    pub axes: Vec<AxisSimConfig>,
}

/// One axis in the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisSimConfig {
    /// Unique axis name.
    pub name: String,
    pub limits: AxisLimits,
    /// Starting position (default: the profile's command at cycle 0).
    #[serde(default)]
    pub initial_position: Option<f64>,
    pub profile: CommandProfile,
    /// Cycles during which the axis is disabled.
    #[serde(default)]
    pub disabled: Option<CycleSpan>,
}

fn default_cycle_time_us() -> u32 {
    CYCLE_TIME_US
}
fn default_cycles() -> u64 {
    DEFAULT_CYCLES
}

impl SimConfig {
    /// Control period in seconds.
    #[inline]
    pub fn period(&self) -> f64 {
        self.cycle_time_us as f64 * 1e-6
    }

    /// Control period as a [`Duration`].
    pub fn cycle_time(&self) -> Duration {
        Duration::from_micros(self.cycle_time_us as u64)
    }

    /// Validate every field the limiter relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.cycle_time_us < CYCLE_TIME_US_MIN || self.cycle_time_us > CYCLE_TIME_US_MAX {
            return Err(invalid(format!(
                "cycle_time_us {} out of range [{}, {}]",
                self.cycle_time_us, CYCLE_TIME_US_MIN, CYCLE_TIME_US_MAX
            )));
        }
        if self.cycles == 0 {
            return Err(invalid("cycles must be > 0".to_string()));
        }
        if self.axes.is_empty() || self.axes.len() > MAX_AXES {
            return Err(invalid(format!(
                "axis count {} out of range [1, {}]",
                self.axes.len(),
                MAX_AXES
            )));
        }

        let mut seen = HashSet::new();
        for axis in &self.axes {
            if axis.name.trim().is_empty() {
                return Err(invalid("axis name cannot be empty".to_string()));
            }
            if !seen.insert(axis.name.as_str()) {
                return Err(invalid(format!("duplicate axis name '{}'", axis.name)));
            }
            axis.validate(self.period())?;
        }
        Ok(())
    }
}

impl AxisSimConfig {
    /// Starting position: explicit, or the profile's first command.
    pub fn start_position(&self, period: f64) -> f64 {
        self.initial_position
            .unwrap_or_else(|| self.profile.initial(period))
    }

    fn validate(&self, period: f64) -> Result<(), ConfigError> {
        let ctx = |msg: String| invalid(format!("axis '{}': {msg}", self.name));

        self.limits.validate().map_err(|e| match e {
            ConfigError::ValidationError(msg) => ctx(msg),
            other => other,
        })?;
        self.profile.validate().map_err(ctx)?;

        let start = self.start_position(period);
        if !start.is_finite() || !self.limits.contains(start) {
            return Err(ctx(format!(
                "initial position {start} outside bounds [{}, {}]",
                self.limits.min_pos, self.limits.max_pos
            )));
        }
        if let Some(span) = self.disabled {
            if span.start >= span.end {
                return Err(ctx(format!(
                    "disabled span start {} must be before end {}",
                    span.start, span.end
                )));
            }
        }
        Ok(())
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::ValidationError(msg)
}

/// Load and validate a simulation config file.
pub fn load_config(path: &Path) -> Result<SimConfig, ConfigError> {
    let config = SimConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a simulation config from TOML text.
pub fn load_config_from_str(content: &str) -> Result<SimConfig, ConfigError> {
    let config = SimConfig::from_toml_str(content)?;
    config.validate()?;
    Ok(config)
}
