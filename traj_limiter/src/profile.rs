//! Synthetic position-command profiles for the simulation driver.
//!
//! A profile stands in for an upstream planner: given the cycle index it
//! returns the position command for that cycle. Sampling is pure and
//! allocation-free so it can run inside the cycle loop.

use core::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Position command as a function of cycle index.
///
/// # TOML Example
///
/// ```toml
/// [axes.profile]
/// kind = "step"
/// from = 0.0
/// to = 1.0
/// at_cycle = 10
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandProfile {
    /// Constant command.
    Hold { position: f64 },
    /// `from` before `at_cycle`, `to` from then on.
    Step { from: f64, to: f64, at_cycle: u64 },
    /// Linear move from `from` to `to` over `duration_cycles`, starting at
    /// `start_cycle`.
    Ramp {
        from: f64,
        to: f64,
        start_cycle: u64,
        duration_cycles: u64,
    },
    /// `center + amplitude · sin(2π·f·t)`.
    Sine {
        center: f64,
        amplitude: f64,
        frequency_hz: f64,
    },
    /// Alternates between `low` and `high` every `half_period_cycles`,
    /// starting low.
    Square {
        low: f64,
        high: f64,
        half_period_cycles: u64,
    },
}

impl CommandProfile {
    /// Command for `cycle` at the given period [s].
    #[inline]
    pub fn sample(&self, cycle: u64, period: f64) -> f64 {
        match *self {
            Self::Hold { position } => position,
            Self::Step { from, to, at_cycle } => {
                if cycle < at_cycle {
                    from
                } else {
                    to
                }
            }
            Self::Ramp {
                from,
                to,
                start_cycle,
                duration_cycles,
            } => {
                if cycle <= start_cycle {
                    from
                } else if cycle >= start_cycle + duration_cycles {
                    to
                } else {
                    let frac = (cycle - start_cycle) as f64 / duration_cycles as f64;
                    from + (to - from) * frac
                }
            }
            Self::Sine {
                center,
                amplitude,
                frequency_hz,
            } => {
                let t = cycle as f64 * period;
                center + amplitude * (2.0 * PI * frequency_hz * t).sin()
            }
            Self::Square {
                low,
                high,
                half_period_cycles,
            } => {
                if (cycle / half_period_cycles) % 2 == 0 {
                    low
                } else {
                    high
                }
            }
        }
    }

    /// Command at cycle 0, used as the axis starting point when no
    /// explicit initial position is given.
    pub fn initial(&self, period: f64) -> f64 {
        self.sample(0, period)
    }

    /// Check the profile parameters.
    pub fn validate(&self) -> Result<(), String> {
        let finite = |name: &str, v: f64| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(format!("{name} must be finite, got {v}"))
            }
        };
        match *self {
            Self::Hold { position } => finite("position", position),
            Self::Step { from, to, .. } => {
                finite("from", from)?;
                finite("to", to)
            }
            Self::Ramp {
                from,
                to,
                duration_cycles,
                ..
            } => {
                finite("from", from)?;
                finite("to", to)?;
                if duration_cycles == 0 {
                    return Err("ramp duration_cycles must be > 0".to_string());
                }
                Ok(())
            }
            Self::Sine {
                center,
                amplitude,
                frequency_hz,
            } => {
                finite("center", center)?;
                finite("amplitude", amplitude)?;
                if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
                    return Err(format!("frequency_hz must be > 0, got {frequency_hz}"));
                }
                Ok(())
            }
            Self::Square {
                low,
                high,
                half_period_cycles,
            } => {
                finite("low", low)?;
                finite("high", high)?;
                if half_period_cycles == 0 {
                    return Err("square half_period_cycles must be > 0".to_string());
                }
                Ok(())
            }
        }
    }
}

/// Half-open range of cycles `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CycleSpan {
    pub start: u64,
    pub end: u64,
}

impl CycleSpan {
    #[inline]
    pub fn contains(&self, cycle: u64) -> bool {
        cycle >= self.start && cycle < self.end
    }
}
