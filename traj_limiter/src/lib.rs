//! # Trajectory Limiter
//!
//! Per-cycle velocity, acceleration and position limiting for independent
//! axes. Each call to [`limiter::update`] turns the raw position command of
//! one axis into the next position and velocity such that the axis never
//! exceeds its velocity or acceleration limit and never leaves its position
//! bounds, converging on the command in near minimum time.
//!
//! ## Layers
//!
//! 1. **Core** ([`limiter`]) - one axis, one cycle, no allocation, no I/O.
//! 2. **Bank** ([`axis`]) - up to `MAX_AXES` named axes with counters.
//! 3. **Driver** ([`profile`], [`config`], [`cycle`], [`sample`]) -
//!    synthetic commands from TOML, the cycle loop and sample output.
//!
//! ```rust
//! use traj_common::axis::AxisLimits;
//! use traj_limiter::limiter::{TrajectoryState, update};
//!
//! let mut state = TrajectoryState::new(&AxisLimits::unbounded(10.0, 100.0));
//! state.enabled = true;
//! state.pos_cmd = 1.0;
//! update(&mut state, 0.001);
//! assert!((state.curr_vel - 0.1).abs() < 1e-9);
//! ```

pub mod axis;
pub mod config;
pub mod cycle;
pub mod limiter;
pub mod profile;
pub mod sample;
