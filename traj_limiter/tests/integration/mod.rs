mod backoff;
mod config_loading;
mod runner;
mod step_response;

use traj_common::axis::AxisLimits;
use traj_limiter::limiter::{Branch, TrajectoryState, update};

/// 1 kHz.
pub const DT: f64 = 0.001;

/// Reference axis: 10 units/s, 100 units/s².
pub fn reference_limits() -> AxisLimits {
    AxisLimits::unbounded(10.0, 100.0)
}

/// Enabled axis at rest at `position`.
pub fn enabled_axis(limits: &AxisLimits, position: f64) -> TrajectoryState {
    let mut state = TrajectoryState::new(limits);
    state.reset_to(position);
    state.enabled = true;
    state
}

/// One cycle of the trace recorded by [`run_trace`].
#[derive(Debug, Clone, Copy)]
pub struct TracePoint {
    pub pos: f64,
    pub vel: f64,
    pub active: bool,
    pub branch: Branch,
}

/// Run `cycles` updates, taking the command for each cycle from `command`.
pub fn run_trace(
    state: &mut TrajectoryState,
    cycles: usize,
    mut command: impl FnMut(usize) -> f64,
) -> Vec<TracePoint> {
    (0..cycles)
        .map(|k| {
            state.pos_cmd = command(k);
            let branch = update(state, DT);
            TracePoint {
                pos: state.curr_pos,
                vel: state.curr_vel,
                active: state.active,
                branch,
            }
        })
        .collect()
}
