//! Single-axis trajectory limiter.
//!
//! Once per control period the limiter takes a position command and
//! produces a followed position/velocity that respects `max_vel`, `max_acc`
//! and (optionally) absolute position bounds. Each cycle is a closed-form
//! decision ladder: O(1), no loops, no allocation, no I/O.
//!
//! The work is split in two:
//! - [`decide`] evaluates the ladder against the current state and returns
//!   a [`Decision`] without touching the state.
//! - [`TrajectoryState::commit`] applies a decision and runs the settle test.
//!
//! [`update`] chains both and is what a cycle loop calls.
//!
//! ## Ladder (first match wins)
//!
//! 1. Bound-overshoot braking (stop projection crosses a bound, parking not
//!    reachable).
//! 2. Bound-seeking (command headed beyond a bound): park or head there.
//! 3. Direct tracking (`(pos_cmd, in_vel)` inside the window).
//! 4. Convergence, honouring `disallow_backoff` when overshoot is predicted.
//!
//! ## Windows
//!
//! The kinematic window is every velocity reachable from `prev_out_vel`
//! within one period under `max_acc`, clamped to `±max_vel`. The stoppable
//! window narrows it so the axis can always come to rest inside finite
//! bounds; corners and tracking use the stoppable window, parking checks
//! use the kinematic one.

use serde::Serialize;
use traj_common::axis::AxisLimits;
use traj_common::consts::SETTLE_FRACTION;

// ─── State ──────────────────────────────────────────────────────────

/// Per-axis limiter state, owned by the caller and mutated by [`update`].
///
/// Caller writes `enabled` and `pos_cmd` every cycle, limits at
/// configuration time, and reads `curr_pos`, `curr_vel`, `active` after.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryState {
    /// When false the output holds `curr_pos` with zero velocity.
    pub enabled: bool,
    /// Desired position this cycle.
    pub pos_cmd: f64,
    /// Followed position after the last update.
    pub curr_pos: f64,
    /// Followed velocity after the last update.
    pub curr_vel: f64,
    /// True while still converging on `pos_cmd`.
    pub active: bool,
    /// Velocity limit [units/s].
    pub max_vel: f64,
    /// Acceleration limit [units/s²], must be > 0.
    pub max_acc: f64,
    /// Lower position bound, `-inf` when unbounded.
    pub min_pos: f64,
    /// Upper position bound, `+inf` when unbounded.
    pub max_pos: f64,
    /// Brake in place instead of backing off on predicted overshoot.
    pub disallow_backoff: bool,
    prev_cmd_pos: f64,
    prev_out_vel: f64,
}

impl Default for TrajectoryState {
    fn default() -> Self {
        Self {
            enabled: false,
            pos_cmd: 0.0,
            curr_pos: 0.0,
            curr_vel: 0.0,
            active: false,
            max_vel: 0.0,
            max_acc: 0.0,
            min_pos: f64::NEG_INFINITY,
            max_pos: f64::INFINITY,
            disallow_backoff: false,
            prev_cmd_pos: 0.0,
            prev_out_vel: 0.0,
        }
    }
}

impl TrajectoryState {
    /// Disabled state at rest at zero with the given limits.
    pub fn new(limits: &AxisLimits) -> Self {
        let mut state = Self::default();
        state.apply_limits(limits);
        state
    }

    /// Copy limits from configuration. Motion state is left untouched.
    pub fn apply_limits(&mut self, limits: &AxisLimits) {
        self.max_vel = limits.max_vel;
        self.max_acc = limits.max_acc;
        self.min_pos = limits.min_pos;
        self.max_pos = limits.max_pos;
        self.disallow_backoff = limits.disallow_backoff;
    }

    /// Place the axis at rest at `position` with the command synchronised,
    /// so the next enabled cycle sees zero command velocity.
    pub fn reset_to(&mut self, position: f64) {
        self.pos_cmd = position;
        self.curr_pos = position;
        self.curr_vel = 0.0;
        self.prev_cmd_pos = position;
        self.prev_out_vel = 0.0;
        self.active = false;
    }

    /// Seed a moving state: output at `position` travelling at `velocity`.
    ///
    /// The command memory is left as is.
    pub fn set_motion(&mut self, position: f64, velocity: f64) {
        self.curr_pos = position;
        self.curr_vel = velocity;
        self.prev_out_vel = velocity;
    }

    /// Command position remembered from the previous cycle.
    #[inline]
    pub fn prev_cmd_pos(&self) -> f64 {
        self.prev_cmd_pos
    }

    /// Output velocity remembered from the previous cycle.
    #[inline]
    pub fn prev_out_vel(&self) -> f64 {
        self.prev_out_vel
    }

    /// Position error below which the axis counts as settled.
    #[inline]
    pub fn settle_threshold(&self, period: f64) -> f64 {
        (self.max_acc * period * period * SETTLE_FRACTION).abs()
    }

    /// Apply a decision and run the settle test.
    #[inline]
    pub fn commit(&mut self, decision: &Decision, period: f64) {
        self.curr_pos = decision.next_position;
        self.curr_vel = decision.next_velocity;
        self.prev_out_vel = decision.next_velocity;
        self.prev_cmd_pos = decision.remembered_input_position;
        self.active = (self.curr_pos - self.pos_cmd).abs() >= self.settle_threshold(period);
    }
}

// ─── Decision ───────────────────────────────────────────────────────

/// Rung of the decision ladder that produced a [`Decision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    /// Axis disabled: hold position, zero velocity.
    Disabled,
    /// Would overrun `max_pos`: maximum deceleration.
    BrakeBeforeMax,
    /// Would overrun `min_pos`: maximum deceleration.
    BrakeBeforeMin,
    /// Parked exactly on `min_pos`.
    ParkAtMin,
    /// Heading for `min_pos`.
    SeekMin,
    /// Parked exactly on `max_pos`.
    ParkAtMax,
    /// Heading for `max_pos`.
    SeekMax,
    /// Command adopted exactly.
    Track,
    /// Closing the gap toward the command.
    Approach,
    /// Overshoot predicted, backoff disallowed: keep braking.
    BrakeInPlace,
    /// Overshoot predicted: back away from the command.
    BackOff,
}

impl Branch {
    /// Number of variants.
    pub const COUNT: usize = 11;

    /// All variants in ladder order.
    pub const ALL: [Branch; Self::COUNT] = [
        Branch::Disabled,
        Branch::BrakeBeforeMax,
        Branch::BrakeBeforeMin,
        Branch::ParkAtMin,
        Branch::SeekMin,
        Branch::ParkAtMax,
        Branch::SeekMax,
        Branch::Track,
        Branch::Approach,
        Branch::BrakeInPlace,
        Branch::BackOff,
    ];

    /// Stable index into per-branch tables.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// snake_case name, as serialized.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::BrakeBeforeMax => "brake_before_max",
            Self::BrakeBeforeMin => "brake_before_min",
            Self::ParkAtMin => "park_at_min",
            Self::SeekMin => "seek_min",
            Self::ParkAtMax => "park_at_max",
            Self::SeekMax => "seek_max",
            Self::Track => "track",
            Self::Approach => "approach",
            Self::BrakeInPlace => "brake_in_place",
            Self::BackOff => "back_off",
        }
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Next state chosen by [`decide`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub next_position: f64,
    pub next_velocity: f64,
    /// Command position to remember for the next velocity estimate.
    pub remembered_input_position: f64,
    pub branch: Branch,
}

impl Decision {
    #[inline]
    const fn new(position: f64, velocity: f64, input: f64, branch: Branch) -> Self {
        Self {
            next_position: position,
            next_velocity: velocity,
            remembered_input_position: input,
            branch,
        }
    }
}

// ─── Reachable window ───────────────────────────────────────────────

/// Positions and velocities reachable in one period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub min_vel: f64,
    pub max_vel: f64,
    pub min_pos: f64,
    pub max_pos: f64,
}

impl Window {
    /// Kinematic window: `prev_out_vel ± max_acc·T`, clamped to `±max_vel`.
    #[inline]
    pub fn kinematic(state: &TrajectoryState, period: f64) -> Self {
        let dv = state.max_acc * period;
        let min_vel = (state.prev_out_vel - dv).max(-state.max_vel);
        let max_vel = (state.prev_out_vel + dv).min(state.max_vel);
        Self::at_velocities(state.curr_pos, min_vel, max_vel, period)
    }

    /// Narrow the window so the axis can still stop inside the bounds from
    /// either corner. A no-op with infinite bounds.
    #[inline]
    pub fn stoppable(self, state: &TrajectoryState, period: f64) -> Self {
        let up = stopping_speed((state.max_pos - state.curr_pos).max(0.0), state.max_acc, period);
        let down = stopping_speed((state.curr_pos - state.min_pos).max(0.0), state.max_acc, period);
        let max_vel = self.max_vel.min(up).max(self.min_vel);
        let min_vel = self.min_vel.max(-down).min(max_vel);
        Self::at_velocities(state.curr_pos, min_vel, max_vel, period)
    }

    #[inline]
    fn at_velocities(position: f64, min_vel: f64, max_vel: f64, period: f64) -> Self {
        Self {
            min_vel,
            max_vel,
            min_pos: position + min_vel * period,
            max_pos: position + max_vel * period,
        }
    }

    /// Whether `(position, velocity)` is reachable this cycle.
    #[inline]
    pub fn contains(&self, position: f64, velocity: f64) -> bool {
        position <= self.max_pos
            && position >= self.min_pos
            && velocity <= self.max_vel
            && velocity >= self.min_vel
    }

    /// Whether the axis can stop exactly on `position` this cycle.
    #[inline]
    pub fn can_park_at(&self, position: f64) -> bool {
        self.contains(position, 0.0)
    }

    /// Most negative corner (maximum deceleration / reverse).
    #[inline]
    pub fn min_corner(&self) -> (f64, f64) {
        (self.min_pos, self.min_vel)
    }

    /// Most positive corner.
    #[inline]
    pub fn max_corner(&self) -> (f64, f64) {
        (self.max_pos, self.max_vel)
    }
}

/// Largest speed toward a bound `room` away such that one period at that
/// speed plus a full stop at `acc` still ends on or before the bound.
///
/// Solves `v·T + v²/(2a) = room`.
#[inline]
fn stopping_speed(room: f64, acc: f64, period: f64) -> f64 {
    acc * ((period * period + 2.0 * room / acc).sqrt() - period)
}

/// Where motion at `velocity` from `position` comes to rest under `acc`.
#[inline]
fn rest_position(position: f64, velocity: f64, acc: f64) -> f64 {
    position + velocity * velocity.abs() / (2.0 * acc)
}

/// Projection of command and output once their velocities match.
#[derive(Debug, Clone, Copy)]
struct VelocityMatch {
    input_pos: f64,
    output_pos: f64,
}

impl VelocityMatch {
    #[inline]
    fn project(state: &TrajectoryState, in_vel: f64, period: f64) -> Self {
        let out_vel = state.prev_out_vel;
        let acc = state.max_acc;
        let time = (out_vel - in_vel).abs() / acc;
        let dir = if out_vel - in_vel < 0.0 { -1.0 } else { 1.0 };
        Self {
            input_pos: state.pos_cmd + in_vel * time,
            output_pos: state.curr_pos + out_vel * (time + period)
                - 0.5 * dir * acc * time * time,
        }
    }
}

// ─── Ladder ─────────────────────────────────────────────────────────

/// Evaluate the decision ladder for one cycle without mutating `state`.
///
/// Preconditions (unchecked): `period > 0`, `max_acc > 0`,
/// `min_pos <= max_pos`.
pub fn decide(state: &TrajectoryState, period: f64) -> Decision {
    if !state.enabled {
        return Decision::new(state.curr_pos, 0.0, state.curr_pos, Branch::Disabled);
    }

    let cmd = state.pos_cmd;
    let in_vel = (cmd - state.prev_cmd_pos) / period;

    let reach = Window::kinematic(state, period);
    let window = reach.stoppable(state, period);
    let (lo_pos, lo_vel) = window.min_corner();
    let (hi_pos, hi_vel) = window.max_corner();
    let toward_min = Decision::new(lo_pos, lo_vel, cmd, Branch::SeekMin);
    let toward_max = Decision::new(hi_pos, hi_vel, cmd, Branch::SeekMax);
    let with = |d: Decision, branch: Branch| Decision { branch, ..d };

    // 1. About to overrun a bound and cannot park on it this cycle.
    let out_vel = state.prev_out_vel;
    let stop_pos = rest_position(state.curr_pos + out_vel * period, out_vel, state.max_acc);
    if stop_pos >= state.max_pos && !reach.can_park_at(state.max_pos) {
        return with(toward_min, Branch::BrakeBeforeMax);
    }
    if stop_pos <= state.min_pos && !reach.can_park_at(state.min_pos) {
        return with(toward_max, Branch::BrakeBeforeMin);
    }

    // 2. Command heading out of bounds, or sitting on a bound with no risk
    //    of the output overshooting it: the bound is the goal.
    let matched = VelocityMatch::project(state, in_vel, period);
    if matched.input_pos < state.min_pos
        || (cmd <= state.min_pos && matched.input_pos < matched.output_pos)
    {
        if reach.can_park_at(state.min_pos) {
            return Decision::new(state.min_pos, 0.0, cmd, Branch::ParkAtMin);
        }
        return toward_min;
    }
    if matched.input_pos > state.max_pos
        || (cmd >= state.max_pos && matched.input_pos > matched.output_pos)
    {
        if reach.can_park_at(state.max_pos) {
            return Decision::new(state.max_pos, 0.0, cmd, Branch::ParkAtMax);
        }
        return toward_max;
    }

    // 3. Command reachable as-is.
    if window.contains(cmd, in_vel) && cmd >= state.min_pos && cmd <= state.max_pos {
        return Decision::new(cmd, in_vel, cmd, Branch::Track);
    }

    // 4. Converge without overshooting where possible.
    if state.curr_pos > cmd {
        if matched.input_pos < matched.output_pos {
            with(toward_min, Branch::Approach)
        } else if state.disallow_backoff {
            with(toward_min, Branch::BrakeInPlace)
        } else {
            with(toward_max, Branch::BackOff)
        }
    } else if matched.input_pos > matched.output_pos {
        with(toward_max, Branch::Approach)
    } else if state.disallow_backoff {
        with(toward_max, Branch::BrakeInPlace)
    } else {
        with(toward_min, Branch::BackOff)
    }
}

/// Run one limiter cycle on `state` and report which rung fired.
///
/// A disabled axis first takes its current position as the command, so
/// re-enabling starts from rest where it stands.
#[inline]
pub fn update(state: &mut TrajectoryState, period: f64) -> Branch {
    if !state.enabled {
        state.pos_cmd = state.curr_pos;
    }
    let decision = decide(state, period);
    state.commit(&decision, period);
    decision.branch
}

// ─── Tests ──────────────────────────────────────────────────────────
