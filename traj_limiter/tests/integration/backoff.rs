//! Overshoot handling: back off toward the command, or keep braking in
//! place when backoff is disallowed.
//!
//! Scenario: output at 0.01 moving at -5 toward a command resting at 0.
//! At `max_acc = 100` it cannot stop in time, so overshoot is predicted.

use super::{DT, reference_limits};
use traj_limiter::limiter::{Branch, TrajectoryState, decide, update};

fn overshooting(disallow_backoff: bool) -> TrajectoryState {
    let mut limits = reference_limits();
    limits.disallow_backoff = disallow_backoff;
    let mut state = TrajectoryState::new(&limits);
    state.reset_to(0.0);
    state.set_motion(0.01, -5.0);
    state.enabled = true;
    state
}

#[test]
fn backoff_takes_decelerating_corner() {
    let mut state = overshooting(false);
    assert_eq!(update(&mut state, DT), Branch::BackOff);
    assert!((state.curr_vel + 4.9).abs() < 1e-12);
    assert!((state.curr_pos - 0.0051).abs() < 1e-12);
    assert!(state.active);
}

#[test]
fn disallowed_backoff_keeps_velocity_sign() {
    let mut state = overshooting(true);
    assert_eq!(update(&mut state, DT), Branch::BrakeInPlace);
    assert!((state.curr_vel + 5.1).abs() < 1e-12);
    assert!((state.curr_pos - 0.0049).abs() < 1e-12);
}

#[test]
fn policies_agree_until_overshoot_is_predicted() {
    // Far from the command, both take the same approach corner.
    let mut allow = overshooting(false);
    let mut deny = overshooting(true);
    allow.set_motion(1.0, -1.0);
    deny.set_motion(1.0, -1.0);

    let a = decide(&allow, DT);
    let d = decide(&deny, DT);
    assert_eq!(a.branch, Branch::Approach);
    assert_eq!(d.branch, Branch::Approach);
    assert_eq!(a.next_position, d.next_position);
    assert_eq!(a.next_velocity, d.next_velocity);
}

#[test]
fn backoff_recovers_onto_command() {
    let mut state = overshooting(false);
    for _ in 0..500 {
        state.pos_cmd = 0.0;
        update(&mut state, DT);
    }
    assert!(!state.active);
    assert!(state.curr_pos.abs() < state.settle_threshold(DT));
}
