//! Step response of an unbounded axis.
//!
//! Reference case: `max_vel = 10`, `max_acc = 100`, `T = 1 ms`, step 0 → 1.
//! Velocity grows by `max_acc·T = 0.1` per cycle until it reaches
//! `max_vel` after 100 cycles, then the axis decelerates onto the target.

use super::{DT, enabled_axis, reference_limits, run_trace};
use traj_limiter::limiter::{Branch, update};

#[test]
fn velocity_ramps_by_one_increment_per_cycle() {
    let mut state = enabled_axis(&reference_limits(), 0.0);
    let trace = run_trace(&mut state, 100, |_| 1.0);

    for (k, p) in trace.iter().enumerate() {
        let expected = 0.1 * (k + 1) as f64;
        assert!(
            (p.vel - expected).abs() < 1e-9,
            "cycle {k}: vel {} != {expected}",
            p.vel
        );
        assert_eq!(p.branch, Branch::Approach, "cycle {k}");
    }
    assert!((trace[99].vel - 10.0).abs() < 1e-9);
}

#[test]
fn step_is_monotone_and_never_overshoots() {
    let limits = reference_limits();
    let mut state = enabled_axis(&limits, 0.0);
    let tiny = state.settle_threshold(DT);
    let trace = run_trace(&mut state, 400, |_| 1.0);

    for pair in trace.windows(2) {
        assert!(pair[1].pos >= pair[0].pos, "position went backwards");
    }
    for p in &trace {
        assert!(p.pos <= 1.0 + tiny);
        assert!(p.vel.abs() <= limits.max_vel + 1e-9);
    }
}

#[test]
fn step_settles_on_target() {
    let mut state = enabled_axis(&reference_limits(), 0.0);
    let trace = run_trace(&mut state, 400, |_| 1.0);

    let settled = trace
        .iter()
        .position(|p| !p.active)
        .expect("axis never settled");
    assert!((150..250).contains(&settled), "settled at {settled}");
    assert!(trace[settled..].iter().all(|p| !p.active));

    let last = trace.last().unwrap();
    assert!((last.pos - 1.0).abs() < state.settle_threshold(DT));
    assert!(last.vel.abs() < 1e-9);
}

#[test]
fn acceleration_limited_every_cycle() {
    let mut state = enabled_axis(&reference_limits(), 0.0);
    let mut prev_vel = 0.0;
    for _ in 0..400 {
        state.pos_cmd = 1.0;
        update(&mut state, DT);
        assert!((state.curr_vel - prev_vel).abs() <= 100.0 * DT + 1e-9);
        prev_vel = state.curr_vel;
    }
}

#[test]
fn negative_step_mirrors_positive() {
    let mut up = enabled_axis(&reference_limits(), 0.0);
    let mut down = enabled_axis(&reference_limits(), 0.0);
    let rise = run_trace(&mut up, 300, |_| 1.0);
    let fall = run_trace(&mut down, 300, |_| -1.0);

    for (k, (r, f)) in rise.iter().zip(&fall).enumerate() {
        assert!((r.pos + f.pos).abs() < 1e-9, "cycle {k}");
        assert!((r.vel + f.vel).abs() < 1e-9, "cycle {k}");
        assert_eq!(r.branch, f.branch, "cycle {k}");
    }
}

#[test]
fn idempotent_at_rest() {
    let mut state = enabled_axis(&reference_limits(), 0.0);
    run_trace(&mut state, 400, |_| 1.0);
    assert!(!state.active);

    let settled = (state.curr_pos, state.curr_vel);
    for _ in 0..10 {
        state.pos_cmd = 1.0;
        assert_eq!(update(&mut state, DT), Branch::Track);
        assert_eq!((state.curr_pos, state.curr_vel), settled);
        assert!(!state.active);
    }
}

#[test]
fn sine_within_limits_is_tracked_exactly() {
    let mut state = enabled_axis(&reference_limits(), 0.0);
    let command = |k: usize| 0.1 * (2.0 * std::f64::consts::PI * k as f64 * DT).sin();
    let trace = run_trace(&mut state, 2_000, command);

    // After a short pickup the command stays inside the reachable window.
    for (k, p) in trace.iter().enumerate().skip(50) {
        assert_eq!(p.branch, Branch::Track, "cycle {k}");
        assert_eq!(p.pos, command(k), "cycle {k}");
    }
}
