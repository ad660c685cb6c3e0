//! Cycle runner end to end: config → bank → samples → summary.

use std::sync::atomic::AtomicBool;

use traj_limiter::config::load_config_from_str;
use traj_limiter::cycle::{CycleRunner, Pacing};
use traj_limiter::limiter::Branch;
use traj_limiter::sample::{JsonLinesSink, NullSink, OwnedSample};

const CONFIG: &str = r#"
cycles = 600

[shared]
service_name = "runner-test"

[[axes]]
name = "step"
initial_position = 0.0

[axes.limits]
max_vel = 10.0
max_acc = 100.0

[axes.profile]
kind = "step"
from = 0.0
to = 1.0
at_cycle = 5

[[axes]]
name = "clamped"
initial_position = 0.0
disabled = { start = 300, end = 320 }

[axes.limits]
max_vel = 10.0
max_acc = 100.0
min_pos = -0.25
max_pos = 0.25

[axes.profile]
kind = "square"
low = -1.0
high = 1.0
half_period_cycles = 200
"#;

fn runner() -> CycleRunner {
    CycleRunner::from_config(&load_config_from_str(CONFIG).unwrap()).unwrap()
}

#[test]
fn one_sample_per_axis_per_cycle() {
    let mut runner = runner();
    let mut samples: Vec<OwnedSample> = Vec::new();
    let running = AtomicBool::new(true);
    let summary = runner
        .run(600, Pacing::Free, &running, &mut samples)
        .unwrap();

    assert_eq!(summary.cycles, 600);
    assert_eq!(samples.len(), 2 * 600);
    assert_eq!(samples.iter().filter(|s| s.axis == "step").count(), 600);

    // Cycle indices are emitted in order, axes in config order within a cycle.
    for (i, pair) in samples.chunks(2).enumerate() {
        assert_eq!(pair[0].cycle, i as u64);
        assert_eq!(pair[0].axis, "step");
        assert_eq!(pair[1].axis, "clamped");
    }
}

#[test]
fn summary_counters_add_up() {
    let mut runner = runner();
    let running = AtomicBool::new(true);
    let summary = runner.run(600, Pacing::Free, &running, &mut NullSink).unwrap();

    for axis in &summary.axes {
        assert_eq!(axis.counters.total(), 600, "{}", axis.name);
    }
    let clamped = &summary.axes[1];
    assert_eq!(clamped.counters.get(Branch::Disabled), 20);
    assert!(clamped.counters.get(Branch::ParkAtMax) > 0);
    assert!(clamped.counters.get(Branch::ParkAtMin) > 0);

    let step = &summary.axes[0];
    assert!((step.position - 1.0).abs() < 1e-6);
    assert!(!step.active);
    assert!(step.settled_at.is_some());
}

#[test]
fn clamped_axis_stays_in_bounds() {
    let mut runner = runner();
    let mut samples: Vec<OwnedSample> = Vec::new();
    let running = AtomicBool::new(true);
    runner.run(600, Pacing::Free, &running, &mut samples).unwrap();

    for s in samples.iter().filter(|s| s.axis == "clamped") {
        assert!((-0.25..=0.25).contains(&s.curr_pos), "cycle {}: {}", s.cycle, s.curr_pos);
        if (300..320).contains(&s.cycle) {
            assert!(!s.enabled);
            assert_eq!(s.branch, Branch::Disabled);
            assert_eq!(s.curr_vel, 0.0);
        }
    }
}

#[test]
fn runs_resume_where_they_stopped() {
    let mut runner = runner();
    let running = AtomicBool::new(true);
    runner.run(100, Pacing::Free, &running, &mut NullSink).unwrap();
    let second = runner.run(100, Pacing::Free, &running, &mut NullSink).unwrap();

    assert_eq!(runner.cycle(), 200);
    assert_eq!(second.cycles, 100);
    assert_eq!(second.axes[0].counters.total(), 200);
}

#[test]
fn json_lines_output() {
    let mut runner = runner().with_decimation(100);
    let mut sink = JsonLinesSink::new(Vec::new());
    let running = AtomicBool::new(true);
    runner.run(600, Pacing::Free, &running, &mut sink).unwrap();

    assert_eq!(sink.written(), 12);
    let text = String::from_utf8(sink.into_inner()).unwrap();
    for line in text.lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value["cycle"].as_u64().unwrap() % 100 == 0);
        assert!(value["branch"].is_string());
    }
}

#[test]
fn paced_run_takes_real_time() {
    let mut runner = runner();
    let running = AtomicBool::new(true);
    let started = std::time::Instant::now();
    let summary = runner
        .run(20, Pacing::RealTime, &running, &mut NullSink)
        .unwrap();
    assert_eq!(summary.cycles, 20);
    // 20 cycles at 1 ms; allow generous slack below for coarse timers.
    assert!(started.elapsed() >= std::time::Duration::from_millis(10));
}
