//! Fixed-period cycle driver for a bank of limited axes.
//!
//! Each cycle: drive inputs (enable + position command) → limiter update
//! for every axis → sample emission. The runner either free-runs, for
//! offline simulation, or paces itself at the configured cycle time.
//!
//! ## Pacing
//! The paced loop sleeps to absolute deadlines spaced one period apart, so
//! a late wake-up shortens the next sleep instead of drifting the schedule.
//! A cycle body longer than the period is counted as an overrun and logged
//! once; the run continues and the deadline chain restarts from now.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use traj_common::config::ConfigError;
use traj_common::consts::MAX_AXES;

use crate::axis::{Axis, AxisBank, BranchCounters};
use crate::config::SimConfig;
use crate::limiter::TrajectoryState;
use crate::profile::{CommandProfile, CycleSpan};
use crate::sample::{Sample, SampleSink};

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: i64,
    pub sum_cycle_ns: i64,
    /// Cycles whose body took longer than the period.
    pub overruns: u64,
    /// Maximum wake-up latency [ns], paced runs only.
    pub max_latency_ns: i64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record one cycle body duration.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns += duration_ns;
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
    }

    /// Average cycle time [ns] (0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Errors while building or running the cycle loop.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("sample output error: {0}")]
    Output(#[from] std::io::Error),
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// How the runner spaces cycles in wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// Back to back, as fast as possible.
    #[default]
    Free,
    /// One cycle per configured period.
    RealTime,
}

/// Input source for one axis: command profile plus disabled window.
#[derive(Debug, Clone, Copy)]
struct AxisDrive {
    profile: CommandProfile,
    disabled: Option<CycleSpan>,
}

impl AxisDrive {
    #[inline]
    fn apply(&self, state: &mut TrajectoryState, cycle: u64, period: f64) {
        state.enabled = !self.disabled.is_some_and(|span| span.contains(cycle));
        state.pos_cmd = self.profile.sample(cycle, period);
    }
}

/// Final state of one axis after a run.
#[derive(Debug, Clone)]
pub struct AxisSummary {
    pub name: String,
    pub position: f64,
    pub velocity: f64,
    pub active: bool,
    pub settled_at: Option<u64>,
    pub counters: BranchCounters,
}

/// Result of [`CycleRunner::run`].
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Cycles executed by this run.
    pub cycles: u64,
    /// True when the run ended because the running flag was cleared.
    pub interrupted: bool,
    pub stats: CycleStats,
    pub axes: Vec<AxisSummary>,
}

/// Owns the axis bank and drives it one cycle at a time.
pub struct CycleRunner {
    bank: AxisBank,
    drives: heapless::Vec<AxisDrive, MAX_AXES>,
    period: f64,
    cycle_time_ns: i64,
    decimation: u64,
    cycle: u64,
    stats: CycleStats,
}

impl CycleRunner {
    /// Build the bank from a validated configuration.
    ///
    /// Every axis starts disabled and at rest on its initial position.
    pub fn from_config(config: &SimConfig) -> Result<Self, CycleError> {
        let period = config.period();
        let mut bank = AxisBank::new();
        let mut drives = heapless::Vec::new();

        for ax in &config.axes {
            let axis = Axis::new(ax.name.as_str(), &ax.limits, ax.start_position(period));
            bank.push(axis)
                .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
            let drive = AxisDrive {
                profile: ax.profile,
                disabled: ax.disabled,
            };
            drives
                .push(drive)
                .map_err(|_| ConfigError::ValidationError(format!("more than {MAX_AXES} axes")))?;
        }

        Ok(Self {
            bank,
            drives,
            period,
            cycle_time_ns: config.cycle_time().as_nanos() as i64,
            decimation: 1,
            cycle: 0,
            stats: CycleStats::new(),
        })
    }

    /// Emit samples only every `n`th cycle (0 is treated as 1).
    pub fn with_decimation(mut self, n: u64) -> Self {
        self.decimation = n.max(1);
        self
    }

    #[inline]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    #[inline]
    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn bank(&self) -> &AxisBank {
        &self.bank
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Execute one cycle and advance the cycle counter.
    pub fn step<S: SampleSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), CycleError> {
        let cycle = self.cycle;

        for (axis, drive) in self.bank.iter_mut().zip(self.drives.iter()) {
            drive.apply(&mut axis.state, cycle, self.period);
        }
        self.bank.update_all(self.period, cycle);

        for axis in self.bank.iter() {
            if axis.settled_at() == Some(cycle) {
                debug!(axis = axis.name(), cycle, pos = axis.state.curr_pos, "settled");
            }
        }

        if cycle % self.decimation == 0 {
            for axis in self.bank.iter() {
                if let Some(branch) = axis.last_branch {
                    sink.emit(&Sample::capture(axis, cycle, self.period, branch))?;
                }
            }
        }

        self.cycle += 1;
        Ok(())
    }

    /// Run up to `cycles` cycles, stopping early when `running` is cleared.
    ///
    /// The sink is flushed before returning, also on error.
    pub fn run<S: SampleSink + ?Sized>(
        &mut self,
        cycles: u64,
        pacing: Pacing,
        running: &AtomicBool,
        sink: &mut S,
    ) -> Result<RunSummary, CycleError> {
        let start = self.cycle;
        let end = start.saturating_add(cycles);
        info!(
            cycles,
            axes = self.bank.len(),
            period_us = self.cycle_time_ns / 1_000,
            ?pacing,
            "entering cycle loop"
        );

        let result = match pacing {
            Pacing::Free => self.run_free(end, running, sink),
            Pacing::RealTime => self.run_paced(end, running, sink),
        };
        let flushed = sink.flush();
        result?;
        flushed?;

        let executed = self.cycle - start;
        let interrupted = executed < cycles;
        if interrupted {
            info!(executed, "cycle loop stopped by shutdown request");
        }
        debug!(executed, settled = self.bank.all_settled(), "cycle loop finished");
        Ok(self.summary(executed, interrupted))
    }

    fn run_free<S: SampleSink + ?Sized>(
        &mut self,
        end: u64,
        running: &AtomicBool,
        sink: &mut S,
    ) -> Result<(), CycleError> {
        while self.cycle < end && running.load(Ordering::Relaxed) {
            let cycle_start = Instant::now();
            self.step(sink)?;
            self.stats.record(cycle_start.elapsed().as_nanos() as i64, 0);
        }
        Ok(())
    }

    /// Paced loop on absolute deadlines.
    fn run_paced<S: SampleSink + ?Sized>(
        &mut self,
        end: u64,
        running: &AtomicBool,
        sink: &mut S,
    ) -> Result<(), CycleError> {
        let period = Duration::from_nanos(self.cycle_time_ns as u64);
        let mut deadline = Instant::now();

        while self.cycle < end && running.load(Ordering::Relaxed) {
            deadline += period;

            let cycle_start = Instant::now();
            self.step(sink)?;
            let duration_ns = cycle_start.elapsed().as_nanos() as i64;

            let now = Instant::now();
            let latency_ns = match deadline.checked_duration_since(now) {
                Some(remaining) => {
                    thread::sleep(remaining);
                    Instant::now().saturating_duration_since(deadline).as_nanos() as i64
                }
                None => {
                    deadline = now;
                    0
                }
            };
            self.stats.record(duration_ns, latency_ns);

            if duration_ns > self.cycle_time_ns {
                self.stats.overruns += 1;
                if self.stats.overruns == 1 {
                    warn!(
                        cycle = self.cycle - 1,
                        actual_ns = duration_ns,
                        period_ns = self.cycle_time_ns,
                        "cycle overrun"
                    );
                }
            }
        }
        Ok(())
    }

    fn summary(&self, cycles: u64, interrupted: bool) -> RunSummary {
        RunSummary {
            cycles,
            interrupted,
            stats: self.stats.clone(),
            axes: self
                .bank
                .iter()
                .map(|a| AxisSummary {
                    name: a.name().to_string(),
                    position: a.state.curr_pos,
                    velocity: a.state.curr_vel,
                    active: a.state.active,
                    settled_at: a.settled_at(),
                    counters: a.counters,
                })
                .collect(),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
