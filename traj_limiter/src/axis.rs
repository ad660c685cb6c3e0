//! Fixed-capacity bank of independently limited axes.
//!
//! Axes share a period and a cycle counter, nothing else: every axis is
//! updated with its own [`TrajectoryState`] and never looks at another.
//! Capacity is fixed at [`MAX_AXES`]; `update_all` allocates nothing.

use heapless::Vec;
use traj_common::axis::AxisLimits;
use traj_common::consts::MAX_AXES;

use crate::limiter::{Branch, TrajectoryState, update};

/// Per-branch hit counts for one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BranchCounters([u64; Branch::COUNT]);

impl BranchCounters {
    #[inline]
    pub fn record(&mut self, branch: Branch) {
        self.0[branch.index()] += 1;
    }

    #[inline]
    pub fn get(&self, branch: Branch) -> u64 {
        self.0[branch.index()]
    }

    /// Sum over all branches (= number of updates).
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// Non-zero counters in ladder order.
    pub fn nonzero(&self) -> impl Iterator<Item = (Branch, u64)> + '_ {
        Branch::ALL
            .iter()
            .map(|b| (*b, self.get(*b)))
            .filter(|(_, n)| *n > 0)
    }
}

/// One named axis: limiter state plus bookkeeping.
#[derive(Debug, Clone)]
pub struct Axis {
    name: String,
    /// Limiter state, read and written around each cycle.
    pub state: TrajectoryState,
    /// How often each rung of the ladder fired.
    pub counters: BranchCounters,
    /// Branch of the most recent update.
    pub last_branch: Option<Branch>,
    /// Cycle on which the axis last went from converging to settled.
    settled_at: Option<u64>,
}

impl Axis {
    /// New disabled axis at rest at `initial_position`.
    pub fn new(name: impl Into<String>, limits: &AxisLimits, initial_position: f64) -> Self {
        let mut state = TrajectoryState::new(limits);
        state.reset_to(initial_position);
        Self {
            name: name.into(),
            state,
            counters: BranchCounters::default(),
            last_branch: None,
            settled_at: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cycle on which the axis last stopped converging. `None` while
    /// converging and for an axis that has never moved.
    #[inline]
    pub fn settled_at(&self) -> Option<u64> {
        self.settled_at
    }

    /// Run one limiter cycle and update bookkeeping.
    #[inline]
    pub fn update(&mut self, period: f64, cycle: u64) -> Branch {
        let was_active = self.state.active;
        let branch = update(&mut self.state, period);
        self.counters.record(branch);
        self.last_branch = Some(branch);

        if self.state.active {
            self.settled_at = None;
        } else if was_active {
            self.settled_at = Some(cycle);
        }
        branch
    }
}

/// Bank is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("axis bank full ({capacity} axes)")]
pub struct BankFull {
    pub capacity: usize,
}

/// Fixed-capacity set of axes updated in order every cycle.
#[derive(Debug, Default)]
pub struct AxisBank {
    axes: Vec<Axis, MAX_AXES>,
}

impl AxisBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axis. Fails when [`MAX_AXES`] axes are already present.
    pub fn push(&mut self, axis: Axis) -> Result<usize, BankFull> {
        self.axes
            .push(axis)
            .map_err(|_| BankFull { capacity: MAX_AXES })?;
        Ok(self.axes.len() - 1)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Axis> {
        self.axes.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Axis> {
        self.axes.get_mut(index)
    }

    /// Look up an axis by name.
    pub fn find(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Axis> {
        self.axes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Axis> {
        self.axes.iter_mut()
    }

    /// Update every axis once.
    #[inline]
    pub fn update_all(&mut self, period: f64, cycle: u64) {
        for axis in self.axes.iter_mut() {
            axis.update(period, cycle);
        }
    }

    /// True when no axis is still converging. Disabled axes never are.
    pub fn all_settled(&self) -> bool {
        self.axes.iter().all(|a| !a.state.active)
    }
}
