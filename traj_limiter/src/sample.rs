//! Per-cycle output samples and where they go.
//!
//! The runner hands every emitted [`Sample`] to a [`SampleSink`].
//! [`JsonLinesSink`] writes one JSON object per line, [`NullSink`] drops
//! everything, and `Vec<OwnedSample>` keeps samples in memory for tests.

use std::io::{self, Write};

use serde::Serialize;

use crate::axis::Axis;
use crate::limiter::Branch;

/// Snapshot of one axis after one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample<'a> {
    pub cycle: u64,
    /// Elapsed time at the end of the cycle [s].
    pub time_s: f64,
    pub axis: &'a str,
    pub enabled: bool,
    pub pos_cmd: f64,
    pub curr_pos: f64,
    pub curr_vel: f64,
    pub active: bool,
    pub branch: Branch,
}

impl<'a> Sample<'a> {
    /// Capture an axis after its update for `cycle`.
    pub fn capture(axis: &'a Axis, cycle: u64, period: f64, branch: Branch) -> Self {
        Self {
            cycle,
            time_s: (cycle + 1) as f64 * period,
            axis: axis.name(),
            enabled: axis.state.enabled,
            pos_cmd: axis.state.pos_cmd,
            curr_pos: axis.state.curr_pos,
            curr_vel: axis.state.curr_vel,
            active: axis.state.active,
            branch,
        }
    }

    pub fn to_owned_sample(&self) -> OwnedSample {
        OwnedSample {
            cycle: self.cycle,
            time_s: self.time_s,
            axis: self.axis.to_string(),
            enabled: self.enabled,
            pos_cmd: self.pos_cmd,
            curr_pos: self.curr_pos,
            curr_vel: self.curr_vel,
            active: self.active,
            branch: self.branch,
        }
    }
}

/// [`Sample`] with an owned axis name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnedSample {
    pub cycle: u64,
    pub time_s: f64,
    pub axis: String,
    pub enabled: bool,
    pub pos_cmd: f64,
    pub curr_pos: f64,
    pub curr_vel: f64,
    pub active: bool,
    pub branch: Branch,
}

/// Destination for samples.
pub trait SampleSink {
    fn emit(&mut self, sample: &Sample<'_>) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Discards all samples.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SampleSink for NullSink {
    #[inline]
    fn emit(&mut self, _sample: &Sample<'_>) -> io::Result<()> {
        Ok(())
    }
}

impl SampleSink for Vec<OwnedSample> {
    fn emit(&mut self, sample: &Sample<'_>) -> io::Result<()> {
        self.push(sample.to_owned_sample());
        Ok(())
    }
}

/// Writes samples as newline-delimited JSON.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of samples written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SampleSink for JsonLinesSink<W> {
    fn emit(&mut self, sample: &Sample<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, sample)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
