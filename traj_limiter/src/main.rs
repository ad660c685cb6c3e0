//! # Trajectory Limiter Simulator
//!
//! Loads a simulation config, drives every configured axis with its command
//! profile through the limiter for a fixed number of cycles, and writes one
//! JSON sample per axis per cycle to stdout (or `--output`).
//!
//! Logs go to stderr so the sample stream stays machine-readable.

use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;
use traj_common::config::LogLevel;
use traj_common::consts::DEFAULT_CONFIG_PATH;
use traj_limiter::config::{SimConfig, load_config};
use traj_limiter::cycle::{CycleRunner, Pacing, RunSummary};
use traj_limiter::sample::{JsonLinesSink, NullSink, SampleSink};

/// Trajectory limiter simulator: velocity/acceleration/position limiting per axis
#[derive(Parser, Debug)]
#[command(name = "traj_limiter")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Run synthetic position commands through the trajectory limiter")]
struct Args {
    /// Path to the simulation TOML.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the number of cycles from the config.
    #[arg(long)]
    cycles: Option<u64>,

    /// Pace cycles at the configured period instead of free-running.
    #[arg(long)]
    realtime: bool,

    /// Emit samples only every N cycles.
    #[arg(long, default_value_t = 1, value_name = "N")]
    decimate: u64,

    /// Write samples to a file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Do not emit samples, only the summary.
    #[arg(long, conflicts_with = "output")]
    no_samples: bool,

    /// Print the validated config as TOML and exit.
    #[arg(long)]
    print_config: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            setup_tracing(&args, LogLevel::default());
            error!("FATAL: {}: {e}", args.config.display());
            process::exit(1);
        }
    };
    setup_tracing(&args, config.shared.log_level);

    info!(
        "Trajectory limiter v{} starting ({})",
        env!("CARGO_PKG_VERSION"),
        config.shared.service_name
    );

    if let Err(e) = run(&args, &config) {
        error!("FATAL: {e}");
        process::exit(1);
    }
}

fn run(args: &Args, config: &SimConfig) -> Result<(), Box<dyn std::error::Error>> {
    if args.print_config {
        let text = toml::to_string_pretty(config)?;
        io::stdout().write_all(text.as_bytes())?;
        return Ok(());
    }

    let cycles = args.cycles.unwrap_or(config.cycles);
    info!(
        "Config OK: cycle_time={}µs, cycles={}, axes={}",
        config.cycle_time_us,
        cycles,
        config.axes.len()
    );

    let pacing = if args.realtime {
        Pacing::RealTime
    } else {
        Pacing::Free
    };

    let mut runner = CycleRunner::from_config(config)?.with_decimation(args.decimate);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut sink = open_sink(args)?;
    let summary = runner.run(cycles, pacing, &running, sink.as_mut())?;
    log_summary(&summary);
    Ok(())
}

/// Sample destination selected on the command line.
fn open_sink(args: &Args) -> io::Result<Box<dyn SampleSink>> {
    if args.no_samples {
        return Ok(Box::new(NullSink));
    }
    match &args.output {
        Some(path) => {
            info!("Writing samples to {}", path.display());
            let file = File::create(path)?;
            Ok(Box::new(JsonLinesSink::new(BufWriter::new(file))))
        }
        None => Ok(Box::new(JsonLinesSink::new(BufWriter::new(io::stdout().lock())))),
    }
}

fn log_summary(summary: &RunSummary) {
    let stats = &summary.stats;
    info!(
        "Ran {} cycles{}: avg={}ns max={}ns max_latency={}ns overruns={}",
        summary.cycles,
        if summary.interrupted { " (interrupted)" } else { "" },
        stats.avg_cycle_ns(),
        stats.max_cycle_ns,
        stats.max_latency_ns,
        stats.overruns
    );
    if stats.overruns > 0 {
        warn!("{} cycle overruns", stats.overruns);
    }

    for axis in &summary.axes {
        let branches: Vec<String> = axis
            .counters
            .nonzero()
            .map(|(branch, n)| format!("{branch}={n}"))
            .collect();
        info!(
            axis = %axis.name,
            pos = axis.position,
            vel = axis.velocity,
            active = axis.active,
            settled_at = ?axis.settled_at,
            "{}",
            branches.join(" ")
        );
    }
}

/// Tracing on stderr. `--verbose` forces DEBUG; otherwise `RUST_LOG` wins
/// over the configured log level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let filter = if args.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_directive()))
    };

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .compact()
            .init();
    }
}
