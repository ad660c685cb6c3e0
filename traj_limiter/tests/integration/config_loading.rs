//! Configuration files on disk: loading, defaults and rejection.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use traj_common::config::ConfigError;
use traj_limiter::config::load_config;
use traj_limiter::profile::CommandProfile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const ONE_AXIS: &str = r#"
cycle_time_us = 500
cycles = 100

[shared]
log_level = "debug"
service_name = "file-test"

[[axes]]
name = "a"
initial_position = 0.1

[axes.limits]
max_vel = 2.0
max_acc = 20.0
min_pos = 0.0
max_pos = 1.0

[axes.profile]
kind = "ramp"
from = 0.1
to = 0.9
start_cycle = 10
duration_cycles = 50
"#;

#[test]
fn loads_config_file() {
    let file = write_config(ONE_AXIS);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.cycle_time_us, 500);
    assert!((config.period() - 0.0005).abs() < 1e-15);
    assert_eq!(config.shared.service_name, "file-test");
    assert_eq!(config.axes.len(), 1);

    let axis = &config.axes[0];
    assert_eq!(axis.limits.max_pos, 1.0);
    assert!(!axis.limits.disallow_backoff);
    assert!(matches!(axis.profile, CommandProfile::Ramp { duration_cycles: 50, .. }));
}

#[test]
fn missing_file_reported() {
    let err = load_config(Path::new("/nonexistent/limiter.toml")).unwrap_err();
    assert_eq!(err, ConfigError::FileNotFound);
}

#[test]
fn malformed_toml_is_parse_error() {
    let file = write_config("cycles = [\n");
    assert!(matches!(load_config(file.path()), Err(ConfigError::ParseError(_))));
}

#[test]
fn inverted_bounds_rejected() {
    let file = write_config(&ONE_AXIS.replace("max_pos = 1.0", "max_pos = -1.0"));
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
    assert!(err.to_string().contains("min_pos"), "{err}");
}

#[test]
fn duplicate_axis_names_rejected() {
    let second = ONE_AXIS
        .split_once("[[axes]]")
        .map(|(_, axis)| format!("[[axes]]{axis}"))
        .unwrap();
    let file = write_config(&format!("{ONE_AXIS}\n{second}"));
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("duplicate"), "{err}");
}

#[test]
fn disabled_span_must_be_ordered() {
    let text = ONE_AXIS.replace(
        "initial_position = 0.1",
        "initial_position = 0.1\ndisabled = { start = 20, end = 20 }",
    );
    let file = write_config(&text);
    assert!(load_config(file.path()).is_err());
}

#[test]
fn unknown_profile_kind_rejected() {
    let file = write_config(&ONE_AXIS.replace("kind = \"ramp\"", "kind = \"jerk\""));
    assert!(matches!(load_config(file.path()), Err(ConfigError::ParseError(_))));
}

#[test]
fn shipped_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/limiter.toml");
    let config = load_config(&path).unwrap();
    assert_eq!(config.axes.len(), 3);
    assert!(config.axes.iter().any(|a| a.disabled.is_some()));
}
