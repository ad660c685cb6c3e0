//! Trajectory limiter common library.
//!
//! Shared constants, the per-axis limit record and TOML configuration
//! loading used by every crate in the workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Workspace-wide numeric limits and defaults
//! - [`config`] - Configuration loading trait, error and log level
//! - [`axis`] - Per-axis kinematic limits with validation
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use traj_common::prelude::*;
//! ```

pub mod axis;
pub mod config;
pub mod consts;
pub mod prelude;
