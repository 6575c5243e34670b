//! Terminal front-end for the run monitor: configuration, CLI, rendering and
//! the watch loop behind the `runwatch` binary.
pub mod cli;
pub mod config;
pub mod logging;
pub mod render;
pub mod watch;

pub use config::{ConfigError, MonitorConfig};
pub use watch::{
    watch_run, watch_run_with, Confirm, Confirmation, Interrupt, StdinConfirm, WatchError,
    WatchOptions, WatchOutcome,
};
