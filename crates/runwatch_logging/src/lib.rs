#![deny(missing_docs)]
//! Logging macros for the run monitor.
//!
//! Everything goes through the `log` facade; the binary decides where the
//! records end up. Targets are the calling module, so `runwatch_core::update`
//! transitions and `runwatch_engine::runtime` dispatches can be filtered
//! separately.

/// Per-message dispatch noise.
#[macro_export]
macro_rules! monitor_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// State transitions, requests issued.
#[macro_export]
macro_rules! monitor_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Discarded responses and user-visible milestones.
#[macro_export]
macro_rules! monitor_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Failed fetches, rejected publishes, lost sessions.
#[macro_export]
macro_rules! monitor_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Errors that end the process.
#[macro_export]
macro_rules! monitor_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Installs a stderr logger for test binaries. Later calls, or calls after
/// another logger won the race, do nothing.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

    let config = ConfigBuilder::new()
        .add_filter_allow_str("runwatch")
        .build();
    let _ = TermLogger::init(
        LevelFilter::Debug,
        config,
        TerminalMode::Stderr,
        ColorChoice::Never,
    );
}
