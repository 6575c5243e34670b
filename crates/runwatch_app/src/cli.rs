use std::path::PathBuf;

use clap::{Parser, Subcommand};
use runwatch_core::JobId;

use crate::config::CONFIG_FILENAME;
use crate::logging::LogDestination;

/// Runwatch - follow analysis runs until they finish
#[derive(Debug, Parser)]
#[command(name = "runwatch", version)]
#[command(about = "Watch analysis runs, show their steps and publish the final signal", long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Backend base URL; overrides the config file and environment
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Where log lines go
    #[arg(long, global = true, value_enum, default_value_t = LogDestination::File)]
    pub log_destination: LogDestination,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Follow a run until it reaches a terminal status
    Watch {
        /// Run ID
        id: JobId,

        /// Offer to publish the final signal once the run succeeds
        #[arg(long)]
        publish: bool,

        /// Skip the publish confirmation prompt
        #[arg(short, long, requires = "publish")]
        yes: bool,

        /// Expand the output of every step
        #[arg(long)]
        expand: bool,
    },

    /// Queue a new run
    Trigger {
        /// Instrument symbol, e.g. EURUSD
        instrument: String,

        #[arg(short, long, default_value = "H1")]
        timeframe: String,

        /// Follow the new run after queueing it
        #[arg(short, long)]
        watch: bool,
    },

    /// List recent runs
    Runs {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}
