use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Liftgate - operational governance for Spacelift stacks
#[derive(Parser, Debug)]
#[command(name = "liftgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all stacks with their states
    Stacks,

    /// Show detailed information for one stack
    Stack {
        /// Stack id
        id: String,
    },

    /// Health summary for one environment label
    Status {
        /// Environment label (e.g. staging, production)
        environment: String,
    },

    /// Health summary across the whole fleet
    Overview,

    /// Trigger a run for a stack
    Trigger {
        /// Stack id
        stack_id: String,

        /// Pin the run to a specific commit
        #[arg(long)]
        commit_sha: Option<String>,

        /// Poll the run until it reaches a terminal or actionable state
        #[arg(long)]
        wait: bool,

        /// Override the wait timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Override the poll interval in seconds
        #[arg(long)]
        poll_interval: Option<u64>,
    },

    /// Poll an existing run until it reaches a terminal or actionable state
    Wait {
        /// Run id
        run_id: String,

        /// Override the wait timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Override the poll interval in seconds
        #[arg(long)]
        poll_interval: Option<u64>,
    },

    /// Approve a run waiting for confirmation
    Confirm {
        /// Run id
        run_id: String,
    },

    /// Cancel a run
    Cancel {
        /// Run id
        run_id: String,

        /// Reason recorded with the cancellation
        #[arg(long, default_value = "")]
        note: String,
    },

    /// Lock a stack against new runs
    Lock {
        /// Stack id
        stack_id: String,

        /// Reason recorded with the lock
        #[arg(long, default_value = "")]
        note: String,
    },

    /// Release a stack lock
    Unlock {
        /// Stack id
        stack_id: String,
    },

    /// Trigger runs for every stack in an environment
    Deploy {
        /// Environment label
        environment: String,
    },

    /// Promote staging changes to production behind the health gate
    Promote {
        /// Staging environment label (defaults from config)
        #[arg(long)]
        staging: Option<String>,

        /// Production environment label (defaults from config)
        #[arg(long)]
        production: Option<String>,

        /// Skip the interactive confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Run the compliance scan and print a report
    Scan {
        /// Only scan stacks carrying this label
        #[arg(long)]
        label: Option<String>,

        /// Also write the JSON report to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },
}
