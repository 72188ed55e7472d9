//! Liftgate CLI - operational governance for Spacelift stacks
//!
//! Usage: liftgate <COMMAND>
//!
//! Commands:
//!   stacks    List all stacks with their states
//!   status    Health summary for one environment
//!   trigger   Trigger a run, optionally polling it to completion
//!   promote   Promote staging changes to production behind the health gate
//!   scan      Run the compliance scan and print a report

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;

use liftgate::config::Config;
use liftgate::gateway::HttpGateway;
use liftgate::monitor::WaitOptions;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default()?;

    if cli.verbose > 0 {
        if let Some(path) = Config::user_config_path() {
            let source = if path.exists() { "loaded" } else { "defaults" };
            eprintln!("config: {} ({source})", path.display());
        }
    }

    match cli.command {
        Commands::Stacks => commands::stacks::cmd_stacks(&gateway(&config)?, cli.json),
        Commands::Stack { id } => {
            commands::stacks::cmd_stack_detail(&gateway(&config)?, &id, cli.json)
        }
        Commands::Status { environment } => {
            commands::status::cmd_status(&gateway(&config)?, &environment, cli.json)
        }
        Commands::Overview => commands::status::cmd_overview(&gateway(&config)?, cli.json),
        Commands::Trigger {
            stack_id,
            commit_sha,
            wait,
            timeout,
            poll_interval,
        } => commands::runs::cmd_trigger(
            &gateway(&config)?,
            &stack_id,
            commit_sha.as_deref(),
            wait,
            wait_options(&config, timeout, poll_interval),
            cli.json,
        ),
        Commands::Wait {
            run_id,
            timeout,
            poll_interval,
        } => commands::runs::cmd_wait(
            &gateway(&config)?,
            &run_id,
            wait_options(&config, timeout, poll_interval),
            cli.json,
        ),
        Commands::Confirm { run_id } => {
            commands::runs::cmd_confirm(&gateway(&config)?, &run_id, cli.json)
        }
        Commands::Cancel { run_id, note } => {
            commands::runs::cmd_cancel(&gateway(&config)?, &run_id, &note, cli.json)
        }
        Commands::Lock { stack_id, note } => {
            commands::locks::cmd_lock(&gateway(&config)?, &stack_id, &note, cli.json)
        }
        Commands::Unlock { stack_id } => {
            commands::locks::cmd_unlock(&gateway(&config)?, &stack_id, cli.json)
        }
        Commands::Deploy { environment } => {
            commands::deploy::cmd_deploy(&gateway(&config)?, &environment, cli.json)
        }
        Commands::Promote {
            staging,
            production,
            yes,
        } => {
            let staging_label = staging.unwrap_or_else(|| config.promotion.staging_label.clone());
            let production_label =
                production.unwrap_or_else(|| config.promotion.production_label.clone());
            commands::promote::cmd_promote(
                &gateway(&config)?,
                &staging_label,
                &production_label,
                yes,
                cli.json,
            )
        }
        Commands::Scan { label, output } => commands::scan::cmd_scan(
            &gateway(&config)?,
            label.as_deref(),
            output.as_deref(),
            cli.json,
        ),
    }
}

/// Build the HTTP gateway, resolving credentials only now: commands that
/// never reach the platform (help, parse errors) never require them.
fn gateway(config: &Config) -> Result<HttpGateway> {
    Ok(HttpGateway::new(config.credentials()?))
}

/// Wait bounds: config defaults, overridden per-invocation by CLI flags
fn wait_options(config: &Config, timeout: Option<u64>, poll_interval: Option<u64>) -> WaitOptions {
    let mut options = WaitOptions::from(&config.monitor);
    if let Some(secs) = timeout {
        options.timeout = std::time::Duration::from_secs(secs);
    }
    if let Some(secs) = poll_interval {
        options.poll_interval = std::time::Duration::from_secs(secs);
    }
    options
}
