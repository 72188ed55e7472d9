//! Batch deploy command

use std::process;

use anyhow::Result;

use liftgate::gateway::Gateway;
use liftgate::promote::{deploy_environment, TriggerStatus};

use crate::output::emit;

/// Execute the deploy command: trigger runs for every stack carrying the
/// environment label, reporting a per-stack outcome. Exits non-zero when any
/// trigger failed.
pub fn cmd_deploy(gateway: &dyn Gateway, environment: &str, json: bool) -> Result<()> {
    if json {
        emit(serde_json::json!({
            "event": "deploy_started",
            "environment": environment,
        }))?;
    } else {
        println!("Deploying environment: {environment}");
    }

    let outcomes = deploy_environment(gateway, environment)?;

    if outcomes.is_empty() {
        if json {
            emit(serde_json::json!({
                "event": "deploy_complete",
                "environment": environment,
                "triggered": 0,
                "failed": 0,
            }))?;
        } else {
            println!("No stacks carry label '{environment}'.");
        }
        return Ok(());
    }

    for outcome in &outcomes {
        if json {
            emit(serde_json::to_value(outcome)?)?;
            continue;
        }
        match outcome.status {
            TriggerStatus::Triggered => {
                let run_id = outcome.run_id.as_deref().unwrap_or("-");
                println!("  {} -> run {run_id}", outcome.stack_name);
            }
            TriggerStatus::Failed => {
                let reason = outcome.error.as_deref().unwrap_or("unknown error");
                println!("  {} -> FAILED: {reason}", outcome.stack_name);
            }
        }
    }

    let failed = outcomes
        .iter()
        .filter(|o| o.status == TriggerStatus::Failed)
        .count();

    if json {
        emit(serde_json::json!({
            "event": "deploy_complete",
            "environment": environment,
            "triggered": outcomes.len() - failed,
            "failed": failed,
        }))?;
    } else {
        println!();
        println!("{} triggered, {failed} failed", outcomes.len() - failed);
    }

    if failed > 0 {
        process::exit(1);
    }
    Ok(())
}
