//! Staging-to-production promotion command

use std::process;

use anyhow::{bail, Result};

use dialoguer::Confirm;
use liftgate::gateway::Gateway;
use liftgate::promote::{check_staging_health, promotion_candidates, trigger_candidates, TriggerStatus};

use crate::output::emit;

/// Execute the promote command.
///
/// The staging health gate runs before anything else; an unhealthy staging
/// environment aborts with no production stack touched. Interactive runs ask
/// for confirmation after listing the candidates; `--yes` skips the prompt
/// and is mandatory in `--json` mode, which has no terminal to ask on.
pub fn cmd_promote(
    gateway: &dyn Gateway,
    staging_label: &str,
    production_label: &str,
    yes: bool,
    json: bool,
) -> Result<()> {
    if json && !yes {
        bail!("--json mode is non-interactive; pass --yes to promote");
    }

    let staging = check_staging_health(gateway, staging_label)?;

    if json {
        emit(serde_json::json!({
            "event": "staging_healthy",
            "environment": staging.environment,
            "health_percentage": staging.health_percentage,
            "total": staging.total,
        }))?;
    } else {
        println!(
            "Staging '{staging_label}' is healthy: {} stacks at {}%",
            staging.total, staging.health_percentage
        );
    }

    let candidates = promotion_candidates(gateway, staging_label, production_label)?;

    if candidates.is_empty() {
        if json {
            emit(serde_json::json!({
                "event": "promotion_complete",
                "triggered": 0,
                "failed": 0,
            }))?;
        } else {
            println!("No production stacks match a staging counterpart. Nothing to promote.");
        }
        return Ok(());
    }

    if !json {
        println!();
        println!("Promotion candidates:");
        for candidate in &candidates {
            println!(
                "  {} <- {}",
                candidate.production.name, candidate.staging.name
            );
        }
        println!();
    }

    if !yes {
        let proceed = Confirm::new()
            .with_prompt(format!("Promote {} stack(s) to production?", candidates.len()))
            .default(false)
            .interact()?;
        if !proceed {
            println!("Promotion cancelled.");
            return Ok(());
        }
    }

    let outcomes = trigger_candidates(gateway, &candidates);

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
            "event": "promotion_complete",
            "triggered": outcomes.len() - failed,
            "failed": failed,
        }))?;
    } else {
        println!();
        println!("{} triggered, {failed} failed", outcomes.len() - failed);
        println!("Production runs stop in UNCONFIRMED; approve them with 'liftgate confirm <run-id>'.");
    }

    if failed > 0 {
        process::exit(1);
    }
    Ok(())
}
