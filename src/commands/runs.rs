//! Run lifecycle commands: trigger, wait, confirm, cancel

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;

use liftgate::gateway::Gateway;
use liftgate::models::RunState;
use liftgate::monitor::{await_run, SystemClock, WaitOptions};

use crate::output::emit;

/// Execute the trigger command
pub fn cmd_trigger(
    gateway: &dyn Gateway,
    stack_id: &str,
    commit_sha: Option<&str>,
    wait: bool,
    options: WaitOptions,
    json: bool,
) -> Result<()> {
    let run = gateway.trigger_run(stack_id, commit_sha)?;

    if json {
        emit(serde_json::json!({
            "event": "triggered",
            "stack_id": stack_id,
            "run_id": run.id,
            "state": run.state,
        }))?;
    } else {
        println!("Triggered run {} ({})", run.id, run.state);
    }

    if wait {
        return cmd_wait(gateway, &run.id, options, json);
    }
    Ok(())
}

/// Execute the wait command: poll a run to a terminal or actionable state.
///
/// Ctrl-C flips the cancellation flag; the loop notices it at the next poll
/// boundary and exits with the last observed state instead of hanging.
pub fn cmd_wait(
    gateway: &dyn Gateway,
    run_id: &str,
    options: WaitOptions,
    json: bool,
) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;

    let run = await_run(gateway, &SystemClock, run_id, options, &running)?;

    if json {
        emit(serde_json::json!({
            "event": "run_stopped",
            "run_id": run.id,
            "state": run.state,
        }))?;
    }

    match run.state {
        RunState::Finished => {
            if !json {
                println!("Run {} finished.", run.id);
            }
            Ok(())
        }
        RunState::Unconfirmed => {
            if !json {
                println!("Run {} is waiting for confirmation.", run.id);
                println!("Approve it with: liftgate confirm {}", run.id);
            }
            Ok(())
        }
        state => {
            if !json {
                eprintln!("Run {} ended in {state}.", run.id);
            }
            process::exit(1);
        }
    }
}

/// Execute the confirm command
pub fn cmd_confirm(gateway: &dyn Gateway, run_id: &str, json: bool) -> Result<()> {
    let handle = gateway.confirm_run(run_id)?;

    if json {
        emit(serde_json::json!({
            "event": "confirmed",
            "run_id": handle.id,
            "state": handle.state,
        }))?;
    } else {
        println!("Confirmed run {} ({})", handle.id, handle.state);
    }
    Ok(())
}

/// Execute the cancel command
pub fn cmd_cancel(gateway: &dyn Gateway, run_id: &str, note: &str, json: bool) -> Result<()> {
    let handle = gateway.cancel_run(run_id, note)?;

    if json {
        emit(serde_json::json!({
            "event": "canceled",
            "run_id": handle.id,
            "state": handle.state,
        }))?;
    } else {
        println!("Canceled run {} ({})", handle.id, handle.state);
    }
    Ok(())
}
