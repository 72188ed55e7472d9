//! Stack lock commands

use anyhow::Result;

use liftgate::gateway::Gateway;

use crate::output::emit;

/// Execute the lock command
pub fn cmd_lock(gateway: &dyn Gateway, stack_id: &str, note: &str, json: bool) -> Result<()> {
    let handle = gateway.lock_stack(stack_id, note)?;

    if json {
        emit(serde_json::json!({
            "event": "locked",
            "stack_id": handle.id,
            "locked_by": handle.locked_by,
        }))?;
    } else {
        match &handle.locked_by {
            Some(who) => println!("Locked {} (held by {who})", handle.id),
            None => println!("Locked {}", handle.id),
        }
    }
    Ok(())
}

/// Execute the unlock command
pub fn cmd_unlock(gateway: &dyn Gateway, stack_id: &str, json: bool) -> Result<()> {
    let handle = gateway.unlock_stack(stack_id)?;

    if json {
        emit(serde_json::json!({
            "event": "unlocked",
            "stack_id": handle.id,
        }))?;
    } else {
        println!("Unlocked {}", handle.id);
    }
    Ok(())
}
