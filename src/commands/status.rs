//! Environment health views

use anyhow::Result;

use liftgate::gateway::Gateway;
use liftgate::status::{environment_status, fleet_overview, EnvironmentStatus};

/// Execute the status command for one environment label
pub fn cmd_status(gateway: &dyn Gateway, environment: &str, json: bool) -> Result<()> {
    let status = environment_status(gateway, environment)?;
    render(&status, json)
}

/// Execute the overview command across the whole fleet
pub fn cmd_overview(gateway: &dyn Gateway, json: bool) -> Result<()> {
    let status = fleet_overview(gateway)?;
    render(&status, json)
}

fn render(status: &EnvironmentStatus, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(status)?);
        return Ok(());
    }

    println!("Environment: {}", status.environment);
    println!(
        "Stacks: {} total, {} healthy, {} failed, {} running, {} locked",
        status.total, status.healthy, status.failed, status.running, status.locked
    );
    println!("Health: {}%", status.health_percentage);

    if !status.stacks.is_empty() {
        println!();
        for stack in &status.stacks {
            let lock = if stack.locked { " [locked]" } else { "" };
            println!("  {}: {}{lock}", stack.name, stack.state);
        }
    }

    Ok(())
}
