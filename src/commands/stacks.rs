//! Stack listing and detail views

use anyhow::Result;

use liftgate::gateway::Gateway;

/// Execute the stacks command
pub fn cmd_stacks(gateway: &dyn Gateway, json: bool) -> Result<()> {
    let stacks = gateway.list_stacks()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stacks)?);
        return Ok(());
    }

    if stacks.is_empty() {
        println!("No stacks found.");
        return Ok(());
    }

    for stack in &stacks {
        let space = stack
            .space
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or("root");
        let lock = match &stack.locked_by {
            Some(who) => format!(" [locked by {who}]"),
            None => String::new(),
        };
        println!("{}: {} (space: {space}){lock}", stack.name, stack.state);
    }
    println!();
    println!("{} stacks", stacks.len());

    Ok(())
}

/// Execute the stack detail command
pub fn cmd_stack_detail(gateway: &dyn Gateway, id: &str, json: bool) -> Result<()> {
    let stack = gateway.stack_detail(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stack)?);
        return Ok(());
    }

    println!("{} ({})", stack.name, stack.id);
    println!("  State:      {}", stack.state);
    if let Some(repository) = &stack.repository {
        let branch = stack.branch.as_deref().unwrap_or("-");
        println!("  Repository: {repository} @ {branch}");
    }
    if !stack.labels.is_empty() {
        println!("  Labels:     {}", stack.labels.join(", "));
    }
    if let Some(who) = &stack.locked_by {
        println!("  Locked by:  {who}");
    }
    if let Some(autodeploy) = stack.autodeploy {
        println!("  Autodeploy: {autodeploy}");
    }

    if stack.attached_policies.is_empty() {
        println!("  Policies:   none");
    } else {
        let names: Vec<_> = stack
            .attached_policies
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        println!("  Policies:   {}", names.join(", "));
    }

    println!("  Resources:  {}", stack.resources.len());

    if !stack.runs.is_empty() {
        println!();
        println!("Recent runs:");
        for run in &stack.runs {
            println!(
                "  {} {} {} ({})",
                run.created_at.format("%Y-%m-%d %H:%M"),
                run.id,
                run.state,
                run.kind
            );
        }
    }

    Ok(())
}
