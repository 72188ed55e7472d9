//! Environment health aggregation
//!
//! Derived aggregates only: every call recomputes from a fresh stack snapshot,
//! nothing is cached here.

use serde::Serialize;

use crate::error::LiftgateResult;
use crate::gateway::Gateway;
use crate::models::{RunState, Stack};

/// Per-stack line in an environment status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackSummary {
    pub name: String,
    pub state: RunState,
    pub locked: bool,
}

/// Aggregate health of one environment label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentStatus {
    pub environment: String,
    pub total: usize,
    pub healthy: usize,
    pub failed: usize,
    pub running: usize,
    pub locked: usize,
    /// Percentage of stacks in FINISHED state, rounded to one decimal.
    /// 0.0 for an empty environment.
    pub health_percentage: f64,
    pub stacks: Vec<StackSummary>,
}

impl EnvironmentStatus {
    /// The promotion gate: no failed stacks and every stack healthy
    pub fn is_healthy(&self) -> bool {
        self.failed == 0 && self.health_percentage >= 100.0
    }
}

/// Compute the status of all stacks carrying `label` from a fresh snapshot
pub fn environment_status(gateway: &dyn Gateway, label: &str) -> LiftgateResult<EnvironmentStatus> {
    let stacks = gateway.stacks_by_label(label)?;
    Ok(aggregate(label, &stacks))
}

/// Same aggregate over the whole fleet, regardless of labels
pub fn fleet_overview(gateway: &dyn Gateway) -> LiftgateResult<EnvironmentStatus> {
    let stacks = gateway.list_stacks()?;
    Ok(aggregate("all", &stacks))
}

/// Pure aggregation over a snapshot
pub fn aggregate(environment: &str, stacks: &[Stack]) -> EnvironmentStatus {
    let healthy = stacks
        .iter()
        .filter(|s| s.state == RunState::Finished)
        .count();
    let failed = stacks
        .iter()
        .filter(|s| s.state == RunState::Failed)
        .count();
    let running = stacks
        .iter()
        .filter(|s| {
            matches!(
                s.state,
                RunState::Queued | RunState::Preparing | RunState::Running
            )
        })
        .count();
    let locked = stacks.iter().filter(|s| s.is_locked()).count();

    let health_percentage = if stacks.is_empty() {
        0.0
    } else {
        let pct = (healthy as f64 / stacks.len() as f64) * 100.0;
        (pct * 10.0).round() / 10.0
    };

    EnvironmentStatus {
        environment: environment.to_string(),
        total: stacks.len(),
        healthy,
        failed,
        running,
        locked,
        health_percentage,
        stacks: stacks
            .iter()
            .map(|s| StackSummary {
                name: s.name.clone(),
                state: s.state,
                locked: s.is_locked(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::stack;

    #[test]
    fn test_aggregate_counts() {
        let mut locked_stack = stack("d-staging", RunState::Finished, &["staging"]);
        locked_stack.locked_by = Some("bob".to_string());

        let stacks = vec![
            stack("a-staging", RunState::Finished, &["staging"]),
            stack("b-staging", RunState::Failed, &["staging"]),
            stack("c-staging", RunState::Running, &["staging"]),
            locked_stack,
        ];

        let status = aggregate("staging", &stacks);

        assert_eq!(status.total, 4);
        assert_eq!(status.healthy, 2);
        assert_eq!(status.failed, 1);
        assert_eq!(status.running, 1);
        assert_eq!(status.locked, 1);
        assert_eq!(status.health_percentage, 50.0);
        assert!(!status.is_healthy());
    }

    #[test]
    fn test_aggregate_rounds_to_one_decimal() {
        let stacks = vec![
            stack("a", RunState::Finished, &[]),
            stack("b", RunState::Finished, &[]),
            stack("c", RunState::Running, &[]),
        ];

        let status = aggregate("dev", &stacks);
        // 2/3 = 66.666..., rounded to one decimal
        assert_eq!(status.health_percentage, 66.7);
    }

    #[test]
    fn test_aggregate_empty_environment() {
        let status = aggregate("ghost", &[]);

        assert_eq!(status.total, 0);
        assert_eq!(status.health_percentage, 0.0);
        assert!(status.stacks.is_empty());
        // An empty environment is not healthy enough to gate a promotion
        assert!(!status.is_healthy());
    }

    #[test]
    fn test_aggregate_fully_healthy() {
        let stacks = vec![
            stack("a", RunState::Finished, &[]),
            stack("b", RunState::Finished, &[]),
        ];

        let status = aggregate("staging", &stacks);
        assert!(status.is_healthy());
        assert_eq!(status.health_percentage, 100.0);
    }

    #[test]
    fn test_unconfirmed_counts_neither_healthy_nor_running() {
        let stacks = vec![stack("a", RunState::Unconfirmed, &[])];

        let status = aggregate("staging", &stacks);
        assert_eq!(status.healthy, 0);
        assert_eq!(status.running, 0);
        assert_eq!(status.failed, 0);
    }
}
