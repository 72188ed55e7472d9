//! Environment promotion and batch triggering
//!
//! Pairs production stacks with their staging counterparts by deterministic
//! name rewrite, gates promotion on aggregate staging health, and triggers
//! the matched production stacks with per-item outcome capture. Triggered
//! runs are not polled here: production runs characteristically stop in
//! UNCONFIRMED, so the caller decides whether to await confirmation.

use serde::Serialize;

use crate::error::{LiftgateError, LiftgateResult};
use crate::gateway::Gateway;
use crate::models::Stack;
use crate::status::{environment_status, EnvironmentStatus};

/// A production stack paired with its staging counterpart.
///
/// Transient: exists only for the duration of one promotion invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionCandidate {
    pub production: Stack,
    pub staging: Stack,
}

/// Per-stack result of a batch trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerStatus {
    Triggered,
    Failed,
}

/// One entry in a batch trigger report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerOutcome {
    pub stack_name: String,
    pub stack_id: String,
    pub run_id: Option<String>,
    pub status: TriggerStatus,
    pub error: Option<String>,
}

/// Full result of one promotion invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionResult {
    pub staging: EnvironmentStatus,
    pub outcomes: Vec<TriggerOutcome>,
}

impl PromotionResult {
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == TriggerStatus::Failed)
            .count()
    }
}

/// Verify the staging gate: zero failed stacks and 100% health.
///
/// This is a hard precondition, not a warning - it fails before any mutation
/// is attempted.
pub fn check_staging_health(
    gateway: &dyn Gateway,
    staging_label: &str,
) -> LiftgateResult<EnvironmentStatus> {
    let status = environment_status(gateway, staging_label)?;
    if !status.is_healthy() {
        return Err(LiftgateError::StagingUnhealthy {
            failed: status.failed,
            health_percentage: status.health_percentage,
        });
    }
    Ok(status)
}

/// Derive the staging counterpart name for a production stack:
/// strip the production suffix, append the staging suffix.
fn staging_name_for(production_name: &str, production_label: &str, staging_label: &str) -> String {
    let production_suffix = format!("-{production_label}");
    let base = production_name
        .strip_suffix(production_suffix.as_str())
        .unwrap_or(production_name);
    format!("{base}-{staging_label}")
}

/// Pair every production stack with the staging stack whose name matches the
/// deterministic rewrite exactly. Production stacks with no match are
/// silently excluded - partial fleets are expected, not an error.
pub fn find_candidates(
    production: &[Stack],
    staging: &[Stack],
    production_label: &str,
    staging_label: &str,
) -> Vec<PromotionCandidate> {
    production
        .iter()
        .filter_map(|prod| {
            let wanted = staging_name_for(&prod.name, production_label, staging_label);
            staging
                .iter()
                .find(|s| s.name == wanted)
                .map(|staging_match| PromotionCandidate {
                    production: prod.clone(),
                    staging: staging_match.clone(),
                })
        })
        .collect()
}

/// Fetch both environments and compute the candidate set
pub fn promotion_candidates(
    gateway: &dyn Gateway,
    staging_label: &str,
    production_label: &str,
) -> LiftgateResult<Vec<PromotionCandidate>> {
    let staging = gateway.stacks_by_label(staging_label)?;
    let production = gateway.stacks_by_label(production_label)?;
    Ok(find_candidates(
        &production,
        &staging,
        production_label,
        staging_label,
    ))
}

/// Trigger each candidate's production stack in order.
///
/// One stack's trigger failure never aborts the batch: it is recorded as a
/// failed outcome and the remaining candidates still trigger. The report has
/// exactly one entry per candidate, in candidate order.
pub fn trigger_candidates(
    gateway: &dyn Gateway,
    candidates: &[PromotionCandidate],
) -> Vec<TriggerOutcome> {
    candidates
        .iter()
        .map(|c| trigger_stack(gateway, &c.production))
        .collect()
}

/// Trigger runs for every stack carrying an environment label, with the same
/// per-item outcome semantics as a promotion batch.
pub fn deploy_environment(
    gateway: &dyn Gateway,
    label: &str,
) -> LiftgateResult<Vec<TriggerOutcome>> {
    let stacks = gateway.stacks_by_label(label)?;
    Ok(stacks
        .iter()
        .map(|stack| trigger_stack(gateway, stack))
        .collect())
}

fn trigger_stack(gateway: &dyn Gateway, stack: &Stack) -> TriggerOutcome {
    match gateway.trigger_run(&stack.id, None) {
        Ok(run) => TriggerOutcome {
            stack_name: stack.name.clone(),
            stack_id: stack.id.clone(),
            run_id: Some(run.id),
            status: TriggerStatus::Triggered,
            error: None,
        },
        Err(e) => TriggerOutcome {
            stack_name: stack.name.clone(),
            stack_id: stack.id.clone(),
            run_id: None,
            status: TriggerStatus::Failed,
            error: Some(e.to_string()),
        },
    }
}

/// Run the full promotion: health gate, candidate discovery, sequential
/// triggering. Zero candidates is a valid empty result - the environments
/// are in sync.
pub fn promote(
    gateway: &dyn Gateway,
    staging_label: &str,
    production_label: &str,
) -> LiftgateResult<PromotionResult> {
    let staging = check_staging_health(gateway, staging_label)?;
    let candidates = promotion_candidates(gateway, staging_label, production_label)?;
    let outcomes = trigger_candidates(gateway, &candidates);
    Ok(PromotionResult { staging, outcomes })
}
