//! Compliance engine
//!
//! A registry of independent checks applied uniformly to every stack in a
//! snapshot. Each check is a tagged record: name, description, severity and a
//! pure evaluation function from one stack snapshot to an optional finding.
//! There is no inheritance hierarchy and no ordering dependency between
//! checks; a stack may produce zero, one, or many violations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::LiftgateResult;
use crate::gateway::Gateway;
use crate::models::{RunKind, RunState, StackDetail};

/// How many recent runs the run-history checks look at
const RUN_WINDOW: usize = 5;

/// Maximum age of the most recent successful deployment
const DEPLOYMENT_MAX_AGE_DAYS: i64 = 30;

/// Ordered severity classification: critical > high > medium > low
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// All severities, highest first
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        };
        write!(f, "{s}")
    }
}

/// What a check found on one stack. The scanner turns this into a full
/// violation by stamping the check's identity and the detection time.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub description: String,
    pub details: serde_json::Value,
}

impl Finding {
    pub fn new(description: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            description: description.into(),
            details,
        }
    }
}

/// One compliance violation. Purely an output value - never persisted beyond
/// the generated report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceViolation {
    pub check_name: String,
    pub severity: Severity,
    pub stack_id: String,
    pub stack_name: String,
    pub description: String,
    pub details: serde_json::Value,
    pub detected_at: DateTime<Utc>,
}

/// Evaluation function: one stack snapshot plus the current instant in, an
/// optional finding out. `now` is explicit so results are deterministic
/// under test.
pub type CheckFn = Box<dyn Fn(&StackDetail, DateTime<Utc>) -> Option<Finding>>;

/// A registered compliance check
pub struct ComplianceCheck {
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub check: CheckFn,
}

impl ComplianceCheck {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        check: impl Fn(&StackDetail, DateTime<Utc>) -> Option<Finding> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            severity,
            check: Box::new(check),
        }
    }
}

/// Holds the check registry and applies it to snapshots.
///
/// The registry is fixed once constructed; adding a check never requires
/// touching the scan algorithm.
pub struct ComplianceScanner {
    checks: Vec<ComplianceCheck>,
}

impl ComplianceScanner {
    /// Scanner with the default check set registered
    pub fn new() -> Self {
        let mut scanner = Self::empty();
        scanner.register_default_checks();
        scanner
    }

    /// Scanner with no checks; callers register their own
    pub fn empty() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn add_check(&mut self, check: ComplianceCheck) {
        self.checks.push(check);
    }

    pub fn checks(&self) -> &[ComplianceCheck] {
        &self.checks
    }

    fn register_default_checks(&mut self) {
        self.add_check(ComplianceCheck::new(
            "production-drift-detection",
            "Production stacks must have drift detection enabled",
            Severity::High,
            check_drift_detection,
        ));
        self.add_check(ComplianceCheck::new(
            "policy-attached",
            "All stacks must have at least one policy attached",
            Severity::Critical,
            check_policy_attachment,
        ));
        self.add_check(ComplianceCheck::new(
            "no-stale-locks",
            "Stacks should not be locked for extended periods",
            Severity::Medium,
            check_stale_locks,
        ));
        self.add_check(ComplianceCheck::new(
            "recent-deployment",
            "Production stacks should have recent successful deployments",
            Severity::High,
            check_recent_deployment,
        ));
        self.add_check(ComplianceCheck::new(
            "no-failed-stacks",
            "Stacks should not be in failed state",
            Severity::High,
            check_failed_state,
        ));
    }

    /// Apply every registered check to every stack in the snapshot.
    ///
    /// Pure with respect to `stacks` and `now`: the same inputs produce the
    /// same violations.
    pub fn scan_snapshot(
        &self,
        stacks: &[StackDetail],
        now: DateTime<Utc>,
    ) -> Vec<ComplianceViolation> {
        let mut violations = Vec::new();
        for stack in stacks {
            for check in &self.checks {
                if let Some(finding) = (check.check)(stack, now) {
                    violations.push(ComplianceViolation {
                        check_name: check.name.clone(),
                        severity: check.severity,
                        stack_id: stack.id.clone(),
                        stack_name: stack.name.clone(),
                        description: finding.description,
                        details: finding.details,
                        detected_at: now,
                    });
                }
            }
        }
        violations
    }

    /// Fetch a fresh detailed snapshot and scan it, optionally restricted to
    /// stacks carrying `label_filter`.
    pub fn scan(
        &self,
        gateway: &dyn Gateway,
        label_filter: Option<&str>,
        now: DateTime<Utc>,
    ) -> LiftgateResult<Vec<ComplianceViolation>> {
        let mut stacks = gateway.list_stack_details()?;
        if let Some(label) = label_filter {
            stacks.retain(|s| s.has_label(label));
        }
        Ok(self.scan_snapshot(&stacks, now))
    }
}

impl Default for ComplianceScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Partition a flat violation list by severity. Every severity is present in
/// the result, possibly empty. A pure reduction - never a re-scan.
pub fn by_severity(
    violations: Vec<ComplianceViolation>,
) -> BTreeMap<Severity, Vec<ComplianceViolation>> {
    let mut partitions: BTreeMap<Severity, Vec<ComplianceViolation>> =
        Severity::ALL.iter().map(|s| (*s, Vec::new())).collect();
    for violation in violations {
        partitions
            .entry(violation.severity)
            .or_default()
            .push(violation);
    }
    partitions
}

/// Recent runs the history checks consider, newest first
fn run_window(stack: &StackDetail) -> impl Iterator<Item = &crate::models::Run> {
    stack.runs.iter().take(RUN_WINDOW)
}

/// Drift coverage is inferred from the recent run window rather than the
/// actual drift schedule configuration - a documented approximation carried
/// over from the platform API, which exposes no drift settings query.
fn check_drift_detection(stack: &StackDetail, _now: DateTime<Utc>) -> Option<Finding> {
    if !stack.has_label("production") {
        return None;
    }

    let has_drift_runs = run_window(stack).any(|r| r.kind == RunKind::DriftDetection);
    if has_drift_runs {
        return None;
    }

    let kinds: Vec<RunKind> = run_window(stack).map(|r| r.kind).collect();
    Some(Finding::new(
        "No drift detection runs found for production stack",
        serde_json::json!({ "last_5_runs": kinds }),
    ))
}

fn check_policy_attachment(stack: &StackDetail, _now: DateTime<Utc>) -> Option<Finding> {
    if !stack.attached_policies.is_empty() {
        return None;
    }
    Some(Finding::new(
        "Stack has no policies attached",
        serde_json::json!({}),
    ))
}

/// Lock presence alone is the signal; the platform does not report when the
/// lock was taken, so there is no duration tracking here.
fn check_stale_locks(stack: &StackDetail, _now: DateTime<Utc>) -> Option<Finding> {
    let locked_by = stack.locked_by.as_deref()?;
    Some(Finding::new(
        "Stack is currently locked",
        serde_json::json!({ "locked_by": locked_by }),
    ))
}

fn check_recent_deployment(stack: &StackDetail, now: DateTime<Utc>) -> Option<Finding> {
    if !stack.has_label("production") {
        return None;
    }

    let mut successes = run_window(stack)
        .filter(|r| r.state == RunState::Finished && r.kind == RunKind::Tracked);

    let Some(latest) = successes.next() else {
        return Some(Finding::new(
            "No recent successful deployments found",
            serde_json::json!({ "recent_runs": stack.runs.len() }),
        ));
    };

    // Timestamps arrive with explicit offsets and compare in UTC
    let age = now.signed_duration_since(latest.created_at);
    if age > chrono::Duration::days(DEPLOYMENT_MAX_AGE_DAYS) {
        return Some(Finding::new(
            "Last successful deployment was over 30 days ago",
            serde_json::json!({ "last_success": latest.created_at.to_rfc3339() }),
        ));
    }

    None
}

fn check_failed_state(stack: &StackDetail, _now: DateTime<Utc>) -> Option<Finding> {
    if stack.state != RunState::Failed {
        return None;
    }
    Some(Finding::new(
        "Stack is in FAILED state",
        serde_json::json!({ "state": "FAILED" }),
    ))
}
