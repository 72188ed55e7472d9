//! Remote payload records
//!
//! Explicit record types for every response shape the platform returns:
//! - `Stack` / `StackDetail`: managed infrastructure-as-code units
//! - `Run`: one asynchronous execution against a stack
//! - Supporting types: `RunState`, `RunKind`, `Delta`, `Policy`, `PolicyReceipt`
//!
//! Payloads that do not match these shapes are rejected at the deserialization
//! boundary; loosely-typed maps never travel through the core logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a run (and of a stack, which reports the state of its
/// most recent run).
///
/// `QUEUED`, `PREPARING` and `RUNNING` are in-flight; `UNCONFIRMED` is a
/// stopping point that requires human approval; the rest are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Queued,
    Preparing,
    Running,
    Unconfirmed,
    Finished,
    Failed,
    Canceled,
    Discarded,
    /// Any state the platform adds that we do not know about. Treated as
    /// in-flight by the run monitor, so new platform states keep polling
    /// instead of failing deserialization.
    #[serde(other)]
    Unknown,
}

impl RunState {
    /// Terminal states: no further transition without a new trigger.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Finished | RunState::Failed | RunState::Canceled | RunState::Discarded
        )
    }

    /// Still working: neither terminal nor awaiting confirmation.
    pub fn is_in_flight(&self) -> bool {
        !self.is_terminal() && *self != RunState::Unconfirmed
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunState::Queued => "QUEUED",
            RunState::Preparing => "PREPARING",
            RunState::Running => "RUNNING",
            RunState::Unconfirmed => "UNCONFIRMED",
            RunState::Finished => "FINISHED",
            RunState::Failed => "FAILED",
            RunState::Canceled => "CANCELED",
            RunState::Discarded => "DISCARDED",
            RunState::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

/// Kind of run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunKind {
    /// Deployment of a tracked change
    Tracked,
    /// Preview run for a proposed change
    Proposed,
    /// Scheduled check for out-of-band changes
    DriftDetection,
    /// One-off task
    Task,
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for RunKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunKind::Tracked => "TRACKED",
            RunKind::Proposed => "PROPOSED",
            RunKind::DriftDetection => "DRIFT_DETECTION",
            RunKind::Task => "TASK",
            RunKind::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

/// Resource change summary reported by a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    #[serde(default)]
    pub add_count: i64,
    #[serde(default)]
    pub change_count: i64,
    #[serde(default)]
    pub delete_count: i64,
}

/// A policy attached to a stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Outcome of one policy evaluation against a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyReceipt {
    pub policy: Policy,
    pub outcome: String,
    #[serde(default)]
    pub denies: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// One asynchronous execution against a stack.
///
/// Created by a trigger mutation and mutated only by the platform; Liftgate
/// never holds a run beyond the scope of one polling loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: String,
    pub state: RunState,
    #[serde(default, rename = "type")]
    pub kind: RunKind,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub triggered_by: Option<String>,
    #[serde(default)]
    pub delta: Option<Delta>,
    #[serde(default)]
    pub policy_receipts: Vec<PolicyReceipt>,
}

/// Minimal run acknowledgment returned by confirm and cancel mutations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHandle {
    pub id: String,
    pub state: RunState,
}

/// Lock state acknowledgment returned by lock and unlock mutations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockHandle {
    pub id: String,
    #[serde(default)]
    pub locked_by: Option<String>,
}

/// The space a stack lives in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    pub name: String,
}

/// A managed stack as returned by list queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: RunState,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub locked_by: Option<String>,
    #[serde(default)]
    pub space: Option<Space>,
}

impl Stack {
    /// Whether the stack carries the given environment label
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn is_locked(&self) -> bool {
        self.locked_by.is_some()
    }
}

/// An infrastructure resource managed by a stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedResource {
    pub id: String,
    pub address: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// A stack with its attached policies and recent runs embedded.
///
/// `runs` are ordered newest-first, as the platform returns them. This is the
/// snapshot the compliance checks evaluate and the detail view renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: RunState,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub locked_by: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub project_root: Option<String>,
    #[serde(default)]
    pub autodeploy: Option<bool>,
    #[serde(default)]
    pub attached_policies: Vec<Policy>,
    #[serde(default)]
    pub runs: Vec<Run>,
    #[serde(default)]
    pub resources: Vec<ManagedResource>,
}

impl StackDetail {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn is_locked(&self) -> bool {
        self.locked_by.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_run_state_terminal_set() {
        assert!(RunState::Finished.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(RunState::Canceled.is_terminal());
        assert!(RunState::Discarded.is_terminal());

        assert!(!RunState::Queued.is_terminal());
        assert!(!RunState::Preparing.is_terminal());
        assert!(!RunState::Running.is_terminal());
        assert!(!RunState::Unconfirmed.is_terminal());
    }

    #[test]
    fn test_run_state_in_flight_excludes_unconfirmed() {
        assert!(RunState::Queued.is_in_flight());
        assert!(RunState::Preparing.is_in_flight());
        assert!(RunState::Running.is_in_flight());
        assert!(RunState::Unknown.is_in_flight());

        assert!(!RunState::Unconfirmed.is_in_flight());
        assert!(!RunState::Finished.is_in_flight());
    }

    #[test]
    fn test_run_state_deserialize_screaming_snake() {
        let state: RunState = serde_json::from_str("\"UNCONFIRMED\"").unwrap();
        assert_eq!(state, RunState::Unconfirmed);

        let state: RunState = serde_json::from_str("\"FINISHED\"").unwrap();
        assert_eq!(state, RunState::Finished);
    }

    #[test]
    fn test_run_state_unknown_value_does_not_fail() {
        let state: RunState = serde_json::from_str("\"REPLAN_REQUESTED\"").unwrap();
        assert_eq!(state, RunState::Unknown);
        assert!(state.is_in_flight());
    }

    #[test]
    fn test_run_deserialize_trigger_response() {
        // runTrigger returns only id, state and createdAt
        let json = r#"{"id": "run-42", "state": "QUEUED", "createdAt": "2026-03-01T12:00:00Z"}"#;
        let run: Run = serde_json::from_str(json).unwrap();

        assert_eq!(run.id, "run-42");
        assert_eq!(run.state, RunState::Queued);
        assert_eq!(run.kind, RunKind::Unknown); // default
        assert!(run.finished_at.is_none());
        assert!(run.policy_receipts.is_empty());
        assert_eq!(
            run.created_at,
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_run_deserialize_full() {
        let json = r#"{
            "id": "run-7",
            "state": "FINISHED",
            "type": "TRACKED",
            "createdAt": "2026-03-01T12:00:00+02:00",
            "finishedAt": "2026-03-01T12:10:00+02:00",
            "triggeredBy": "ci",
            "delta": {"addCount": 1, "changeCount": 2, "deleteCount": 0},
            "policyReceipts": [
                {
                    "policy": {"name": "deny-destroy", "type": "PLAN"},
                    "outcome": "allow",
                    "denies": [],
                    "warnings": ["wide change set"]
                }
            ]
        }"#;
        let run: Run = serde_json::from_str(json).unwrap();

        assert_eq!(run.kind, RunKind::Tracked);
        assert_eq!(run.triggered_by.as_deref(), Some("ci"));
        assert_eq!(run.delta.unwrap().change_count, 2);
        assert_eq!(run.policy_receipts.len(), 1);
        assert_eq!(run.policy_receipts[0].warnings.len(), 1);
        // Offset timestamps normalize to UTC
        assert_eq!(
            run.created_at,
            Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_run_missing_id_rejected() {
        let json = r#"{"state": "QUEUED", "createdAt": "2026-03-01T12:00:00Z"}"#;
        let result: Result<Run, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_stack_deserialize() {
        let json = r#"{
            "id": "billing-production",
            "name": "billing-production",
            "description": null,
            "state": "FINISHED",
            "labels": ["production", "team:payments"],
            "lockedBy": "alice",
            "space": {"id": "root", "name": "root"}
        }"#;
        let stack: Stack = serde_json::from_str(json).unwrap();

        assert!(stack.has_label("production"));
        assert!(!stack.has_label("staging"));
        assert!(stack.is_locked());
        assert_eq!(stack.space.unwrap().name, "root");
    }

    #[test]
    fn test_stack_detail_defaults_for_missing_collections() {
        let json = r#"{"id": "s1", "name": "s1", "state": "FAILED"}"#;
        let detail: StackDetail = serde_json::from_str(json).unwrap();

        assert!(detail.labels.is_empty());
        assert!(detail.attached_policies.is_empty());
        assert!(detail.runs.is_empty());
        assert!(!detail.is_locked());
    }

    #[test]
    fn test_run_kind_serde() {
        let kind: RunKind = serde_json::from_str("\"DRIFT_DETECTION\"").unwrap();
        assert_eq!(kind, RunKind::DriftDetection);

        let kind: RunKind = serde_json::from_str("\"TRACKED\"").unwrap();
        assert_eq!(kind, RunKind::Tracked);

        let kind: RunKind = serde_json::from_str("\"DESTROY\"").unwrap();
        assert_eq!(kind, RunKind::Unknown);
    }
}
