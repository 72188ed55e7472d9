//! Remote operations gateway
//!
//! `Gateway` is the seam between the core logic and the orchestration
//! platform. Every operation is a synchronous round-trip; every failure is
//! normalized into `LiftgateError::RemoteOperationFailed`. The gateway never
//! retries silently - retry policy belongs to callers.

mod http;

pub use http::HttpGateway;

use crate::error::LiftgateResult;
use crate::models::{LockHandle, Run, RunHandle, Stack, StackDetail};

/// Typed operations against the remote platform
pub trait Gateway {
    /// List all stacks visible to the API key
    fn list_stacks(&self) -> LiftgateResult<Vec<Stack>>;

    /// All stacks carrying a specific environment label.
    ///
    /// The platform has no label filter on the list query, so this filters
    /// client-side over a fresh snapshot.
    fn stacks_by_label(&self, label: &str) -> LiftgateResult<Vec<Stack>> {
        Ok(self
            .list_stacks()?
            .into_iter()
            .filter(|s| s.has_label(label))
            .collect())
    }

    /// One stack with embedded recent runs, policies and resources
    fn stack_detail(&self, id: &str) -> LiftgateResult<StackDetail>;

    /// All stacks with the detail fields the compliance checks evaluate
    fn list_stack_details(&self) -> LiftgateResult<Vec<StackDetail>>;

    /// Run details including policy receipts
    fn run(&self, id: &str) -> LiftgateResult<Run>;

    /// Trigger a new run. Returns immediately with an initial state, not a
    /// terminal one.
    fn trigger_run(&self, stack_id: &str, commit_sha: Option<&str>) -> LiftgateResult<Run>;

    /// Approve a run that is waiting in UNCONFIRMED
    fn confirm_run(&self, run_id: &str) -> LiftgateResult<RunHandle>;

    /// Cancel a run with a note
    fn cancel_run(&self, run_id: &str, note: &str) -> LiftgateResult<RunHandle>;

    /// Lock a stack with a note
    fn lock_stack(&self, stack_id: &str, note: &str) -> LiftgateResult<LockHandle>;

    /// Release a stack lock
    fn unlock_stack(&self, stack_id: &str) -> LiftgateResult<LockHandle>;
}
