//! Error types for Liftgate
//!
//! Uses `thiserror` for library errors. Every failure path is either a typed
//! variant here or an explicit negative entry in a batch result - nothing is
//! swallowed.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::RunState;

/// Result type alias for Liftgate operations
pub type LiftgateResult<T> = Result<T, LiftgateError>;

/// Main error type for Liftgate operations
#[derive(Error, Debug)]
pub enum LiftgateError {
    /// Any failure talking to the remote platform: transport, non-2xx status,
    /// GraphQL error payload, or a response that does not match the expected
    /// shape. Never retried here - retry policy belongs to callers.
    #[error("remote operation '{operation}' failed: {cause}")]
    RemoteOperationFailed { operation: String, cause: String },

    /// The poll deadline lapsed while the run was still in-flight.
    ///
    /// Never raised for a terminal or UNCONFIRMED run - those are returned
    /// to the caller as-is.
    #[error("run {run_id} did not reach a terminal state in time (last state: {last_state})")]
    RunTimedOut { run_id: String, last_state: RunState },

    /// The caller-supplied cancellation signal fired mid-wait.
    #[error("wait for run {run_id} interrupted (last state: {last_state})")]
    WaitInterrupted { run_id: String, last_state: RunState },

    /// Promotion precondition failure - expected and user-actionable.
    #[error(
        "staging environment is not healthy: {failed} failed stacks, {health_percentage}% healthy"
    )]
    StagingUnhealthy { failed: usize, health_percentage: f64 },

    /// A required credential was found neither in the environment nor in the
    /// config file.
    #[error("missing credential: set {variable} or add it to the config file")]
    MissingCredential { variable: String },

    /// Config file exists but could not be parsed
    #[error("invalid config file {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
