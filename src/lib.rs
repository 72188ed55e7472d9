//! Liftgate - operational governance for Spacelift stacks
//!
//! Liftgate automates governance of infrastructure-as-code stacks managed by
//! a remote orchestration platform: promoting changes from staging to
//! production behind a health gate, polling deployment runs to a terminal or
//! actionable state, and scanning the fleet for compliance violations.

pub mod compliance;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod monitor;
pub mod promote;
pub mod report;
pub mod status;

// Re-exports for convenience
pub use compliance::{by_severity, ComplianceCheck, ComplianceScanner, ComplianceViolation, Severity};
pub use config::{Config, Credentials};
pub use error::{LiftgateError, LiftgateResult};
pub use gateway::{Gateway, HttpGateway};
pub use models::{Run, RunKind, RunState, Stack, StackDetail};
pub use monitor::{await_run, Clock, SystemClock, WaitOptions};
pub use promote::{promote, PromotionCandidate, PromotionResult, TriggerOutcome, TriggerStatus};
pub use report::ComplianceReport;
pub use status::{environment_status, fleet_overview, EnvironmentStatus};
