//! CLI command handlers
//!
//! Each handler takes the gateway seam plus its parsed arguments, renders
//! either human-readable text or NDJSON events, and maps operational
//! failures to a non-zero exit.

pub mod deploy;
pub mod locks;
pub mod promote;
pub mod runs;
pub mod scan;
pub mod stacks;
pub mod status;
