//! Compliance scan command

use std::fs;
use std::path::Path;
use std::process;

use anyhow::Result;
use chrono::Utc;

use liftgate::compliance::ComplianceScanner;
use liftgate::gateway::Gateway;
use liftgate::report::ComplianceReport;

/// Execute the scan command: fetch a fresh detailed snapshot, evaluate every
/// registered check, and render a report. Exits non-zero when any violation
/// is found, so CI can gate on compliance.
pub fn cmd_scan(
    gateway: &dyn Gateway,
    label: Option<&str>,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let now = Utc::now();
    let scanner = ComplianceScanner::new();
    let violations = scanner.scan(gateway, label, now)?;
    let report = ComplianceReport::from_violations(violations, now);

    if let Some(path) = output {
        fs::write(path, report.to_json())?;
        if !json {
            println!("JSON report saved to {}", path.display());
            println!();
        }
    }

    if json {
        println!("{}", report.to_json());
    } else {
        println!("{}", report.render_text());
    }

    if report.summary.total > 0 {
        process::exit(1);
    }
    Ok(())
}
