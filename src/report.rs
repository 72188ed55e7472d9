//! Compliance report generation
//!
//! One violation list, two renderings: a machine-readable JSON document and
//! a human-readable text layout. Both are produced from the same data; the
//! report never re-scans.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::compliance::{by_severity, ComplianceViolation, Severity};

/// Per-severity and total violation counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// A one-shot compliance report
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
    pub violations: BTreeMap<Severity, Vec<ComplianceViolation>>,
}

impl ComplianceReport {
    pub fn from_violations(violations: Vec<ComplianceViolation>, generated_at: DateTime<Utc>) -> Self {
        let partitions = by_severity(violations);
        let count = |s: Severity| partitions.get(&s).map_or(0, Vec::len);

        let summary = ReportSummary {
            total: partitions.values().map(Vec::len).sum(),
            critical: count(Severity::Critical),
            high: count(Severity::High),
            medium: count(Severity::Medium),
            low: count(Severity::Low),
        };

        Self {
            generated_at,
            summary,
            violations: partitions,
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Render the human-readable text layout
    pub fn render_text(&self) -> String {
        let mut lines = vec![
            "=".repeat(60),
            "SPACELIFT COMPLIANCE REPORT".to_string(),
            format!("Generated: {}", self.generated_at.to_rfc3339()),
            "=".repeat(60),
            String::new(),
            "SUMMARY".to_string(),
            "-".repeat(40),
            format!("Total Violations: {}", self.summary.total),
            format!("  Critical: {}", self.summary.critical),
            format!("  High:     {}", self.summary.high),
            format!("  Medium:   {}", self.summary.medium),
            format!("  Low:      {}", self.summary.low),
            String::new(),
        ];

        for severity in Severity::ALL {
            let Some(violations) = self.violations.get(&severity) else {
                continue;
            };
            if violations.is_empty() {
                continue;
            }

            lines.push(format!("{} VIOLATIONS", severity.to_string().to_uppercase()));
            lines.push("-".repeat(40));
            for v in violations {
                lines.push(format!("  Stack: {}", v.stack_name));
                lines.push(format!("  Check: {}", v.check_name));
                lines.push(format!("  Issue: {}", v.description));
                lines.push(String::new());
            }
        }

        if self.summary.total == 0 {
            lines.push("No compliance violations found.".to_string());
        }

        lines.join("\n")
    }
}
