//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output describes what was generated, not which bytes went where. The
//! primary line for every entity (category, role, list) is its positional
//! index and identity; file paths are secondary context on indented lines.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! Sources (hash 1a2b3c4d)
//!     methods.csv
//!     mapping.yaml
//!
//! Primary pools
//!     verify: 12 methods
//!     discover: 11 methods
//!
//! Categories
//! 001 core (5 methods)
//! 002 risk (3 methods)
//!
//! Roles
//! 001 architect
//!
//! Warnings
//!     primary_verify count is 9, recommended: 10-25
//!
//! Generated 9 files from 16 methods (1 stale file removed)
//! ```
//!
//! ## Check
//!
//! ```text
//! Stale: Source changed since last generation (1a2b3c4d → 5e6f7a8b)
//!     recorded: 1a2b3c4d
//!     current:  5e6f7a8b
//! ```
//!
//! ## Errors
//!
//! ```text
//! Error: Validation failed with 2 error(s):
//!   Missing description at line 3
//!   Unknown method 99 in primary_verify
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout (stderr for
//! errors). Format functions are pure.

use crate::freshness::{FreshnessReport, FreshnessStatus};
use crate::report::GenerationReport;
use crate::validate::Validation;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

fn warning_lines(warnings: &[String], lines: &mut Vec<String>) {
    if warnings.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push("Warnings".to_string());
    for warning in warnings {
        lines.push(format!("{}{}", indent(1), warning));
    }
}

// ============================================================================
// Generate
// ============================================================================

pub fn format_generate_report(report: &GenerationReport) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!("Sources (hash {})", report.fingerprint));
    for source in &report.sources {
        lines.push(format!("{}{}", indent(1), source));
    }

    lines.push(String::new());
    lines.push("Primary pools".to_string());
    lines.push(format!(
        "{}verify: {}",
        indent(1),
        count(report.primary_verify_count, "method", "methods")
    ));
    lines.push(format!(
        "{}discover: {}",
        indent(1),
        count(report.primary_discover_count, "method", "methods")
    ));

    if !report.categories.is_empty() {
        lines.push(String::new());
        lines.push("Categories".to_string());
        for (i, summary) in report.categories.iter().enumerate() {
            lines.push(format!(
                "{} {} ({})",
                format_index(i + 1),
                summary.category,
                count(summary.methods, "method", "methods")
            ));
        }
    }

    for (title, ids) in [("Roles", &report.roles), ("Custom lists", &report.custom_lists)] {
        if ids.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(title.to_string());
        for (i, id) in ids.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), id));
        }
    }

    warning_lines(&report.warnings, &mut lines);

    lines.push(String::new());
    let mut summary = format!(
        "Generated {} from {}",
        count(report.files_written.len(), "file", "files"),
        count(report.total_methods, "method", "methods")
    );
    if !report.files_removed.is_empty() {
        summary.push_str(&format!(
            " ({} removed)",
            count(report.files_removed.len(), "stale file", "stale files")
        ));
    }
    lines.push(summary);
    lines
}

pub fn print_generate_report(report: &GenerationReport) {
    for line in format_generate_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_freshness(report: &FreshnessReport) -> Vec<String> {
    let label = match report.status {
        FreshnessStatus::Fresh => "Fresh",
        FreshnessStatus::Stale => "Stale",
        FreshnessStatus::Unknown => "Unknown",
    };
    let mut lines = vec![format!("{}: {}", label, report.reason)];
    if let Some(recorded) = &report.recorded_hash {
        lines.push(format!("{}recorded: {}", indent(1), recorded));
    }
    if let Some(current) = &report.current_hash {
        lines.push(format!("{}current:  {}", indent(1), current));
    }
    lines
}

pub fn print_freshness(report: &FreshnessReport) {
    for line in format_freshness(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Validate
// ============================================================================

pub fn format_validation(validation: &Validation) -> Vec<String> {
    let mut lines = Vec::new();
    if !validation.errors.is_empty() {
        lines.push("Errors".to_string());
        for error in &validation.errors {
            lines.push(format!("{}{}", indent(1), error));
        }
    }
    warning_lines(&validation.warnings, &mut lines);
    if lines.first().is_some_and(String::is_empty) {
        lines.remove(0);
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(if validation.is_valid() {
        format!(
            "Sources are valid ({})",
            count(validation.warnings.len(), "warning", "warnings")
        )
    } else {
        format!(
            "Sources are invalid ({}, {})",
            count(validation.errors.len(), "error", "errors"),
            count(validation.warnings.len(), "warning", "warnings")
        )
    });
    lines
}

pub fn print_validation(validation: &Validation) {
    for line in format_validation(validation) {
        println!("{}", line);
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Render an error and its cause chain for stderr.
///
/// Causes already spelled out in the message above them are skipped.
pub fn format_error(err: &dyn std::error::Error) -> Vec<String> {
    let message = err.to_string();
    let mut lines: Vec<String> = message.lines().map(str::to_string).collect();
    if let Some(first) = lines.first_mut() {
        *first = format!("Error: {first}");
    }

    let mut shown = message;
    let mut cause = err.source();
    while let Some(source) = cause {
        let text = source.to_string();
        if !shown.contains(&text) {
            lines.push(format!("{}Caused by: {}", indent(1), text));
        }
        shown = text;
        cause = source.source();
    }
    lines
}

pub fn print_error(err: &dyn std::error::Error) {
    for line in format_error(err) {
        eprintln!("{}", line);
    }
}
