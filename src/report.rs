//! Rendering of run reports: human text (optionally colored) and stable
//! JSON. Line order is the report's order; rendering never reorders.

use colored::Colorize;

use crate::validator::RunReport;

/// One line per violation, then one per rule failure, then a summary line.
/// The colored and plain renderings differ only in ANSI codes.
pub fn render_text(report: &RunReport, color: bool) -> String {
    let mut lines = Vec::<String>::new();
    for violation in &report.violations {
        if color {
            lines.push(format!(
                "{}.{} [{}]",
                violation.type_name.bold(),
                violation.member.red(),
                violation.rule.dimmed(),
            ));
        } else {
            lines.push(violation.to_string());
        }
    }
    for failure in &report.failures {
        if color {
            lines.push(format!(
                "{} {} failed on {}: {}",
                "rule".red().bold(),
                failure.rule,
                failure.type_name,
                failure.message,
            ));
        } else {
            lines.push(failure.to_string());
        }
    }
    let summary = if report.is_clean() {
        "clean: no violations".to_owned()
    } else {
        format!(
            "{} violation(s), {} rule failure(s)",
            report.violations.len(),
            report.failures.len(),
        )
    };
    if color {
        let summary = if report.is_clean() {
            summary.green().to_string()
        } else {
            summary.red().bold().to_string()
        };
        lines.push(summary);
    } else {
        lines.push(summary);
    }
    lines.join("\n")
}

/// Pretty JSON of the whole report; field and entry order are stable, so
/// identical runs render to identical bytes.
pub fn render_json(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

// ------------------------------- Tests ------------------------------------ //
