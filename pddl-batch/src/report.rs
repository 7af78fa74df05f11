//! Console rendering of the batch summary.

use std::io::Write;

use anyhow::{Context, Result};

use crate::core::summary::{ParsingFailures, RunRecord, Summary, summarize};

/// Summary lines, in print order.
pub fn render_summary(summary: &Summary) -> Vec<String> {
    let mut lines = vec![
        format!("Ran on {} tasks", summary.total),
        format!("Failed {}", summary.failed_count()),
        format!("Success {}", summary.successes.len()),
    ];
    if summary.parsing == ParsingFailures::Separate {
        lines.push(format!("Parsing Failures {}", summary.parsing_failures.len()));
    }
    lines.push(format!("Failures: {:?}", summary.failures));
    lines.push(format!("Successes: {:?}", summary.successes));
    lines.extend(
        summary
            .unexplained
            .iter()
            .map(|task| format!("Unexplained: {task}")),
    );
    lines
}

/// Summarize `records` and print the report to `out`.
pub fn write_report<W: Write>(
    out: &mut W,
    records: &[RunRecord],
    parsing: ParsingFailures,
) -> Result<Summary> {
    let summary = summarize(records, parsing);
    for line in render_summary(&summary) {
        writeln!(out, "{line}").context("write summary")?;
    }
    Ok(summary)
}
