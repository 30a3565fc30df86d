//! Plain-text rendering of extracted statistics.
//!
//! The output shape follows the original tool: per scope a title line, a
//! dashed rule, then one comma-separated row per ranked user. Count rows are
//! `count,name,real_name`; per-day rate rows append the date of the user's
//! earliest message.

use std::io::{self, Write};

use crate::analyzer::ScopeReport;

const RULE: &str = "----------------------------------------";

/// Write every scope block of one analyzer's extraction.
pub fn render<W: Write>(out: &mut W, reports: &[ScopeReport]) -> io::Result<()> {
    for report in reports {
        writeln!(out)?;
        writeln!(out, "{} - {}", report.title, report.label)?;
        writeln!(out, "{}", RULE)?;
        for entry in &report.entries {
            match entry.since {
                Some(date) => writeln!(
                    out,
                    "{},{},{},{}",
                    entry.value,
                    entry.name,
                    entry.real_name,
                    date.format("%Y-%m-%d")
                )?,
                None => writeln!(out, "{},{},{}", entry.value, entry.name, entry.real_name)?,
            }
        }
    }
    Ok(())
}
