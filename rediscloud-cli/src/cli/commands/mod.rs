//! Subcommand arguments and handlers

pub mod payload;
pub mod payment_methods;
pub mod provision;
pub mod tfvars;

use colored::*;

use crate::sizing::NormalizedSheet;

/// Tell the user which sheet rows were dropped
pub(crate) fn report_skipped(sheet: &NormalizedSheet) {
    if sheet.skipped.is_empty() {
        return;
    }
    eprintln!(
        "{} skipped {} row(s) with a missing/invalid name or dataset size:",
        "Note:".yellow().bold(),
        sheet.skipped.len()
    );
    for skipped in &sheet.skipped {
        eprintln!("  row {}: {}", skipped.line, skipped.reason);
    }
}
