//! Sizing sheet ingestion
//!
//! Sheet file → [`SizingTable`] → column detection → normalized, expanded
//! [`DatabaseSpec`](crate::types::DatabaseSpec) list.

pub mod columns;
pub mod normalize;
pub mod table;

use std::path::Path;

use anyhow::{Context, Result};

pub use columns::{ColumnMap, normalize_header, pick_column};
pub use normalize::{
    DEFAULT_SIZE_PRECISION, NormalizedSheet, RowTemplate, SizingOptions, SkipReason, SkippedRow,
    normalize_row, normalize_table,
};
pub use table::{Cell, SizingTable, load_table, parse_csv};

/// Where to read a sizing sheet from and how to filter it
#[derive(Debug, Clone, Default)]
pub struct SheetSource<'a> {
    pub sheet: Option<&'a str>,
    /// Keep only rows whose `env` column matches
    pub environment: Option<&'a str>,
}

/// Load, filter and normalize a sizing sheet in one go
pub fn load_sheet(path: &Path, source: &SheetSource<'_>, options: &SizingOptions) -> Result<NormalizedSheet> {
    let mut table = load_table(path, source.sheet)?;

    if let Some(env) = source.environment {
        if !table.retain_environment(env) {
            log::warn!(
                "--env '{}' given but {} has no 'env' column; using all rows",
                env,
                path.display()
            );
        }
    }

    let sheet = normalize_table(&table, options)
        .with_context(|| format!("Failed to normalize sizing sheet: {}", path.display()))?;

    log::info!(
        "Loaded {} database(s) from {} ({} row(s) skipped)",
        sheet.databases.len(),
        path.display(),
        sheet.skipped.len()
    );

    Ok(sheet)
}
