//! Row normalization: one sizing-sheet row to a database template
//!
//! A row yields a template `DatabaseSpec` plus the number of identical
//! databases it asks for. Rows without a name or a positive size are skipped
//! rather than failing the sheet.

use std::collections::HashMap;

use anyhow::{Result, bail};

use super::columns::ColumnMap;
use super::table::{Cell, SizingTable};
use crate::types::{DatabaseSpec, is_truthy_token, round_to_precision, split_modules};

/// Decimal places kept for dataset sizes unless told otherwise
pub const DEFAULT_SIZE_PRECISION: u32 = 3;

static EMPTY_CELL: Cell = Cell::Empty;

/// Options controlling normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizingOptions {
    /// Decimal places dataset sizes are rounded to; also the grouping precision
    pub precision: u32,
}

impl Default for SizingOptions {
    fn default() -> Self {
        Self {
            precision: DEFAULT_SIZE_PRECISION,
        }
    }
}

/// A normalized row before quantity expansion
#[derive(Debug, Clone, PartialEq)]
pub struct RowTemplate {
    pub template: DatabaseSpec,
    /// How many databases this row expands into (always at least 1)
    pub quantity: u32,
}

impl RowTemplate {
    /// Expand into `quantity` specs; names get `-1..-N` suffixes when quantity > 1
    pub fn expand(&self) -> Vec<DatabaseSpec> {
        if self.quantity <= 1 {
            return vec![self.template.clone()];
        }
        (1..=self.quantity)
            .map(|i| self.template.renamed(format!("{}-{}", self.template.name, i)))
            .collect()
    }
}

/// Why a row was left out
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    MissingName,
    MissingSize,
    NonPositiveSize(f64),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingName => write!(f, "missing database name"),
            SkipReason::MissingSize => write!(f, "missing or non-numeric dataset size"),
            SkipReason::NonPositiveSize(size) => write!(f, "non-positive dataset size {}", size),
        }
    }
}

/// A skipped row with its 1-based sheet line (header is line 1)
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: SkipReason,
}

/// Result of normalizing a whole sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSheet {
    /// Row templates in sheet order
    pub templates: Vec<RowTemplate>,
    /// Expanded databases in sheet order
    pub databases: Vec<DatabaseSpec>,
    pub skipped: Vec<SkippedRow>,
}

/// Normalize one row
pub fn normalize_row(
    row: &[Cell],
    columns: &ColumnMap,
    options: &SizingOptions,
) -> Result<RowTemplate, SkipReason> {
    let cell = |idx: usize| row.get(idx).unwrap_or(&EMPTY_CELL);
    let optional = |idx: Option<usize>| idx.map(cell).unwrap_or(&EMPTY_CELL);

    let name = cell(columns.name)
        .as_text()
        .ok_or(SkipReason::MissingName)?;

    let raw_size = cell(columns.size)
        .as_number()
        .ok_or(SkipReason::MissingSize)?;
    let size = round_to_precision(raw_size, options.precision);
    if !size.is_finite() {
        return Err(SkipReason::MissingSize);
    }
    if size <= 0.0 {
        return Err(SkipReason::NonPositiveSize(size));
    }

    let quantity = optional(columns.quantity)
        .as_number()
        .map(|q| q.trunc())
        .filter(|q| *q >= 1.0)
        .map(|q| q.min(u32::MAX as f64) as u32)
        .unwrap_or(1);

    let throughput = optional(columns.throughput)
        .as_number()
        .filter(|t| *t > 0.0)
        .map(|t| t.trunc() as u64)
        .unwrap_or(0);

    let modules = optional(columns.modules)
        .as_text()
        .map(|m| split_modules(&m))
        .unwrap_or_default();

    let template = DatabaseSpec::new(name, size)
        .with_replication(cell_flag(optional(columns.replication)))
        .with_throughput(throughput)
        .with_modules(modules)
        .with_oss_cluster_api(cell_flag(optional(columns.oss_cluster)));

    Ok(RowTemplate { template, quantity })
}

fn cell_flag(cell: &Cell) -> bool {
    match cell {
        Cell::Bool(b) => *b,
        Cell::Number(n) => *n == 1.0,
        Cell::Text(s) => is_truthy_token(s),
        Cell::Empty => false,
    }
}

/// Normalize every row of a sheet and expand quantities.
///
/// Fails when required columns cannot be found or when two databases end
/// up with the same name.
pub fn normalize_table(table: &SizingTable, options: &SizingOptions) -> Result<NormalizedSheet> {
    let columns = ColumnMap::resolve(&table.headers)?;
    let mut sheet = NormalizedSheet::default();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (idx, row) in table.rows.iter().enumerate() {
        let line = idx + 2;
        match normalize_row(row, &columns, options) {
            Ok(template) => {
                for spec in template.expand() {
                    if let Some(first_line) = seen.insert(spec.name.clone(), line) {
                        bail!(
                            "Duplicate database name '{}' (rows {} and {})",
                            spec.name,
                            first_line,
                            line
                        );
                    }
                    sheet.databases.push(spec);
                }
                sheet.templates.push(template);
            }
            Err(reason) => {
                log::warn!("Skipping row {}: {}", line, reason);
                sheet.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    Ok(sheet)
}
