//! Load sizing sheets from CSV or Excel into a header + rows table

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};

/// Extensions handled by the spreadsheet reader; everything else is read as CSV
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// A single sizing-sheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Parse a raw CSV field, recognising numbers
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Number(n),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Cell rendered as text; whole numbers lose their trailing ".0"
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
            Cell::Bool(b) => Some(b.to_string()),
        }
    }

    /// Numeric value, coercing numeric text the way a spreadsheet would
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Empty => None,
        }
    }
}

/// Convert a calamine cell
fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.trim().to_string()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Text(dt.to_string()),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}

/// In-memory sizing sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizingTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SizingTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Cell at (row, column), `Empty` when the row is short
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }

    /// Keep only rows whose `env` column matches (case-insensitive).
    /// Returns false when the sheet has no `env` column, leaving rows untouched.
    pub fn retain_environment(&mut self, env: &str) -> bool {
        let Some(env_col) = self
            .headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case("env"))
        else {
            return false;
        };

        let wanted = env.trim().to_lowercase();
        self.rows.retain(|row| {
            row.get(env_col)
                .and_then(|c| c.as_text())
                .map(|v| v.to_lowercase() == wanted)
                .unwrap_or(false)
        });
        true
    }
}

/// Load a sizing sheet, picking the reader from the file extension
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<SizingTable> {
    if !path.exists() {
        bail!("Input file not found: {}", path.display());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        load_spreadsheet(path, sheet)
    } else {
        load_csv(path)
    }
}

/// Read a CSV file, accepting utf-8 (with or without BOM) and falling back to latin-1
pub fn load_csv(path: &Path) -> Result<SizingTable> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read CSV file: {}", path.display()))?;
    let text = decode_text(&bytes);
    parse_csv(&text).with_context(|| format!("Failed to parse CSV file: {}", path.display()))
}

fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            log::debug!("Input is not valid utf-8, decoding as latin-1");
            bytes.iter().map(|&b| b as char).collect()
        }
    }
}

/// Parse CSV text into a table
pub fn parse_csv(text: &str) -> Result<SizingTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", idx + 2))?;
        let row: Vec<Cell> = record.iter().map(Cell::from_text).collect();
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        rows.push(row);
    }

    Ok(SizingTable::new(headers, rows))
}

/// Read one worksheet (named, or the first) from an Excel/ODS workbook
pub fn load_spreadsheet(path: &Path, sheet: Option<&str>) -> Result<SizingTable> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open spreadsheet: {}", path.display()))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .context("Spreadsheet has no sheets")?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row
            .iter()
            .map(|c| cell_from_data(c).as_text().unwrap_or_default())
            .collect(),
        None => bail!("Sheet '{}' is empty", sheet_name),
    };

    let rows: Vec<Vec<Cell>> = rows_iter
        .map(|r| r.iter().map(cell_from_data).collect::<Vec<_>>())
        .filter(|r: &Vec<Cell>| !r.iter().all(Cell::is_empty))
        .collect();

    Ok(SizingTable::new(headers, rows))
}
