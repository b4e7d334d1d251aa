use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_xlsxwriter::Workbook;
use serde_json::{Map, Value};

/// Columns that lead every export, in this order, when present.
pub const PREFERRED_COLUMNS: [&str; 11] = [
    "name",
    "industry",
    "business_type",
    "address",
    "phone",
    "email",
    "website",
    "employee_count",
    "revenue",
    "rating",
    "country",
];
const MAX_NAME_CHARS: usize = 50;
const FALLBACK_NAME: &str = "companies";
const SHEET_NAME: &str = "Companies";

static INVALID_FILENAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub type Row = Map<String, Value>;

/// Writes company rows as Excel workbooks into one directory.
pub struct SpreadsheetExporter {
    directory: PathBuf,
}

impl SpreadsheetExporter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        SpreadsheetExporter {
            directory: directory.into(),
        }
    }

    /// Returns the written file's path and download name.
    pub fn export(&self, search_query: &str, rows: &[Row]) -> anyhow::Result<(PathBuf, String)> {
        std::fs::create_dir_all(&self.directory).with_context(|| {
            format!("Failed to create export directory {}", self.directory.display())
        })?;

        let filename = export_filename(search_query, Local::now());
        let path = self.directory.join(&filename);
        write_rows(&path, rows)?;

        log::info!("Exported {} companies to {}", rows.len(), path.display());
        Ok((path, filename))
    }
}

pub fn sanitize_query(search_query: &str) -> String {
    let without_invalid = INVALID_FILENAME_CHARS.replace_all(search_query, "");
    let underscored = WHITESPACE.replace_all(without_invalid.trim(), "_");
    let name: String = underscored.chars().take(MAX_NAME_CHARS).collect();

    match name.is_empty() {
        true => FALLBACK_NAME.to_string(),
        false => name,
    }
}

pub fn export_filename(search_query: &str, now: DateTime<Local>) -> String {
    format!(
        "{}_{}.xlsx",
        sanitize_query(search_query),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Preferred columns found in any row, then every other column in first-seen order.
pub fn column_order(rows: &[Row]) -> Vec<String> {
    let mut seen: Vec<&str> = vec![];
    for key in rows.iter().flat_map(|row| row.keys()) {
        if !seen.contains(&key.as_str()) {
            seen.push(key);
        }
    }

    let preferred = PREFERRED_COLUMNS
        .iter()
        .filter(|column| seen.contains(column))
        .map(|column| column.to_string());
    let others = seen
        .iter()
        .filter(|column| !PREFERRED_COLUMNS.contains(column))
        .map(|column| column.to_string());

    preferred.chain(others).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Flag(bool),
}

fn cell(value: Option<&Value>) -> Cell {
    match value {
        None | Some(Value::Null) => Cell::Empty,
        Some(Value::String(s)) => Cell::Text(s.clone()),
        Some(Value::Bool(b)) => Cell::Flag(*b),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(n) => Cell::Number(n),
            None => Cell::Text(n.to_string()),
        },
        Some(other) => Cell::Text(other.to_string()),
    }
}

/// Header row followed by one row of cells per company.
pub fn sheet_cells(rows: &[Row]) -> Vec<Vec<Cell>> {
    let columns = column_order(rows);
    let header = columns.iter().map(|c| Cell::Text(c.clone())).collect();

    std::iter::once(header)
        .chain(rows.iter().map(|row| {
            columns
                .iter()
                .map(|column| cell(row.get(column)))
                .collect()
        }))
        .collect()
}

fn write_rows(path: &Path, rows: &[Row]) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (row_index, cells) in sheet_cells(rows).into_iter().enumerate() {
        let row = u32::try_from(row_index).context("Too many rows for one sheet")?;
        for (column_index, cell) in cells.into_iter().enumerate() {
            let column = u16::try_from(column_index).context("Too many columns for one sheet")?;
            match cell {
                Cell::Empty => {}
                Cell::Text(text) => {
                    worksheet.write_string(row, column, text)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row, column, n)?;
                }
                Cell::Flag(b) => {
                    worksheet.write_boolean(row, column, b)?;
                }
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write workbook {}", path.display()))?;

    Ok(())
}
