//! Decoding of uploaded transaction files.
//!
//! Supports delimited text (`.csv`) and Office Open XML workbooks
//! (`.xlsx`). Only the first sheet of a workbook is read; its first row is
//! the header.

use super::table::{from_excel_serial, CellValue, TransactionTable};
use crate::utils::error::ParseError;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use log::{debug, info};
use std::io::Cursor;
use std::path::Path;

/// Supported input encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Xlsx,
}

impl InputFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let suffix = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match suffix.as_str() {
            "csv" => Ok(InputFormat::Csv),
            "xlsx" => Ok(InputFormat::Xlsx),
            _ => Err(ParseError::UnsupportedFormat(suffix)),
        }
    }
}

/// Read a transaction table from disk
///
/// **Public** - main entry point for file input
///
/// # Arguments
/// * `path` - Path to a `.csv` or `.xlsx` file
///
/// # Errors
/// * `ParseError::UnsupportedFormat` - unknown extension
/// * `ParseError::Io` - file cannot be read
/// * `ParseError::Csv` / `ParseError::Spreadsheet` - decoding failed
/// * `ParseError::InvalidFormat` - no header row
pub fn read_table(path: impl AsRef<Path>) -> Result<TransactionTable, ParseError> {
    let path = path.as_ref();
    let format = InputFormat::from_path(path)?;

    info!("Reading {:?} input: {}", format, path.display());

    let bytes = std::fs::read(path)?;
    let table = read_bytes(&bytes, format)?;

    info!(
        "Loaded {} rows x {} columns",
        table.row_count(),
        table.columns().len()
    );

    Ok(table)
}

/// Decode an in-memory upload
pub fn read_bytes(bytes: &[u8], format: InputFormat) -> Result<TransactionTable, ParseError> {
    match format {
        InputFormat::Csv => read_csv_bytes(bytes),
        InputFormat::Xlsx => read_xlsx_bytes(bytes),
    }
}

/// Decode delimited text with a header row
///
/// Numeric-looking cells become numbers, blank cells become empty,
/// everything else stays text.
pub fn read_csv_bytes(bytes: &[u8]) -> Result<TransactionTable, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return Err(ParseError::InvalidFormat("CSV has no header row".to_string()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        if record.iter().skip(columns.len()).any(|field| !field.is_empty()) {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(ParseError::InvalidFormat(format!(
                "line {} has {} fields but the header has {} columns",
                line,
                record.len(),
                columns.len()
            )));
        }
        rows.push(
            record
                .iter()
                .take(columns.len())
                .map(infer_text_cell)
                .collect(),
        );
    }

    debug!("Decoded {} CSV rows", rows.len());

    Ok(TransactionTable::new(columns, rows))
}

/// Decode the first sheet of an xlsx workbook
pub fn read_xlsx_bytes(bytes: &[u8]) -> Result<TransactionTable, ParseError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ParseError::InvalidFormat("workbook has no sheets".to_string()))??;

    let mut sheet_rows = range.rows();
    let columns: Vec<String> = sheet_rows
        .next()
        .ok_or_else(|| ParseError::InvalidFormat("sheet has no header row".to_string()))?
        .iter()
        .map(|cell| match cell {
            Data::String(s) => unescape_ooxml(s),
            other => other.to_string(),
        })
        .collect();

    let rows: Vec<Vec<CellValue>> = sheet_rows
        .map(|row| row.iter().map(convert_cell).collect::<Vec<_>>())
        .filter(|row: &Vec<CellValue>| !row.iter().all(CellValue::is_empty))
        .collect();

    debug!("Decoded {} sheet rows", rows.len());

    Ok(TransactionTable::new(columns, rows))
}

fn infer_text_cell(raw: &str) -> CellValue {
    if raw.is_empty() {
        return CellValue::Empty;
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(raw.to_string()),
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(unescape_ooxml(s)),
        Data::DateTime(dt) => from_excel_serial(dt.as_f64())
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

/// Decode `_xHHHH_` character escapes left in shared strings
///
/// Writers store control characters such as `\r` this way, and a literal
/// `_x` sequence as `_x005F_x...`.
fn unescape_ooxml(text: &str) -> String {
    if !text.contains("_x") {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("_x") {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];

        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &candidate[7..];
            }
            None => {
                out.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }
    out.push_str(rest);

    out
}
