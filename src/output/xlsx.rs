//! XLSX snapshot export.
//!
//! Re-encodes a (possibly filtered) table into a single-sheet workbook.
//! The workbook is fully serialized into memory before the bytes are
//! returned, and the document creation date is pinned so identical
//! tables always produce identical bytes.

use super::json::prepare_output_path;
use crate::parser::table::to_excel_serial;
use crate::parser::{CellValue, TransactionTable};
use crate::utils::config::{SNAPSHOT_SHEET_NAME, XLSX_MIME_TYPE};
use crate::utils::error::{ExportError, OutputError};
use log::{debug, info};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook};
use std::path::Path;

/// Excel row limit, header included
const MAX_ROWS: usize = 1_048_576;

/// Excel column limit
const MAX_COLUMNS: usize = 16_384;

const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// MIME type to advertise for exported bytes
pub fn snapshot_mime_type() -> &'static str {
    XLSX_MIME_TYPE
}

/// Export a table as xlsx bytes using the default sheet name
///
/// **Public** - main entry point for snapshot export
///
/// # Errors
/// * `ExportError::TooLarge` - more rows/columns than a sheet holds
/// * `ExportError::Xlsx` - workbook encoding failed
pub fn export_snapshot(table: &TransactionTable) -> Result<Vec<u8>, ExportError> {
    export_snapshot_with_sheet(table, SNAPSHOT_SHEET_NAME)
}

/// Export a table as xlsx bytes into a named sheet
pub fn export_snapshot_with_sheet(
    table: &TransactionTable,
    sheet_name: &str,
) -> Result<Vec<u8>, ExportError> {
    check_dimensions(table)?;

    let mut workbook = Workbook::new();

    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    let properties = DocProperties::new().set_creation_datetime(&created);
    workbook.set_properties(&properties);

    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let xl_row = (row_idx + 1) as u32;

        for (col, cell) in row.iter().enumerate() {
            let xl_col = col as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Bool(b) => {
                    worksheet.write_boolean(xl_row, xl_col, *b)?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number(xl_row, xl_col, *n)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string(xl_row, xl_col, s)?;
                }
                CellValue::DateTime(dt) => match to_excel_serial(dt) {
                    Some(serial) => {
                        worksheet.write_number_with_format(xl_row, xl_col, serial, &datetime_format)?;
                    }
                    None => {
                        worksheet.write_string(xl_row, xl_col, &cell.to_string())?;
                    }
                },
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;

    debug!(
        "Encoded {} rows x {} columns into {} bytes",
        table.row_count(),
        table.columns().len(),
        bytes.len()
    );

    Ok(bytes)
}

/// Export a table and write the workbook to disk
///
/// **Public** - used by the analyze command's `--export` flag
pub fn write_snapshot(
    table: &TransactionTable,
    sheet_name: &str,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing snapshot to: {}", output_path.display());

    prepare_output_path(output_path)?;

    let bytes = export_snapshot_with_sheet(table, sheet_name)?;
    std::fs::write(output_path, &bytes)?;

    info!("Snapshot written successfully ({} bytes, {:.2} KB)",
          bytes.len(),
          bytes.len() as f64 / 1024.0);

    Ok(())
}

fn check_dimensions(table: &TransactionTable) -> Result<(), ExportError> {
    if table.columns().len() > MAX_COLUMNS {
        return Err(ExportError::TooLarge(format!(
            "{} columns (max {})",
            table.columns().len(),
            MAX_COLUMNS
        )));
    }
    if table.row_count() + 1 > MAX_ROWS {
        return Err(ExportError::TooLarge(format!(
            "{} rows (max {})",
            table.row_count(),
            MAX_ROWS - 1
        )));
    }
    Ok(())
}
