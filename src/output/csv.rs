//! Delimited-text snapshot export.

use super::json::prepare_output_path;
use crate::parser::TransactionTable;
use crate::utils::error::{ExportError, OutputError};
use log::info;
use std::path::Path;

/// Export a table as CSV bytes
///
/// **Public** - plain-text alternative to the xlsx snapshot
///
/// Dates are written as `YYYY-MM-DD HH:MM:SS`, booleans as `true`/`false`
/// and blank cells as empty fields.
pub fn export_csv(table: &TransactionTable) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Export a table as CSV and write it to disk
pub fn write_csv_snapshot(
    table: &TransactionTable,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing CSV snapshot to: {}", output_path.display());

    prepare_output_path(output_path)?;
    let bytes = export_csv(table)?;
    std::fs::write(output_path, &bytes)?;

    Ok(())
}
