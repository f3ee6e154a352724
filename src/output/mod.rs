//! Output writers for reports and table snapshots.
//!
//! This module handles writing data in various formats:
//! - JSON reports (pretty)
//! - XLSX snapshots (single sheet, deterministic)
//! - CSV snapshots
//! - Text summaries

pub mod csv;
pub mod json;
pub mod summary;
pub mod xlsx;

// Re-export main functions
pub use self::csv::{export_csv, write_csv_snapshot};
pub use json::{read_report, report_to_string, write_report};
pub use summary::render_summary;
pub use xlsx::{export_snapshot, export_snapshot_with_sheet, snapshot_mime_type, write_snapshot};
