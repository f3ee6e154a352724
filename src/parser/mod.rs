//! Input decoding, table model and schema definitions.
//!
//! This module handles:
//! - Decoding uploaded CSV / XLSX files into a `TransactionTable`
//! - Resolving known transaction fields from header aliases
//! - Defining the versioned report schema

pub mod fields;
pub mod reader;
pub mod schema;
pub mod table;

// Re-export main types
pub use fields::{Field, ResolvedField, SchemaCapabilities};
pub use reader::{read_bytes, read_csv_bytes, read_table, read_xlsx_bytes, InputFormat};
pub use schema::{
    Alert, AlertLevel, AnalysisReport, GroupCount, KeySummary, Kpis, LatestRisk, RiskBand,
    TriggerCount, ValueBreakdown,
};
pub use table::{CellValue, TransactionTable};
