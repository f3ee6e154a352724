//! JSON report output writer.
//!
//! Writes AnalysisReport structs to JSON files with proper formatting.

use crate::parser::schema::AnalysisReport;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write a report to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Arguments
/// * `report` - Report data to write
/// * `output_path` - Path to output JSON file
///
/// # Returns
/// Ok if file written successfully
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
///
/// # Example
/// ```ignore
/// let report = analyze(&table, &config, "transactions.xlsx")?;
/// write_report(&report, "report.json")?;
/// ```
pub fn write_report(report: &AnalysisReport, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing report to: {}", output_path.display());

    prepare_output_path(output_path)?;

    let file = File::create(output_path)
        .map_err(OutputError::WriteFailed)?;

    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, report)
        .map_err(OutputError::SerializationFailed)?;

    info!("Report written successfully ({} bytes)",
          calculate_file_size(output_path));

    Ok(())
}

/// Serialize a report to a pretty JSON string
///
/// **Public** - used for stdout output and tests
pub fn report_to_string(report: &AnalysisReport) -> Result<String, OutputError> {
    serde_json::to_string_pretty(report)
        .map_err(OutputError::SerializationFailed)
}

/// Validate an output path and create its parent directories
///
/// **Crate** - shared by every file writer
pub(crate) fn prepare_output_path(path: &Path) -> Result<(), OutputError> {
    validate_output_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                )))?;
        }
    }

    Ok(())
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Check if we're trying to overwrite a directory
    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Calculate file size in bytes
///
/// **Private** - internal utility
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path)
        .map(|m| m.len())
        .unwrap_or(0)
}

/// Read a report from a JSON file
///
/// **Public** - useful for validation and testing
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_report(input_path: impl AsRef<Path>) -> Result<AnalysisReport, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading report from: {}", input_path.display());

    let file = File::open(input_path)
        .map_err(OutputError::WriteFailed)?;

    let report: AnalysisReport = serde_json::from_reader(file)
        .map_err(OutputError::SerializationFailed)?;

    debug!("Report loaded: version {}, source {}",
           report.version,
           report.source);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::{GroupCount, Kpis};
    use tempfile::NamedTempFile;

    fn create_test_report() -> AnalysisReport {
        AnalysisReport {
            version: "1.0.0".to_string(),
            source: "transactions.csv".to_string(),
            user_filter: Some("U1".to_string()),
            kpis: Kpis {
                total: 3,
                impulse_count: Some(2),
                impulse_pct: Some(66.67),
                avg_amount: Some(53.33),
                avg_impulse_amount: Some(30.0),
                avg_impulse_score: None,
                issues: vec![],
            },
            risk_band: None,
            alert: None,
            triggers: None,
            weekday_pattern: Some(vec![GroupCount::new("Monday", 1)]),
            category_breakdown: None,
            weekly_trend: None,
            monthly_summary: None,
            flag_breakdown: vec![],
            latest_risk: None,
            capabilities: vec![],
            issues: vec![],
            generated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_write_and_read_report() {
        let report = create_test_report();
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        write_report(&report, path).unwrap();

        let loaded = read_report(path).unwrap();

        assert_eq!(loaded.version, report.version);
        assert_eq!(loaded.source, report.source);
        assert_eq!(loaded.kpis, report.kpis);
        assert_eq!(loaded.weekday_pattern, report.weekday_pattern);
    }

    #[test]
    fn test_report_to_string_marks_missing_metrics_null() {
        let json = report_to_string(&create_test_report()).unwrap();
        assert!(json.contains("\"avg_impulse_score\": null"));
    }

    #[test]
    fn test_validate_output_path_empty() {
        let result = validate_output_path(Path::new(""));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_output_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = validate_output_path(temp_dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/report.json");

        let report = create_test_report();
        write_report(&report, &nested_path).unwrap();

        assert!(nested_path.exists());
    }
}
