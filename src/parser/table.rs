//! In-memory transaction table.
//!
//! A table is a header row plus rectangular rows of loosely typed cells.
//! Typed access (flags, numbers, timestamps) happens at aggregation time so
//! that a single bad cell only affects the metrics that read it.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

const TEXT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const TEXT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Read the cell as a 0/1 flag
    ///
    /// Returns `Ok(None)` for blank cells and `Err(reason)` for values
    /// outside the flag domain.
    pub fn as_flag(&self) -> Result<Option<bool>, String> {
        match self {
            CellValue::Empty => Ok(None),
            CellValue::Bool(b) => Ok(Some(*b)),
            CellValue::Number(n) if *n == 1.0 => Ok(Some(true)),
            CellValue::Number(n) if *n == 0.0 => Ok(Some(false)),
            CellValue::Number(_) => Err("expected 0 or 1".to_string()),
            CellValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "" => Ok(None),
                "1" | "1.0" | "true" | "yes" | "y" => Ok(Some(true)),
                "0" | "0.0" | "false" | "no" | "n" => Ok(Some(false)),
                _ => Err("expected 0 or 1".to_string()),
            },
            CellValue::DateTime(_) => Err("expected 0 or 1, found a date".to_string()),
        }
    }

    /// Read the cell as a finite number
    pub fn as_number(&self) -> Result<Option<f64>, String> {
        match self {
            CellValue::Empty => Ok(None),
            CellValue::Number(n) if n.is_finite() => Ok(Some(*n)),
            CellValue::Number(_) => Err("not a finite number".to_string()),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(Some)
                    .ok_or_else(|| "expected a number".to_string())
            }
            CellValue::Bool(_) => Err("expected a number, found a boolean".to_string()),
            CellValue::DateTime(_) => Err("expected a number, found a date".to_string()),
        }
    }

    /// Read the cell as a score in [0, 1]
    pub fn as_score(&self) -> Result<Option<f64>, String> {
        match self.as_number()? {
            Some(score) if !(0.0..=1.0).contains(&score) => {
                Err("score outside [0, 1]".to_string())
            }
            other => Ok(other),
        }
    }

    /// Read the cell as a timestamp
    ///
    /// Accepts spreadsheet date cells, Excel serial numbers and the common
    /// text layouts exported by banking tools.
    pub fn as_timestamp(&self) -> Result<Option<NaiveDateTime>, String> {
        match self {
            CellValue::Empty => Ok(None),
            CellValue::DateTime(dt) => Ok(Some(*dt)),
            CellValue::Number(serial) => from_excel_serial(*serial)
                .map(Some)
                .ok_or_else(|| "serial date out of range".to_string()),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                parse_text_timestamp(trimmed)
                    .map(Some)
                    .ok_or_else(|| "unrecognised timestamp".to_string())
            }
            CellValue::Bool(_) => Err("expected a timestamp, found a boolean".to_string()),
        }
    }

    /// Render the cell as a grouping key
    ///
    /// Blank cells have no key. Integral numbers drop their fraction so
    /// that `3.0` and `"3"` group together.
    pub fn as_key(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            other => Some(other.to_string()),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

fn parse_text_timestamp(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }

    TEXT_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            TEXT_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn excel_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Convert an Excel serial date (1900 system) to a datetime
///
/// **Public** - shared with the xlsx reader and writer
pub fn from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let millis = (serial * MILLIS_PER_DAY).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    excel_epoch()?.checked_add_signed(Duration::try_milliseconds(millis as i64)?)
}

/// Convert a datetime to an Excel serial date (1900 system)
pub fn to_excel_serial(dt: &NaiveDateTime) -> Option<f64> {
    let delta = *dt - excel_epoch()?;
    Some(delta.num_milliseconds() as f64 / MILLIS_PER_DAY)
}

/// A rectangular table of transactions
///
/// **Public** - the unit every aggregation operates on
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl TransactionTable {
    /// Create a table, padding or truncating rows to the header width
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&CellValue::Empty)
    }

    pub fn column_name(&self, col: usize) -> &str {
        self.columns.get(col).map(String::as_str).unwrap_or("")
    }

    /// Locate a column by name
    ///
    /// Exact matches win; otherwise names are compared ignoring case,
    /// spaces, dashes and underscores (`"Day of Week"` matches `day_of_week`).
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.find_any_column(&[name])
    }

    /// Locate the first column matching any candidate name
    pub fn find_any_column(&self, candidates: &[&str]) -> Option<usize> {
        candidates
            .iter()
            .find_map(|name| self.columns.iter().position(|c| c == name))
            .or_else(|| {
                candidates.iter().find_map(|name| {
                    let wanted = normalize_header(name);
                    self.columns.iter().position(|c| normalize_header(c) == wanted)
                })
            })
    }

    /// Keep only rows matching a predicate, returning a new table
    pub fn filter_rows<F>(&self, mut keep: F) -> TransactionTable
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        TransactionTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

fn normalize_header(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_flag_parsing() {
        assert_eq!(CellValue::Number(1.0).as_flag(), Ok(Some(true)));
        assert_eq!(text("false").as_flag(), Ok(Some(false)));
        assert_eq!(text(" ").as_flag(), Ok(None));
        assert!(CellValue::Number(2.0).as_flag().is_err());
        assert!(text("maybe").as_flag().is_err());
    }

    #[test]
    fn test_score_range() {
        assert_eq!(CellValue::Number(0.7).as_score(), Ok(Some(0.7)));
        assert!(CellValue::Number(1.2).as_score().is_err());
        assert!(text("-0.1").as_score().is_err());
    }

    #[test]
    fn test_timestamp_from_text_and_serial() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();

        assert_eq!(text("2024-03-01 18:30:00").as_timestamp(), Ok(Some(expected)));
        assert_eq!(text("2024-03-01T18:30:00Z").as_timestamp(), Ok(Some(expected)));

        let serial = to_excel_serial(&expected).unwrap();
        assert_eq!(CellValue::Number(serial).as_timestamp(), Ok(Some(expected)));
    }

    #[test]
    fn test_key_rendering() {
        assert_eq!(CellValue::Number(3.0).as_key(), Some("3".to_string()));
        assert_eq!(CellValue::Number(2.5).as_key(), Some("2.5".to_string()));
        assert_eq!(text("  Monday ").as_key(), Some("Monday".to_string()));
        assert_eq!(CellValue::Empty.as_key(), None);
    }

    #[test]
    fn test_find_column_normalized() {
        let table = TransactionTable::new(
            vec!["Day of Week".to_string(), "amount".to_string()],
            vec![],
        );
        assert_eq!(table.find_column("day_of_week"), Some(0));
        assert_eq!(table.find_any_column(&["Amount_Magnitude", "Amount"]), Some(1));
        assert_eq!(table.find_column("Category"), None);
    }

    #[test]
    fn test_rows_padded_to_header_width() {
        let table = TransactionTable::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![CellValue::Number(1.0)]],
        );
        assert_eq!(table.cell(0, 1), &CellValue::Empty);
    }

    #[test]
    fn test_filter_rows_leaves_source_untouched() {
        let table = TransactionTable::new(
            vec!["User_ID".to_string()],
            vec![vec![text("u1")], vec![text("u2")]],
        );
        let filtered = table.filter_rows(|r| r[0] == text("u2"));

        assert_eq!(filtered.row_count(), 1);
        assert_eq!(table.row_count(), 2);
    }
}
