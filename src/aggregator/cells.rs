//! Shared column lookup and cell validation helpers.

use crate::parser::{Field, TransactionTable};
use crate::utils::error::AggregateError;
use log::debug;

/// Resolve a caller-named column or fail with `MissingColumn`
pub(crate) fn require_column(
    table: &TransactionTable,
    name: &str,
) -> Result<usize, AggregateError> {
    table
        .find_column(name)
        .ok_or_else(|| AggregateError::missing(name))
}

/// Resolve a known field or fail with `MissingColumn`
pub(crate) fn require_field(
    table: &TransactionTable,
    field: Field,
) -> Result<usize, AggregateError> {
    field
        .resolve(table)
        .ok_or_else(|| AggregateError::missing(field.canonical_name()))
}

pub(crate) fn malformed(
    table: &TransactionTable,
    row: usize,
    col: usize,
    reason: String,
) -> AggregateError {
    let issue = AggregateError::MalformedValue {
        column: table.column_name(col).to_string(),
        row,
        value: table.cell(row, col).to_string(),
        reason,
    };
    debug!("{}", issue);
    issue
}

/// Per-row impulse flags; malformed cells read as `None` and are reported
pub(crate) fn impulse_flags(
    table: &TransactionTable,
    col: usize,
    issues: &mut Vec<AggregateError>,
) -> Vec<Option<bool>> {
    (0..table.row_count())
        .map(|row| match table.cell(row, col).as_flag() {
            Ok(flag) => flag,
            Err(reason) => {
                issues.push(malformed(table, row, col, reason));
                None
            }
        })
        .collect()
}

/// Order issues by row then column and drop duplicates
pub(crate) fn dedup_issues(issues: &mut Vec<AggregateError>) {
    fn sort_key(issue: &AggregateError) -> (u8, usize, String) {
        match issue {
            AggregateError::EmptyInput => (0, 0, String::new()),
            AggregateError::MissingColumn { column } => (1, 0, column.clone()),
            AggregateError::MalformedValue { column, row, .. } => (2, *row, column.clone()),
        }
    }

    issues.sort_by_key(sort_key);
    issues.dedup();
}

/// Round half away from zero to two decimals
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(53.333_333), 53.33);
        assert_eq!(round2(30.0), 30.0);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0]), Some(1.5));
    }

    #[test]
    fn test_dedup_issues() {
        let issue = AggregateError::MalformedValue {
            column: "Is_Impulse".to_string(),
            row: 3,
            value: "7".to_string(),
            reason: "expected 0 or 1".to_string(),
        };
        let mut issues = vec![issue.clone(), AggregateError::EmptyInput, issue];
        dedup_issues(&mut issues);

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0], AggregateError::EmptyInput);
    }
}
