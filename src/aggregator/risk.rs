//! Latest-transaction risk flag.

use super::cells::{malformed, require_column};
use crate::parser::{LatestRisk, TransactionTable};
use crate::utils::error::AggregateError;
use chrono::NaiveDateTime;
use log::{debug, warn};

/// Flag the most recent transaction as risky or not
///
/// **Public** - real-time alert simulation
///
/// # Arguments
/// * `table` - Transactions to scan
/// * `score_column` - Header of the impulse score column
/// * `timestamp_column` - Header of the timestamp column
/// * `threshold` - Score at or above which the transaction is risky
///
/// # Returns
/// `None` for an empty table or when no row has both a readable
/// timestamp and a score in [0, 1]. Ties on the latest timestamp resolve
/// to the row appearing last in the table.
///
/// # Errors
/// * `AggregateError::MissingColumn` - either column absent
pub fn latest_row_risk(
    table: &TransactionTable,
    score_column: &str,
    timestamp_column: &str,
    threshold: f64,
) -> Result<Option<LatestRisk>, AggregateError> {
    latest_row_risk_with_issues(table, score_column, timestamp_column, threshold, &mut Vec::new())
}

/// Same as [`latest_row_risk`], recording skipped cells in `issues`
pub fn latest_row_risk_with_issues(
    table: &TransactionTable,
    score_column: &str,
    timestamp_column: &str,
    threshold: f64,
    issues: &mut Vec<AggregateError>,
) -> Result<Option<LatestRisk>, AggregateError> {
    let score_col = require_column(table, score_column)?;
    let ts_col = require_column(table, timestamp_column)?;

    if table.is_empty() {
        debug!("Latest risk skipped: empty table");
        return Ok(None);
    }

    let mut candidates: Vec<(NaiveDateTime, usize, f64)> = Vec::new();

    for row in 0..table.row_count() {
        let timestamp = match table.cell(row, ts_col).as_timestamp() {
            Ok(Some(ts)) => ts,
            Ok(None) => continue,
            Err(reason) => {
                issues.push(malformed(table, row, ts_col, reason));
                continue;
            }
        };

        let score = match table.cell(row, score_col).as_score() {
            Ok(Some(score)) => score,
            Ok(None) => continue,
            Err(reason) => {
                issues.push(malformed(table, row, score_col, reason));
                continue;
            }
        };

        candidates.push((timestamp, row, score));
    }

    // Stable sort keeps table order among equal timestamps
    candidates.sort_by_key(|(ts, _, _)| *ts);

    let Some(&(timestamp, row, score)) = candidates.last() else {
        warn!("No row has both a readable timestamp and score");
        return Ok(None);
    };

    let risky = score >= threshold;
    debug!(
        "Latest transaction at {} (row {}): score {} vs threshold {} -> risky={}",
        timestamp, row, score, threshold, risky
    );

    Ok(Some(LatestRisk {
        risky,
        score,
        threshold,
        timestamp,
        row,
    }))
}
