//! Grouped counts and totals keyed by category, weekday, week or month.

use super::cells::{impulse_flags, require_column, require_field};
use crate::parser::{Field, GroupCount, KeySummary, TransactionTable};
use crate::utils::error::AggregateError;
use log::debug;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Count rows per key in a caller-defined order
///
/// **Public** - drives weekday and category breakdowns
///
/// # Arguments
/// * `table` - Transactions to group
/// * `key_column` - Header of the grouping column
/// * `canonical_order` - Keys to emit first, in this order
/// * `impulse_only` - Only count rows with `Is_Impulse == 1`
///
/// # Returns
/// Every canonical key (count `0` when absent from the data), followed
/// by the remaining keys in first-seen order. Rows with a blank key are
/// skipped.
///
/// # Errors
/// * `AggregateError::MissingColumn` - key column absent, or `Is_Impulse`
///   absent while `impulse_only` is set
pub fn group_by_ordered_key(
    table: &TransactionTable,
    key_column: &str,
    canonical_order: &[&str],
    impulse_only: bool,
) -> Result<Vec<GroupCount>, AggregateError> {
    let key_col = require_column(table, key_column)?;
    let flags = impulse_filter(table, impulse_only)?;

    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for row in 0..table.row_count() {
        if let Some(flags) = &flags {
            if flags[row] != Some(true) {
                continue;
            }
        }

        let Some(key) = table.cell(row, key_col).as_key() else {
            continue;
        };

        let entry = counts.entry(key.clone()).or_insert_with(|| {
            first_seen.push(key);
            0
        });
        *entry += 1;
    }

    let mut groups: Vec<GroupCount> = canonical_order
        .iter()
        .map(|key| GroupCount::new(*key, counts.get(*key).copied().unwrap_or(0)))
        .collect();

    groups.extend(
        first_seen
            .into_iter()
            .filter(|key| !canonical_order.contains(&key.as_str()))
            .map(|key| {
                let count = counts[&key];
                GroupCount::new(key, count)
            }),
    );

    debug!(
        "Grouped by '{}': {} keys ({} canonical)",
        key_column,
        groups.len(),
        canonical_order.len()
    );

    Ok(groups)
}

/// Count occurrences of each distinct value in a column
///
/// **Public** - breakdown of raw trigger columns
///
/// # Returns
/// Values ordered by count (descending), ties in first-seen order
pub fn value_counts(
    table: &TransactionTable,
    column: &str,
) -> Result<Vec<GroupCount>, AggregateError> {
    let mut groups = group_by_ordered_key(table, column, &[], false)?;
    // sort_by is stable, so ties keep first-seen order
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(groups)
}

/// Per-key row count, amount total and impulse count
///
/// **Public** - weekly spending trend and monthly summary
///
/// # Returns
/// Keys in natural order: numeric keys ascending, then text keys
/// lexically. `amount_total` / `impulse_count` are `None` when the table
/// has no amount / impulse column.
///
/// # Errors
/// * `AggregateError::MissingColumn` - key column absent
pub fn summarize_by_key(
    table: &TransactionTable,
    key_column: &str,
) -> Result<Vec<KeySummary>, AggregateError> {
    let key_col = require_column(table, key_column)?;
    let amount_col = Field::Amount.resolve(table);
    let flags = Field::IsImpulse
        .resolve(table)
        .map(|col| impulse_flags(table, col, &mut Vec::new()));

    let mut summaries: Vec<KeySummary> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in 0..table.row_count() {
        let Some(key) = table.cell(row, key_col).as_key() else {
            continue;
        };

        let slot = *index.entry(key.clone()).or_insert_with(|| {
            summaries.push(KeySummary {
                key,
                transactions: 0,
                amount_total: amount_col.map(|_| 0.0),
                impulse_count: flags.as_ref().map(|_| 0),
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[slot];
        summary.transactions += 1;

        if let (Some(col), Some(total)) = (amount_col, summary.amount_total.as_mut()) {
            if let Ok(Some(amount)) = table.cell(row, col).as_number() {
                *total += amount;
            }
        }

        if let (Some(flags), Some(count)) = (&flags, summary.impulse_count.as_mut()) {
            if flags[row] == Some(true) {
                *count += 1;
            }
        }
    }

    summaries.sort_by(|a, b| natural_key_cmp(&a.key, &b.key));

    debug!("Summarized '{}' into {} keys", key_column, summaries.len());

    Ok(summaries)
}

/// Distinct non-blank values of a column in first-seen order
///
/// **Public** - feeds the user selector
pub fn distinct_values(
    table: &TransactionTable,
    column: &str,
) -> Result<Vec<String>, AggregateError> {
    Ok(group_by_ordered_key(table, column, &[], false)?
        .into_iter()
        .map(|g| g.key)
        .collect())
}

/// Restrict a table to one user's transactions
///
/// **Public** - returns a new table; the source is left untouched
///
/// # Errors
/// * `AggregateError::MissingColumn` - no `User_ID` column
pub fn filter_by_user(
    table: &TransactionTable,
    user_id: &str,
) -> Result<TransactionTable, AggregateError> {
    let user_col = require_field(table, Field::UserId)?;
    let wanted = user_id.trim();

    let filtered = table.filter_rows(|row| {
        row.get(user_col)
            .and_then(|cell| cell.as_key())
            .is_some_and(|key| key == wanted)
    });

    debug!(
        "Filtered to user '{}': {} of {} rows",
        wanted,
        filtered.row_count(),
        table.row_count()
    );

    Ok(filtered)
}

fn impulse_filter(
    table: &TransactionTable,
    impulse_only: bool,
) -> Result<Option<Vec<Option<bool>>>, AggregateError> {
    if !impulse_only {
        return Ok(None);
    }
    let col = require_field(table, Field::IsImpulse)?;
    Ok(Some(impulse_flags(table, col, &mut Vec::new())))
}

/// Numeric keys first (ascending), then text keys. `NaN` and infinities
/// sort as text so the ordering stays total.
fn natural_key_cmp(a: &str, b: &str) -> Ordering {
    match (numeric_key(a), numeric_key(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn numeric_key(key: &str) -> Option<f64> {
    key.parse::<f64>().ok().filter(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CellValue;
    use crate::utils::config::DAYS_OF_WEEK;

    fn n(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    fn t(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_weekday_zero_fill_and_order() {
        let table = TransactionTable::new(
            vec!["Day of Week".into(), "Is_Impulse".into()],
            vec![
                vec![t("Sunday"), n(1.0)],
                vec![t("Monday"), n(1.0)],
                vec![t("Monday"), n(0.0)],
            ],
        );

        let groups = group_by_ordered_key(&table, "Day of Week", &DAYS_OF_WEEK, true).unwrap();

        assert_eq!(groups.len(), 7);
        assert_eq!(groups[0], GroupCount::new("Monday", 1));
        assert_eq!(groups[1], GroupCount::new("Tuesday", 0));
        assert_eq!(groups[6], GroupCount::new("Sunday", 1));
    }

    #[test]
    fn test_non_canonical_keys_appended_first_seen() {
        let table = TransactionTable::new(
            vec!["Day".into()],
            vec![vec![t("Funday")], vec![t("Monday")], vec![t("Blursday")], vec![CellValue::Empty]],
        );

        let groups = group_by_ordered_key(&table, "Day", &["Monday", "Tuesday"], false).unwrap();
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();

        assert_eq!(keys, vec!["Monday", "Tuesday", "Funday", "Blursday"]);
    }

    #[test]
    fn test_missing_key_column() {
        let table = TransactionTable::new(vec!["Amount".into()], vec![]);
        assert_eq!(
            group_by_ordered_key(&table, "Category", &[], false),
            Err(AggregateError::missing("Category"))
        );
    }

    #[test]
    fn test_value_counts_descending() {
        let table = TransactionTable::new(
            vec!["Time_of_Day_Bucket".into()],
            vec![vec![t("Morning")], vec![t("Night")], vec![t("Night")], vec![t("Evening")]],
        );
        let counts = value_counts(&table, "Time_of_Day_Bucket").unwrap();

        assert_eq!(counts[0], GroupCount::new("Night", 2));
        assert_eq!(counts[1], GroupCount::new("Morning", 1));
        assert_eq!(counts[2], GroupCount::new("Evening", 1));
    }

    #[test]
    fn test_summarize_by_week() {
        let table = TransactionTable::new(
            vec!["Week".into(), "Amount".into(), "Is_Impulse".into()],
            vec![
                vec![n(10.0), n(5.0), n(1.0)],
                vec![n(2.0), n(20.0), n(0.0)],
                vec![n(10.0), n(7.5), n(1.0)],
            ],
        );
        let weekly = summarize_by_key(&table, "Week").unwrap();

        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].key, "2");
        assert_eq!(weekly[0].amount_total, Some(20.0));
        assert_eq!(weekly[1].key, "10");
        assert_eq!(weekly[1].transactions, 2);
        assert_eq!(weekly[1].amount_total, Some(12.5));
        assert_eq!(weekly[1].impulse_count, Some(2));
    }

    #[test]
    fn test_summarize_with_nan_keys_sorts_text_last() {
        let mut rows: Vec<Vec<CellValue>> = (0..60).rev().map(|week| vec![n(week as f64)]).collect();
        for pos in [3, 17, 31, 45] {
            rows.insert(pos, vec![t("NaN")]);
        }
        rows.push(vec![t("inf")]);
        let table = TransactionTable::new(vec!["Week".into()], rows);

        let weekly = summarize_by_key(&table, "Week").unwrap();
        let keys: Vec<&str> = weekly.iter().map(|s| s.key.as_str()).collect();

        assert_eq!(weekly.len(), 62);
        assert_eq!(keys[0], "0");
        assert_eq!(keys[59], "59");
        assert_eq!(&keys[60..], &["NaN", "inf"]);
        assert_eq!(weekly[60].transactions, 4);
    }

    #[test]
    fn test_summarize_without_amount() {
        let table = TransactionTable::new(vec!["Month".into()], vec![vec![n(1.0)]]);
        let monthly = summarize_by_key(&table, "Month").unwrap();

        assert_eq!(monthly[0].amount_total, None);
        assert_eq!(monthly[0].impulse_count, None);
    }

    #[test]
    fn test_filter_by_user() {
        let table = TransactionTable::new(
            vec!["User_ID".into(), "Amount".into()],
            vec![vec![n(101.0), n(1.0)], vec![t("U2"), n(2.0)], vec![n(101.0), n(3.0)]],
        );

        let filtered = filter_by_user(&table, "101").unwrap();

        assert_eq!(filtered.row_count(), 2);
        assert_eq!(table.row_count(), 3);
        assert_eq!(distinct_values(&table, "User_ID").unwrap(), vec!["101", "U2"]);
    }
}
