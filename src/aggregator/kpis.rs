//! Headline metrics: totals, impulse rate and average spend.

use super::cells::{dedup_issues, impulse_flags, malformed, mean, round2};
use crate::parser::{Field, Kpis, TransactionTable};
use crate::utils::error::AggregateError;
use log::debug;
use serde::{Deserialize, Serialize};

/// What to do when `Is_Impulse` is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPolicy {
    /// Fail with `MissingColumn`
    Required,
    /// Report impulse metrics as N/A
    #[default]
    Optional,
}

/// Compute headline metrics for a table
///
/// **Public** - main entry point for KPI calculation
///
/// # Arguments
/// * `table` - Transactions to summarise
/// * `policy` - Whether `Is_Impulse` must be present
///
/// # Returns
/// KPIs with absent metrics as `None`. An empty table yields
/// `total = 0`, `impulse_pct = 0` and `None` averages.
///
/// # Errors
/// * `AggregateError::MissingColumn` - `Is_Impulse` absent under `ColumnPolicy::Required`
pub fn compute_kpis(table: &TransactionTable, policy: ColumnPolicy) -> Result<Kpis, AggregateError> {
    let total = table.row_count();
    let mut issues = Vec::new();

    let impulse_col = match (Field::IsImpulse.resolve(table), policy) {
        (Some(col), _) => Some(col),
        (None, ColumnPolicy::Required) => {
            return Err(AggregateError::missing(Field::IsImpulse.canonical_name()))
        }
        (None, ColumnPolicy::Optional) => None,
    };

    let flags = impulse_col.map(|col| impulse_flags(table, col, &mut issues));

    let impulse_count = flags
        .as_ref()
        .map(|flags| flags.iter().filter(|f| **f == Some(true)).count() as u64);

    let impulse_pct = impulse_count.map(|count| {
        if total == 0 {
            0.0
        } else {
            round2(100.0 * count as f64 / total as f64)
        }
    });

    let amounts: Option<Vec<Option<f64>>> = Field::Amount.resolve(table).map(|col| {
        (0..total)
            .map(|row| match table.cell(row, col).as_number() {
                Ok(amount) => amount,
                Err(reason) => {
                    issues.push(malformed(table, row, col, reason));
                    None
                }
            })
            .collect()
    });

    let avg_amount = amounts.as_ref().and_then(|amounts| {
        let present: Vec<f64> = amounts.iter().flatten().copied().collect();
        mean(&present).map(round2)
    });

    let avg_impulse_amount = match (&amounts, &flags) {
        (Some(amounts), Some(flags)) => {
            let impulse_amounts: Vec<f64> = amounts
                .iter()
                .zip(flags)
                .filter(|(_, flag)| **flag == Some(true))
                .filter_map(|(amount, _)| *amount)
                .collect();
            mean(&impulse_amounts).map(round2)
        }
        _ => None,
    };

    let avg_impulse_score = Field::ImpulseScore.resolve(table).and_then(|col| {
        let scores: Vec<f64> = (0..total)
            .filter_map(|row| match table.cell(row, col).as_score() {
                Ok(score) => score,
                Err(reason) => {
                    issues.push(malformed(table, row, col, reason));
                    None
                }
            })
            .collect();
        mean(&scores).map(round2)
    });

    dedup_issues(&mut issues);

    debug!(
        "KPIs: total={} impulse={:?} pct={:?} issues={}",
        total,
        impulse_count,
        impulse_pct,
        issues.len()
    );

    Ok(Kpis {
        total,
        impulse_count,
        impulse_pct,
        avg_amount,
        avg_impulse_amount,
        avg_impulse_score,
        issues,
    })
}

/// Format an optional metric the way dashboards show it
///
/// **Public** - used by the text summary
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "N/A".to_string(),
    }
}
