//! Trigger contribution counts.
//!
//! A trigger is a precomputed condition (weekend, post-salary window,
//! late hour...) that upstream labelling thinks correlates with impulse
//! buying. For each trigger we count impulse purchases where it held.

use super::cells::{dedup_issues, impulse_flags, malformed, require_field};
use crate::parser::{Field, TransactionTable, TriggerCount};
use crate::utils::error::AggregateError;
use log::debug;
use serde::{Deserialize, Serialize};

/// When a trigger cell counts as "fired"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCondition {
    /// Cell is a true 0/1 flag
    Flag,
    /// Cell is a number at or above the threshold
    AtLeast(f64),
}

/// A named trigger over one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerSpec {
    /// Display name, e.g. "Weekend"
    pub name: String,

    /// Candidate headers; the first present one is used
    pub columns: Vec<String>,

    pub condition: TriggerCondition,
}

impl TriggerSpec {
    pub fn new(name: impl Into<String>, columns: &[&str], condition: TriggerCondition) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            condition,
        }
    }

    fn for_field(name: &str, field: Field, condition: TriggerCondition) -> Self {
        Self::new(name, field.aliases(), condition)
    }

    fn resolve(&self, table: &TransactionTable) -> Option<usize> {
        let candidates: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        table.find_any_column(&candidates)
    }
}

/// The built-in trigger list
///
/// **Public** - callers append their own triggers to this list
///
/// # Arguments
/// * `evening_threshold` - `Time_Bucket_Score` at or above which a purchase
///   counts as evening/night
pub fn default_triggers(evening_threshold: f64) -> Vec<TriggerSpec> {
    vec![
        TriggerSpec::for_field("Weekend", Field::IsWeekend, TriggerCondition::Flag),
        TriggerSpec::for_field("Low Amount (< €60)", Field::IsLowAmount, TriggerCondition::Flag),
        TriggerSpec::for_field(
            "Evening/Night Time",
            Field::TimeBucketScore,
            TriggerCondition::AtLeast(evening_threshold),
        ),
        TriggerSpec::for_field("Post-Salary Window", Field::PostSalaryWindow, TriggerCondition::Flag),
        TriggerSpec::for_field("High-Risk Merchant", Field::MerchantRisk, TriggerCondition::Flag),
        TriggerSpec::for_field("High-Risk Category", Field::CategoryRisk, TriggerCondition::Flag),
    ]
}

/// Trigger counts plus the cells that could not be read
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerSummary {
    pub counts: Vec<TriggerCount>,
    pub issues: Vec<AggregateError>,
}

impl TriggerSummary {
    /// Count for a trigger by display name
    pub fn get(&self, name: &str) -> Option<u64> {
        self.counts.iter().find(|t| t.name == name).map(|t| t.count)
    }
}

/// Count impulse purchases per trigger
///
/// **Public** - main entry point for trigger analysis
///
/// # Arguments
/// * `table` - Transactions to scan
/// * `triggers` - Triggers to evaluate, in output order
///
/// # Returns
/// One entry per trigger whose column is present. Triggers without a
/// column are omitted so callers only render what the data supports.
///
/// # Errors
/// * `AggregateError::MissingColumn` - `Is_Impulse` absent
pub fn compute_triggers(
    table: &TransactionTable,
    triggers: &[TriggerSpec],
) -> Result<TriggerSummary, AggregateError> {
    let impulse_col = require_field(table, Field::IsImpulse)?;
    let mut issues = Vec::new();
    let flags = impulse_flags(table, impulse_col, &mut issues);

    let mut counts = Vec::with_capacity(triggers.len());

    for trigger in triggers {
        let Some(col) = trigger.resolve(table) else {
            debug!("Trigger '{}' skipped: no column among {:?}", trigger.name, trigger.columns);
            continue;
        };

        let mut count = 0u64;
        for (row, flag) in flags.iter().enumerate() {
            if *flag != Some(true) {
                continue;
            }

            let cell = table.cell(row, col);
            let fired = match trigger.condition {
                TriggerCondition::Flag => cell.as_flag().map(|f| f == Some(true)),
                TriggerCondition::AtLeast(threshold) => {
                    cell.as_number().map(|v| v.is_some_and(|v| v >= threshold))
                }
            };

            match fired {
                Ok(true) => count += 1,
                Ok(false) => {}
                Err(reason) => issues.push(malformed(table, row, col, reason)),
            }
        }

        counts.push(TriggerCount {
            name: trigger.name.clone(),
            column: table.column_name(col).to_string(),
            count,
        });
    }

    dedup_issues(&mut issues);

    debug!("Evaluated {} of {} triggers", counts.len(), triggers.len());

    Ok(TriggerSummary { counts, issues })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CellValue;

    fn n(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    #[test]
    fn test_triggers_count_only_impulse_rows() {
        let table = TransactionTable::new(
            vec!["Is_Impulse".into(), "Is_Weekend".into(), "Time_Bucket_Score".into()],
            vec![
                vec![n(1.0), n(1.0), n(0.9)],
                vec![n(0.0), n(1.0), n(0.9)],
                vec![n(1.0), n(0.0), n(0.7)],
                vec![n(1.0), n(1.0), n(0.2)],
            ],
        );

        let summary = compute_triggers(&table, &default_triggers(0.7)).unwrap();

        assert_eq!(summary.counts.len(), 2);
        assert_eq!(summary.get("Weekend"), Some(2));
        assert_eq!(summary.get("Evening/Night Time"), Some(2));
        assert_eq!(summary.get("Post-Salary Window"), None);
    }

    #[test]
    fn test_trigger_alias_column() {
        let table = TransactionTable::new(
            vec!["Is_Impulse".into(), "Weekend_Flag".into()],
            vec![vec![n(1.0), n(1.0)]],
        );
        let summary = compute_triggers(&table, &default_triggers(0.7)).unwrap();

        assert_eq!(summary.counts[0].column, "Weekend_Flag");
        assert_eq!(summary.get("Weekend"), Some(1));
    }

    #[test]
    fn test_custom_trigger_appended() {
        let table = TransactionTable::new(
            vec!["Is_Impulse".into(), "Is_Online".into()],
            vec![vec![n(1.0), n(1.0)], vec![n(1.0), n(0.0)]],
        );
        let mut triggers = default_triggers(0.7);
        triggers.push(TriggerSpec::new("Online", &["Is_Online"], TriggerCondition::Flag));

        let summary = compute_triggers(&table, &triggers).unwrap();

        assert_eq!(summary.counts.len(), 1);
        assert_eq!(summary.get("Online"), Some(1));
    }

    #[test]
    fn test_missing_impulse_column() {
        let table = TransactionTable::new(vec!["Is_Weekend".into()], vec![vec![n(1.0)]]);
        assert!(matches!(
            compute_triggers(&table, &default_triggers(0.7)),
            Err(AggregateError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_malformed_trigger_cell_reported() {
        let table = TransactionTable::new(
            vec!["Is_Impulse".into(), "Is_Weekend".into()],
            vec![vec![n(1.0), CellValue::Text("sometimes".into())]],
        );
        let summary = compute_triggers(&table, &default_triggers(0.7)).unwrap();

        assert_eq!(summary.get("Weekend"), Some(0));
        assert_eq!(summary.issues.len(), 1);
    }
}
