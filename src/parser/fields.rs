//! Semantic transaction fields and schema capability detection.
//!
//! Uploaded sheets name the same concept differently (`Amount` vs
//! `Amount_Magnitude`, `Is_Weekend` vs `Weekend_Flag`). Each [`Field`]
//! owns an alias list; [`SchemaCapabilities`] resolves all of them once
//! per table so aggregations can ask "is this metric supported?" instead
//! of probing column names themselves.

use super::table::TransactionTable;
use crate::utils::config::*;
use serde::{Deserialize, Serialize};

/// A transaction attribute the aggregator knows how to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Amount,
    IsImpulse,
    ImpulseScore,
    Category,
    MerchantRisk,
    CategoryRisk,
    DayOfWeek,
    Week,
    Month,
    IsWeekend,
    PostSalaryWindow,
    IsLowAmount,
    TimeBucketScore,
    TimeOfDayBucket,
    UserId,
    Timestamp,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::Amount,
        Field::IsImpulse,
        Field::ImpulseScore,
        Field::Category,
        Field::MerchantRisk,
        Field::CategoryRisk,
        Field::DayOfWeek,
        Field::Week,
        Field::Month,
        Field::IsWeekend,
        Field::PostSalaryWindow,
        Field::IsLowAmount,
        Field::TimeBucketScore,
        Field::TimeOfDayBucket,
        Field::UserId,
        Field::Timestamp,
    ];

    /// Accepted header names, preferred name first
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Amount => AMOUNT_COLUMN_NAMES,
            Field::IsImpulse => IS_IMPULSE_COLUMN_NAMES,
            Field::ImpulseScore => IMPULSE_SCORE_COLUMN_NAMES,
            Field::Category => CATEGORY_COLUMN_NAMES,
            Field::MerchantRisk => MERCHANT_RISK_COLUMN_NAMES,
            Field::CategoryRisk => CATEGORY_RISK_COLUMN_NAMES,
            Field::DayOfWeek => DAY_OF_WEEK_COLUMN_NAMES,
            Field::Week => WEEK_COLUMN_NAMES,
            Field::Month => MONTH_COLUMN_NAMES,
            Field::IsWeekend => IS_WEEKEND_COLUMN_NAMES,
            Field::PostSalaryWindow => POST_SALARY_COLUMN_NAMES,
            Field::IsLowAmount => IS_LOW_AMOUNT_COLUMN_NAMES,
            Field::TimeBucketScore => TIME_BUCKET_SCORE_COLUMN_NAMES,
            Field::TimeOfDayBucket => TIME_OF_DAY_BUCKET_COLUMN_NAMES,
            Field::UserId => USER_ID_COLUMN_NAMES,
            Field::Timestamp => TIMESTAMP_COLUMN_NAMES,
        }
    }

    /// Preferred header name, used in error messages
    pub fn canonical_name(self) -> &'static str {
        self.aliases()[0]
    }

    /// Resolve this field to a column index in `table`
    pub fn resolve(self, table: &TransactionTable) -> Option<usize> {
        table.find_any_column(self.aliases())
    }
}

/// A field together with the header it resolved to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedField {
    pub field: Field,
    pub column: Option<String>,
}

/// Which known fields a table carries
///
/// **Public** - computed once per request, drives which metrics are reported
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaCapabilities {
    resolved: Vec<(Field, Option<usize>)>,
    columns: Vec<String>,
}

impl SchemaCapabilities {
    pub fn detect(table: &TransactionTable) -> Self {
        let resolved = Field::ALL
            .iter()
            .map(|&field| (field, field.resolve(table)))
            .collect();

        Self {
            resolved,
            columns: table.columns().to_vec(),
        }
    }

    pub fn column(&self, field: Field) -> Option<usize> {
        self.resolved
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, idx)| *idx)
    }

    pub fn column_name(&self, field: Field) -> Option<&str> {
        self.column(field)
            .and_then(|idx| self.columns.get(idx))
            .map(String::as_str)
    }

    pub fn supports(&self, field: Field) -> bool {
        self.column(field).is_some()
    }

    /// Every field with the header it resolved to (if any)
    pub fn describe(&self) -> Vec<ResolvedField> {
        self.resolved
            .iter()
            .map(|&(field, _)| ResolvedField {
                field,
                column: self.column_name(field).map(str::to_string),
            })
            .collect()
    }

    /// Headers not claimed by any known field
    pub fn unrecognized_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| !self.resolved.iter().any(|(_, r)| *r == Some(*idx)))
            .map(|(_, name)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(columns: &[&str]) -> TransactionTable {
        TransactionTable::new(columns.iter().map(|c| c.to_string()).collect(), vec![])
    }

    #[test]
    fn test_aliases_resolve() {
        let table = table_with(&["Amount", "Weekend_Flag", "Day of Week"]);
        let caps = SchemaCapabilities::detect(&table);

        assert_eq!(caps.column(Field::Amount), Some(0));
        assert_eq!(caps.column_name(Field::IsWeekend), Some("Weekend_Flag"));
        assert!(caps.supports(Field::DayOfWeek));
        assert!(!caps.supports(Field::IsImpulse));
    }

    #[test]
    fn test_preferred_alias_wins() {
        let table = table_with(&["Amount", "Amount_Magnitude"]);
        assert_eq!(Field::Amount.resolve(&table), Some(1));
    }

    #[test]
    fn test_unrecognized_columns() {
        let table = table_with(&["Is_Impulse", "Notes"]);
        let caps = SchemaCapabilities::detect(&table);
        assert_eq!(caps.unrecognized_columns(), vec!["Notes"]);
    }
}
