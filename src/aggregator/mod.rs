//! Aggregation of transaction tables into metrics and breakdowns.
//!
//! This module transforms a decoded table into:
//! - Headline KPIs (impulse rate, average spend)
//! - Trigger contribution counts
//! - Grouped counts and totals (weekday, category, week, month)
//! - Latest-transaction risk and alert selection

mod cells;
pub mod alerts;
pub mod grouping;
pub mod kpis;
pub mod report;
pub mod risk;
pub mod triggers;

// Re-export main types and functions
pub use alerts::{AlertPolicy, AlertTier};
pub use grouping::{distinct_values, filter_by_user, group_by_ordered_key, summarize_by_key, value_counts};
pub use kpis::{compute_kpis, format_metric, ColumnPolicy};
pub use report::analyze;
pub use risk::{latest_row_risk, latest_row_risk_with_issues};
pub use triggers::{compute_triggers, default_triggers, TriggerCondition, TriggerSpec, TriggerSummary};
