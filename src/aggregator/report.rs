//! Full analysis: every aggregation the table's columns support.

use super::cells::dedup_issues;
use super::grouping::{group_by_ordered_key, summarize_by_key, value_counts};
use super::kpis::compute_kpis;
use super::risk::latest_row_risk_with_issues;
use super::triggers::{compute_triggers, default_triggers};
use crate::parser::{
    AnalysisReport, Field, RiskBand, SchemaCapabilities, TransactionTable, ValueBreakdown,
};
use crate::utils::config::{AnalysisConfig, DAYS_OF_WEEK, SCHEMA_VERSION};
use crate::utils::error::AggregateError;
use log::{debug, info};

/// Raw trigger columns whose value distribution is reported
const BREAKDOWN_FIELDS: [Field; 3] = [Field::PostSalaryWindow, Field::IsWeekend, Field::TimeOfDayBucket];

/// Build a complete report for one table
///
/// **Public** - main entry point used by the analyze command
///
/// # Arguments
/// * `table` - Transactions to analyse (already filtered, if needed)
/// * `config` - Thresholds, alert policy and extra triggers
/// * `source` - Label recorded in the report (usually the file name)
///
/// # Returns
/// A report whose sections are `None` when the input lacks the columns
/// they need. Cells that could not be read are listed in `issues`.
///
/// # Errors
/// * `AggregateError::MissingColumn` - `Is_Impulse` absent while the
///   config requires it
pub fn analyze(
    table: &TransactionTable,
    config: &AnalysisConfig,
    source: &str,
) -> Result<AnalysisReport, AggregateError> {
    let caps = SchemaCapabilities::detect(table);
    let mut issues = Vec::new();

    if table.is_empty() {
        issues.push(AggregateError::EmptyInput);
    }

    let mut kpis = compute_kpis(table, config.column_policy)?;
    issues.append(&mut kpis.issues);

    let risk_band = kpis.impulse_pct.map(RiskBand::from_pct);
    let alert = config
        .alert_policy
        .as_ref()
        .zip(kpis.impulse_pct)
        .map(|(policy, pct)| policy.evaluate(pct));

    let has_impulse = caps.supports(Field::IsImpulse);

    let triggers = if has_impulse {
        let mut specs = default_triggers(config.evening_threshold);
        specs.extend(config.extra_triggers.iter().cloned());
        recover(compute_triggers(table, &specs), &mut issues).map(|mut summary| {
            issues.append(&mut summary.issues);
            summary.counts
        })
    } else {
        None
    };

    let weekday_pattern = match (has_impulse, caps.column_name(Field::DayOfWeek)) {
        (true, Some(column)) => recover(
            group_by_ordered_key(table, column, &DAYS_OF_WEEK, true),
            &mut issues,
        ),
        _ => None,
    };

    let category_breakdown = match (has_impulse, caps.column_name(Field::Category)) {
        (true, Some(column)) => recover(group_by_ordered_key(table, column, &[], true), &mut issues),
        _ => None,
    };

    let weekly_trend = caps
        .column_name(Field::Week)
        .and_then(|column| recover(summarize_by_key(table, column), &mut issues));

    let monthly_summary = caps
        .column_name(Field::Month)
        .and_then(|column| recover(summarize_by_key(table, column), &mut issues));

    let flag_breakdown = BREAKDOWN_FIELDS
        .iter()
        .filter_map(|&field| caps.column_name(field))
        .filter_map(|column| {
            recover(value_counts(table, column), &mut issues).map(|counts| ValueBreakdown {
                column: column.to_string(),
                counts,
            })
        })
        .collect();

    let latest_risk = match (
        caps.column_name(Field::ImpulseScore),
        caps.column_name(Field::Timestamp),
    ) {
        (Some(score), Some(ts)) => recover(
            latest_row_risk_with_issues(table, score, ts, config.risk_threshold, &mut issues),
            &mut issues,
        )
        .flatten(),
        _ => None,
    };

    dedup_issues(&mut issues);

    info!(
        "Analysed {} rows: impulse rate {:?}%, {} issues",
        kpis.total,
        kpis.impulse_pct,
        issues.len()
    );

    Ok(AnalysisReport {
        version: SCHEMA_VERSION.to_string(),
        source: source.to_string(),
        user_filter: None,
        kpis,
        risk_band,
        alert,
        triggers,
        weekday_pattern,
        category_breakdown,
        weekly_trend,
        monthly_summary,
        flag_breakdown,
        latest_risk,
        capabilities: caps.describe(),
        issues,
        generated_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Turn a failed section into an issue and an omitted result
fn recover<T>(result: Result<T, AggregateError>, issues: &mut Vec<AggregateError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            debug!("Section omitted: {}", err);
            issues.push(err);
            None
        }
    }
}
