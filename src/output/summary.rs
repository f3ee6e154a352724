//! Plain-text report summary for the terminal.

use crate::aggregator::format_metric;
use crate::parser::schema::{AnalysisReport, GroupCount};
use std::fmt::{self, Write};

/// Render a report as a human-readable summary
///
/// **Public** - printed by `analyze --summary`
pub fn render_summary(report: &AnalysisReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_summary(&mut out, report);
    out
}

fn write_summary(out: &mut String, report: &AnalysisReport) -> fmt::Result {
    let kpis = &report.kpis;

    writeln!(out, "{}", "=".repeat(80))?;
    writeln!(out, "IMPULSE SPENDING SUMMARY")?;
    writeln!(out, "{}", "=".repeat(80))?;
    writeln!(out, "Source:               {}", report.source)?;
    if let Some(user) = &report.user_filter {
        writeln!(out, "User:                 {}", user)?;
    }
    writeln!(out, "Total Transactions:   {}", kpis.total)?;
    writeln!(
        out,
        "Impulse Transactions: {}",
        kpis.impulse_count
            .map(|c| c.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    )?;
    let rate = kpis
        .impulse_pct
        .map(|pct| format!("{:.2}%", pct))
        .unwrap_or_else(|| "N/A".to_string());
    writeln!(out, "Impulse Rate:         {}", rate)?;
    writeln!(out, "Avg Spend (All):      {}", format_metric(kpis.avg_amount))?;
    writeln!(out, "Avg Impulse Spend:    {}", format_metric(kpis.avg_impulse_amount))?;
    writeln!(out, "Avg Impulse Score:    {}", format_metric(kpis.avg_impulse_score))?;

    if let Some(band) = report.risk_band {
        writeln!(out, "Risk Band:            {:?}", band)?;
    }

    if let Some(triggers) = &report.triggers {
        writeln!(out, "\nTriggers:")?;
        for trigger in triggers {
            writeln!(out, "  {:<24} {:>6}", trigger.name, trigger.count)?;
        }
    }

    if let Some(days) = &report.weekday_pattern {
        write_groups(out, "Impulses by Day of Week", days)?;
    }

    if let Some(categories) = &report.category_breakdown {
        write_groups(out, "Impulses by Category", categories)?;
    }

    if let Some(months) = &report.monthly_summary {
        writeln!(out, "\nMonthly Summary:")?;
        for month in months {
            writeln!(
                out,
                "  {:<10} txns {:>5}  amount {:>12}  impulses {:>5}",
                month.key,
                month.transactions,
                format_metric(month.amount_total),
                month.impulse_count
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "N/A".to_string())
            )?;
        }
    }

    if let Some(latest) = &report.latest_risk {
        let verdict = if latest.risky { "HIGH RISK" } else { "low risk" };
        writeln!(
            out,
            "\nLatest Transaction:   {} (score {:.2}, {})",
            latest.timestamp, latest.score, verdict
        )?;
    }

    if let Some(alert) = &report.alert {
        writeln!(out, "\nAlert [{:?}]: {}", alert.level, alert.message)?;
        if alert.celebrate {
            writeln!(out, "Impulse control is exceptional this period.")?;
        }
    }

    if !report.issues.is_empty() {
        writeln!(out, "\n{} data issue(s); first: {}", report.issues.len(), report.issues[0])?;
    }

    writeln!(out, "{}", "=".repeat(80))
}

fn write_groups(out: &mut String, title: &str, groups: &[GroupCount]) -> fmt::Result {
    writeln!(out, "\n{}:", title)?;
    for group in groups {
        writeln!(out, "  {:<24} {:>6}", group.key, group.count)?;
    }
    Ok(())
}
