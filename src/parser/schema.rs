//! Output JSON schema definitions for analysis reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use super::fields::ResolvedField;
use crate::utils::error::AggregateError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Name of the analysed input (file name or caller label)
    pub source: String,

    /// User the rows were filtered to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_filter: Option<String>,

    /// Headline metrics
    pub kpis: Kpis,

    /// Gauge band for the impulse rate
    pub risk_band: Option<RiskBand>,

    /// Alert chosen by the configured policy
    pub alert: Option<Alert>,

    /// Impulse purchases per trigger (absent without `Is_Impulse`)
    pub triggers: Option<Vec<TriggerCount>>,

    /// Impulse purchases per weekday, Monday first
    pub weekday_pattern: Option<Vec<GroupCount>>,

    /// Impulse purchases per category
    pub category_breakdown: Option<Vec<GroupCount>>,

    /// Spend per week
    pub weekly_trend: Option<Vec<KeySummary>>,

    /// Spend and impulse purchases per month
    pub monthly_summary: Option<Vec<KeySummary>>,

    /// Value distribution of raw trigger columns
    pub flag_breakdown: Vec<ValueBreakdown>,

    /// Risk of the most recent transaction
    pub latest_risk: Option<LatestRisk>,

    /// Which known fields the input carried
    pub capabilities: Vec<ResolvedField>,

    /// Recoverable problems found while aggregating
    pub issues: Vec<AggregateError>,

    /// Timestamp when report was generated
    pub generated_at: String,
}

/// Headline metrics; `None` renders as "N/A"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total: usize,
    pub impulse_count: Option<u64>,
    pub impulse_pct: Option<f64>,
    pub avg_amount: Option<f64>,
    pub avg_impulse_amount: Option<f64>,
    pub avg_impulse_score: Option<f64>,

    /// Cells excluded from the figures above
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<AggregateError>,
}

/// Number of impulse purchases a trigger coincided with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerCount {
    pub name: String,
    pub column: String,
    pub count: u64,
}

/// Row count for one group key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCount {
    pub key: String,
    pub count: u64,
}

impl GroupCount {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self { key: key.into(), count }
    }
}

/// Totals for one week / month / other ordinal key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySummary {
    pub key: String,
    pub transactions: u64,
    pub amount_total: Option<f64>,
    pub impulse_count: Option<u64>,
}

/// Distinct values of one column with their counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueBreakdown {
    pub column: String,
    pub counts: Vec<GroupCount>,
}

/// Risk assessment of the most recent transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestRisk {
    pub risky: bool,
    pub score: f64,
    pub threshold: f64,
    pub timestamp: NaiveDateTime,
    /// Zero-based data row index of the transaction
    pub row: usize,
}

/// Gauge band of the impulse rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    /// Band for an impulse percentage: <30 low, <70 moderate, else high
    pub fn from_pct(pct: f64) -> Self {
        if pct < 30.0 {
            RiskBand::Low
        } else if pct < 70.0 {
            RiskBand::Moderate
        } else {
            RiskBand::High
        }
    }
}

/// Severity of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Alert chosen for an impulse percentage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    /// Impulse rate is low enough to congratulate the user
    pub celebrate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_band_boundaries() {
        assert_eq!(RiskBand::from_pct(0.0), RiskBand::Low);
        assert_eq!(RiskBand::from_pct(29.99), RiskBand::Low);
        assert_eq!(RiskBand::from_pct(30.0), RiskBand::Moderate);
        assert_eq!(RiskBand::from_pct(69.99), RiskBand::Moderate);
        assert_eq!(RiskBand::from_pct(70.0), RiskBand::High);
    }

    #[test]
    fn test_kpis_omit_empty_issues() {
        let kpis = Kpis {
            total: 0,
            impulse_count: None,
            impulse_pct: None,
            avg_amount: None,
            avg_impulse_amount: None,
            avg_impulse_score: None,
            issues: vec![],
        };
        let json = serde_json::to_string(&kpis).unwrap();
        assert!(!json.contains("issues"));
        assert!(json.contains("\"impulse_pct\":null"));
    }
}
