//! Caller-configured alert tiers for the impulse rate.
//!
//! Dashboards disagreed on where the tier boundaries sit, so no policy is
//! built into the report: callers pick a preset or supply their own tiers.

use crate::parser::{Alert, AlertLevel};
use serde::{Deserialize, Serialize};

/// One alert tier: fires when the impulse rate is strictly above `above`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertTier {
    pub above: f64,
    pub level: AlertLevel,
    pub message: String,
}

/// Ordered alert tiers plus the fallback message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPolicy {
    /// Evaluated highest threshold first
    pub tiers: Vec<AlertTier>,

    /// Message when no tier fires
    pub fallback: String,

    /// Congratulate when the rate is strictly below this value
    #[serde(default)]
    pub celebrate_below: Option<f64>,
}

impl AlertPolicy {
    /// Critical above 70, high above 50, moderate above 30
    pub fn three_tier() -> Self {
        Self {
            tiers: vec![
                tier(70.0, AlertLevel::Error, "Critical: impulse spending is extremely high. Set strict budgets."),
                tier(50.0, AlertLevel::Warning, "High impulse risk detected. Track weekend and late-night spending."),
                tier(30.0, AlertLevel::Info, "Moderate impulse activity. Watch discretionary expenses."),
            ],
            fallback: "Spending is under control.".to_string(),
            celebrate_below: Some(25.0),
        }
    }

    /// High above 60, moderate above 30
    pub fn two_tier() -> Self {
        Self {
            tiers: vec![
                tier(60.0, AlertLevel::Error, "High risk: spending control strongly recommended."),
                tier(30.0, AlertLevel::Warning, "Moderate risk: monitor spending on weekends and late nights."),
            ],
            fallback: "Low risk: impulse behaviour appears well managed.".to_string(),
            celebrate_below: Some(25.0),
        }
    }

    /// Check tier thresholds lie within [0, 100]
    pub fn validate(&self) -> Result<(), String> {
        let thresholds = self
            .tiers
            .iter()
            .map(|t| t.above)
            .chain(self.celebrate_below);

        for value in thresholds {
            if !(0.0..=100.0).contains(&value) {
                return Err(format!("alert threshold {} outside [0, 100]", value));
            }
        }
        Ok(())
    }

    /// Pick the alert for an impulse percentage
    ///
    /// **Public** - the highest tier whose threshold is exceeded wins
    pub fn evaluate(&self, impulse_pct: f64) -> Alert {
        let mut tiers: Vec<&AlertTier> = self.tiers.iter().collect();
        tiers.sort_by(|a, b| b.above.total_cmp(&a.above));

        let (level, message) = tiers
            .into_iter()
            .find(|t| impulse_pct > t.above)
            .map(|t| (t.level, t.message.clone()))
            .unwrap_or_else(|| (AlertLevel::Success, self.fallback.clone()));

        Alert {
            level,
            message,
            celebrate: self.celebrate_below.is_some_and(|limit| impulse_pct < limit),
        }
    }
}

fn tier(above: f64, level: AlertLevel, message: &str) -> AlertTier {
    AlertTier {
        above,
        level,
        message: message.to_string(),
    }
}
