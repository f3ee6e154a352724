//! Configuration and constants for the CLI.

use crate::aggregator::{AlertPolicy, ColumnPolicy, TriggerSpec};
use crate::utils::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Sheet name used for exported snapshots
pub const SNAPSHOT_SHEET_NAME: &str = "Impulse Report";

/// MIME type of exported snapshots
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Default threshold for the latest-transaction risk flag
pub const DEFAULT_RISK_THRESHOLD: f64 = 0.7;

/// Time bucket score at or above which a purchase counts as evening/night
pub const DEFAULT_EVENING_THRESHOLD: f64 = 0.7;

/// Excel caps sheet names at 31 characters
pub const MAX_SHEET_NAME_LEN: usize = 31;

pub const DAYS_OF_WEEK: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

// Header aliases (different dashboard exports used different names)
pub const AMOUNT_COLUMN_NAMES: &[&str] = &["Amount_Magnitude", "Amount"];
pub const IS_IMPULSE_COLUMN_NAMES: &[&str] = &["Is_Impulse"];
pub const IMPULSE_SCORE_COLUMN_NAMES: &[&str] = &["Impulse_Score"];
pub const CATEGORY_COLUMN_NAMES: &[&str] = &["Category"];
pub const MERCHANT_RISK_COLUMN_NAMES: &[&str] = &["Is_Impulse_Merchant", "Merchant_Risk"];
pub const CATEGORY_RISK_COLUMN_NAMES: &[&str] = &["Is_Impulse_Category", "Category_Risk"];
pub const DAY_OF_WEEK_COLUMN_NAMES: &[&str] = &["Day of Week", "Day_Of_Week"];
pub const WEEK_COLUMN_NAMES: &[&str] = &["Week"];
pub const MONTH_COLUMN_NAMES: &[&str] = &["Month"];
pub const IS_WEEKEND_COLUMN_NAMES: &[&str] = &["Is_Weekend", "Weekend_Flag"];
pub const POST_SALARY_COLUMN_NAMES: &[&str] = &["Post_Salary_Window"];
pub const IS_LOW_AMOUNT_COLUMN_NAMES: &[&str] = &["Is_Low_Amount"];
pub const TIME_BUCKET_SCORE_COLUMN_NAMES: &[&str] = &["Time_Bucket_Score"];
pub const TIME_OF_DAY_BUCKET_COLUMN_NAMES: &[&str] = &["Time_of_Day_Bucket"];
pub const USER_ID_COLUMN_NAMES: &[&str] = &["User_ID", "UserId"];
pub const TIMESTAMP_COLUMN_NAMES: &[&str] = &["Timestamp"];

/// Tunable parameters for one analysis request
///
/// **Public** - loaded from a JSON file and/or built from CLI flags
///
/// Every field has a default, so a config file only needs the keys it
/// wants to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Score at or above which the latest transaction is flagged risky
    pub risk_threshold: f64,

    /// Time bucket score at or above which the evening trigger fires
    pub evening_threshold: f64,

    /// Whether a missing `Is_Impulse` column aborts the KPI step
    pub column_policy: ColumnPolicy,

    /// Alert tiers; no alert is produced when unset
    pub alert_policy: Option<AlertPolicy>,

    /// Triggers appended after the built-in list
    pub extra_triggers: Vec<TriggerSpec>,

    /// Sheet name for exported snapshots
    pub sheet_name: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            evening_threshold: DEFAULT_EVENING_THRESHOLD,
            column_policy: ColumnPolicy::Optional,
            alert_policy: None,
            extra_triggers: Vec::new(),
            sheet_name: SNAPSHOT_SHEET_NAME.to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a JSON file
    ///
    /// **Public** - used by the analyze command's `--config` flag
    ///
    /// # Errors
    /// * `ConfigError::Io` - file cannot be read
    /// * `ConfigError::Json` - file is not valid config JSON
    /// * `ConfigError::Invalid` - a value fails validation
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading analysis config from: {}", path.display());

        let raw = std::fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&raw)?;
        config.validate()?;

        Ok(config)
    }

    /// Check value ranges
    ///
    /// **Public** - CLI overrides are re-validated after being applied
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("risk_threshold", self.risk_threshold),
            ("evening_threshold", self.evening_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.sheet_name.trim().is_empty() {
            return Err(ConfigError::Invalid("sheet_name cannot be empty".to_string()));
        }

        if self.sheet_name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(ConfigError::Invalid(format!(
                "sheet_name is longer than {} characters",
                MAX_SHEET_NAME_LEN
            )));
        }

        for trigger in &self.extra_triggers {
            if trigger.name.trim().is_empty() || trigger.columns.is_empty() {
                return Err(ConfigError::Invalid(
                    "extra triggers need a name and at least one column".to_string(),
                ));
            }
        }

        if let Some(policy) = &self.alert_policy {
            policy.validate().map_err(ConfigError::Invalid)?;
        }

        Ok(())
    }
}
