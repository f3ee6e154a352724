//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Loads analysis configuration
//! 2. Reads the transaction file
//! 3. Filters to one user (optional)
//! 4. Runs every supported aggregation
//! 5. Writes the report and snapshots

use crate::aggregator::{analyze, filter_by_user, AlertPolicy, ColumnPolicy};
use crate::output::{render_summary, report_to_string, write_csv_snapshot, write_report, write_snapshot};
use crate::parser::{read_table, AnalysisReport, InputFormat};
use crate::utils::config::AnalysisConfig;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Built-in alert tier presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AlertPreset {
    /// >70 critical, >50 high, >30 moderate
    ThreeTier,
    /// >60 high, >30 moderate
    TwoTier,
}

impl AlertPreset {
    pub fn policy(self) -> AlertPolicy {
        match self {
            AlertPreset::ThreeTier => AlertPolicy::three_tier(),
            AlertPreset::TwoTier => AlertPolicy::two_tier(),
        }
    }
}

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Transaction file (.csv or .xlsx)
    pub input: PathBuf,

    /// Only analyse rows for this user
    pub user_id: Option<String>,

    /// Output path for the JSON report (stdout when unset)
    pub output_json: Option<PathBuf>,

    /// Output path for an xlsx snapshot of the analysed rows
    pub export_xlsx: Option<PathBuf>,

    /// Output path for a CSV snapshot of the analysed rows
    pub export_csv: Option<PathBuf>,

    /// JSON config file
    pub config_path: Option<PathBuf>,

    /// Alert preset, overrides the config file's policy
    pub alert_preset: Option<AlertPreset>,

    /// Latest-transaction risk threshold, overrides the config file
    pub risk_threshold: Option<f64>,

    /// Fail when `Is_Impulse` is missing
    pub require_impulse: bool,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            user_id: None,
            output_json: Some(PathBuf::from("report.json")),
            export_xlsx: None,
            export_csv: None,
            config_path: None,
            alert_preset: None,
            risk_threshold: None,
            require_impulse: false,
            print_summary: false,
        }
    }
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Analyze command arguments
///
/// # Returns
/// The report that was written, so callers and tests can inspect it
///
/// # Errors
/// * Config load / validation failures
/// * Input decoding errors
/// * Missing `User_ID` column when filtering
/// * File write errors
pub fn execute_analyze(args: AnalyzeArgs) -> Result<AnalysisReport> {
    let start_time = Instant::now();

    info!("Starting analysis of: {}", args.input.display());

    // Step 1: Configuration
    info!("Step 1/5: Loading configuration...");
    let config = build_config(&args)?;
    debug!("Effective config: {:?}", config);

    // Step 2: Read input
    info!("Step 2/5: Reading transactions...");
    let table = read_table(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    // Step 3: Filter
    let table = match &args.user_id {
        Some(user) => {
            info!("Step 3/5: Filtering to user {}...", user);
            let filtered = filter_by_user(&table, user)
                .context("Cannot filter by user")?;
            if filtered.is_empty() {
                warn!("User {} has no transactions", user);
            }
            filtered
        }
        None => {
            info!("Step 3/5: Skipping user filter (not requested)");
            table
        }
    };

    // Step 4: Aggregate
    info!("Step 4/5: Aggregating {} transactions...", table.row_count());
    let source = source_label(&args.input);
    let mut report = analyze(&table, &config, &source)
        .context("Failed to analyse transactions")?;
    report.user_filter = args.user_id.clone();

    for issue in report.issues.iter().take(5) {
        warn!("{}", issue);
    }
    if report.issues.len() > 5 {
        warn!("... and {} more data issues", report.issues.len() - 5);
    }

    // Step 5: Outputs
    info!("Step 5/5: Writing outputs...");

    match &args.output_json {
        Some(path) => {
            write_report(&report, path)
                .context("Failed to write report JSON")?;
            info!("✓ Report written to: {}", path.display());
        }
        None if !args.print_summary => {
            println!("{}", report_to_string(&report)?);
        }
        None => {}
    }

    if let Some(path) = &args.export_xlsx {
        write_snapshot(&table, &config.sheet_name, path)
            .context("Failed to export xlsx snapshot")?;
        info!("✓ Snapshot written to: {}", path.display());
    }

    if let Some(path) = &args.export_csv {
        write_csv_snapshot(&table, path)
            .context("Failed to export CSV snapshot")?;
        info!("✓ CSV snapshot written to: {}", path.display());
    }

    if args.print_summary {
        println!("\n{}", render_summary(&report));
    }

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(report)
}

/// Merge the config file with CLI overrides
fn build_config(args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config_path {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    if let Some(preset) = args.alert_preset {
        config.alert_policy = Some(preset.policy());
    }
    if let Some(threshold) = args.risk_threshold {
        config.risk_threshold = threshold;
    }
    if args.require_impulse {
        config.column_policy = ColumnPolicy::Required;
    }

    config.validate().context("Invalid configuration")?;

    Ok(config)
}

fn source_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
///
/// # Arguments
/// * `args` - Arguments to validate
///
/// # Returns
/// Ok if arguments are valid, Err with message if not
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    InputFormat::from_path(&args.input)?;

    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if let Some(user) = &args.user_id {
        if user.trim().is_empty() {
            anyhow::bail!("User ID cannot be empty");
        }
    }

    if let Some(threshold) = args.risk_threshold {
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!("Risk threshold must be within [0, 1]");
        }
    }

    let outputs = [&args.output_json, &args.export_xlsx, &args.export_csv];
    for path in outputs.into_iter().flatten() {
        if path == &args.input {
            anyhow::bail!("Output path {} would overwrite the input", path.display());
        }
    }

    Ok(())
}
