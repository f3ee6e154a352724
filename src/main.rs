//! Impulse Insights CLI
//!
//! Summarises impulse-labelled transaction spreadsheets into KPIs,
//! trigger counts and grouped breakdowns.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use impulse_insights::commands::{
    display_version, execute_analyze, inspect_input, list_users, validate_args, AlertPreset,
    AnalyzeArgs,
};
use impulse_insights::utils::config::SCHEMA_VERSION;

/// Impulse Insights - impulse spending analytics for transaction exports
#[derive(Parser, Debug)]
#[command(name = "impulse-insights")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyse a transaction file and write a report
    Analyze {
        /// Transaction file (.csv or .xlsx)
        #[arg(short, long)]
        input: PathBuf,

        /// Only analyse this user's transactions
        #[arg(short, long)]
        user: Option<String>,

        /// Output path for the JSON report (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output path for an xlsx snapshot of the analysed rows
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Output path for a CSV snapshot of the analysed rows
        #[arg(long)]
        csv_export: Option<PathBuf>,

        /// JSON configuration file
        #[arg(short, long, env = "IMPULSE_INSIGHTS_CONFIG")]
        config: Option<PathBuf>,

        /// Alert tier preset
        #[arg(long, value_enum)]
        alerts: Option<AlertPreset>,

        /// Score at or above which the latest transaction is risky
        #[arg(long)]
        risk_threshold: Option<f64>,

        /// Fail instead of degrading when Is_Impulse is missing
        #[arg(long)]
        require_impulse: bool,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Show the rows, columns and recognised fields of an input file
    Inspect {
        /// Transaction file (.csv or .xlsx)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List distinct user IDs in an input file
    Users {
        /// Transaction file (.csv or .xlsx)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Display report schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            input,
            user,
            output,
            export,
            csv_export,
            config,
            alerts,
            risk_threshold,
            require_impulse,
            summary,
        } => {
            let args = AnalyzeArgs {
                input,
                user_id: user,
                output_json: output,
                export_xlsx: export,
                export_csv: csv_export,
                config_path: config,
                alert_preset: alerts,
                risk_threshold,
                require_impulse,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            execute_analyze(args)?;
        }

        Commands::Inspect { input } => {
            inspect_input(&input)?;
        }

        Commands::Users { input } => {
            list_users(&input)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display schema information
///
/// **Private** - internal command implementation
fn display_schema(show_details: bool) {
    println!("Impulse Insights Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string             - Schema version (e.g., '1.0.0')");
        println!("  source: string              - Input file name");
        println!("  user_filter: string?        - User the rows were restricted to");
        println!("  kpis: object                - Headline metrics (null when not computable)");
        println!("    total: number             - Transactions analysed");
        println!("    impulse_count: number?    - Rows with Is_Impulse = 1");
        println!("    impulse_pct: number?      - Impulse rate, 2 decimals");
        println!("    avg_amount: number?       - Mean amount, 2 decimals");
        println!("    avg_impulse_amount: number? - Mean impulse amount, 2 decimals");
        println!("    avg_impulse_score: number?  - Mean impulse score, 2 decimals");
        println!("  risk_band: string?          - low / moderate / high");
        println!("  alert: object?              - Configured alert tier outcome");
        println!("  triggers: array?            - Impulse rows per trigger signal");
        println!("  weekday_pattern: array?     - Impulse rows per weekday, Monday first");
        println!("  category_breakdown: array?  - Impulse rows per category");
        println!("  weekly_trend: array?        - Rows / spend / impulse per week");
        println!("  monthly_summary: array?     - Rows / spend / impulse per month");
        println!("  flag_breakdown: array       - Value counts of signal columns");
        println!("  latest_risk: object?        - Risk of the most recent transaction");
        println!("  capabilities: array         - Recognised fields and their columns");
        println!("  issues: array               - Data problems found while analysing");
        println!("  generated_at: string        - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}
