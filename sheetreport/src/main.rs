use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use sheetreport_core::{ReportBuilder, ReportConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod formatter;

#[derive(Parser)]
#[command(name = "sheetreport")]
#[command(about = "Extract monthly cost and time reports from project workbooks", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the ODS/Excel workbook
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Number of months in the time sheet window (overrides the config)
    #[arg(short, long, value_name = "MONTHS")]
    months: Option<usize>,

    /// Invoice CSV export to include as the other-expenses table (overrides the config)
    #[arg(short, long, value_name = "CSV")]
    expenses: Option<PathBuf>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored summary
    Human,
    /// JSON report with costs_report, time_report and other_report
    Json,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ReportConfig> {
    if let Some(config_path) = path {
        return ReportConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }

    // Fall back to a config in the current directory, then to defaults
    let default_config_path = PathBuf::from("sheetreport.toml");
    if default_config_path.exists() {
        ReportConfig::from_file(&default_config_path).with_context(|| {
            format!(
                "Failed to load config from {}",
                default_config_path.display()
            )
        })
    } else {
        Ok(ReportConfig::default())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(months) = cli.months {
        config.time.months = months;
    }
    if let Some(expenses) = cli.expenses {
        config.expenses.file = Some(expenses);
    }
    config.validate().context("Invalid configuration")?;
    debug!(?config, "configuration loaded");

    let builder = ReportBuilder::with_config(config);
    let extraction = builder
        .build_file(&cli.file)
        .with_context(|| format!("Failed to extract report from {}", cli.file.display()))?;

    if cli.output.is_some() {
        colored::control::set_override(false);
    }

    let rendered = match cli.format {
        OutputFormat::Human => formatter::render_human(&cli.file, &extraction),
        OutputFormat::Json => formatter::render_json(&extraction.report)?,
    };

    match &cli.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write report to {}", path.display()))?,
        None => print!("{}", rendered),
    }

    Ok(())
}
