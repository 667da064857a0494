//! Candidash - electoral candidate dashboard
//!
//! A CLI tool that loads candidate records from CSV exports, filters them
//! by electoral unit and office, and reports education, race/color, gender
//! and party breakdowns with charts.
//!
//! Exit codes:
//!   0 - Success (including when no input was given)
//!   1 - Error (unreadable input, missing column, bad config, etc.)

mod analysis;
mod cli;
mod config;
mod dataset;
mod models;
mod report;

use analysis::{list_distinct, run_interactive, DashboardSession, GenderLabels};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use dataset::{load_dataset, LoadOptions};
use models::{Column, DashboardReport, Dataset, ReportMetadata};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Printed when no input file was given.
const NO_INPUT_PROMPT: &str = "Please provide a CSV file with candidate data (--input <FILE>).";

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Candidash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Dashboard failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .candidash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to set column names, delimiter, encoding and gender labels.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` overrides the level chosen by --verbose / --quiet. Logs go to
/// stderr so reports printed to stdout stay clean.
fn init_logging(args: &Args) {
    let level = args.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a global tracing subscriber was already set");
    }
}

/// Run the dashboard workflow.
fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let input = match input_path(&config) {
        Some(input) => input,
        None => return write_no_input_prompt(std::io::stdout().lock()),
    };

    // Step 1: Load the dataset
    let mut options = LoadOptions::try_from(&config.input).map_err(|e| anyhow!(e))?;
    options.show_progress = !args.quiet;

    let dataset = match load_dataset(&input, &config.columns, &options) {
        Ok(dataset) => dataset,
        Err(e) => {
            if let Some(column) = e.missing_column() {
                warn!(
                    "Set the {} header with --preset or in the [columns] section of {}",
                    column, DEFAULT_CONFIG_FILE
                );
            }
            return Err(anyhow::Error::new(e)
                .context(format!("Failed to load candidates from {}", input.display())));
        }
    };

    if dataset.is_empty() {
        warn!("{} contains no candidate records", input.display());
    }

    // Handle --list: print distinct values and exit
    if let Some(column) = args.list {
        return write_distinct_values(&dataset, column, std::io::stdout().lock());
    }

    // Step 2: Select unit and office
    let mut session = DashboardSession::with_selection(
        dataset,
        GenderLabels::from(&config.report),
        args.unit.as_deref(),
        args.office.as_deref(),
    );
    info!(
        "Selected {} ({} of {} candidates)",
        session.selection(),
        session.filtered_len(),
        session.dataset().len()
    );

    if args.interactive {
        let report_config = config.report.clone();
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        return run_interactive(&mut session, stdin.lock(), stdout.lock(), |s| {
            report::generate_text_dashboard(
                s.selection(),
                s.filtered_len(),
                s.views(),
                &report_config,
            )
        });
    }

    // Step 3: Build the report
    let view = session.view();
    let report = DashboardReport {
        metadata: ReportMetadata {
            title: config.general.title.clone(),
            input: input.display().to_string(),
            sources: session.dataset().sources.clone(),
            generated_at: Utc::now(),
            total_records: session.dataset().len(),
            filtered_records: view.len(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        selection: session.selection().clone(),
        headers: config.columns.headers(),
        preview: view.head(config.report.preview_rows),
        views: session.views().clone(),
    };

    let content = match config.general.format {
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Html => report::generate_html_report(&report, &config.report),
    };

    // Step 4: Write it out
    match args.output {
        Some(ref path) => {
            report::write_report(&content, path)?;
            if !args.quiet {
                println!("Selection: {}", report.selection);
                println!(
                    "   Candidates: {} of {}",
                    report.metadata.filtered_records, report.metadata.total_records
                );
                println!("   Duration: {:.2}s", report.metadata.duration_seconds);
                println!("Report saved to: {}", path.display());
            }
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            out.write_all(content.as_bytes())
                .context("Failed to write report to stdout")?;
        }
    }

    Ok(())
}

/// Input path after config and arguments are merged, if any was given.
fn input_path(config: &Config) -> Option<PathBuf> {
    config.general.input.as_ref().map(PathBuf::from)
}

fn write_no_input_prompt<W: Write>(mut out: W) -> Result<()> {
    writeln!(out, "{}", NO_INPUT_PROMPT).context("Failed to write to stdout")
}

/// Write each distinct value of `column` on its own line, in file order.
fn write_distinct_values<W: Write>(dataset: &Dataset, column: Column, mut out: W) -> Result<()> {
    for value in list_distinct(dataset, column) {
        writeln!(out, "{}", value).context("Failed to write to stdout")?;
    }
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
