// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use cityfeed::app_config::{self, Config};
use cityfeed::app_controller::Controller;
use cityfeed::charts::ChartOutcome;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest the next chunk of cities and rebuild weather and air-quality outputs
    Weather,

    /// Ingest the next page of news for every country and rebuild trend outputs
    News,

    /// Show stored row counts and counter positions
    Stats,

    /// Generate shell completions for cityfeed
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// cityfeed - incremental weather, air-quality and news ingestion
#[derive(Parser, Debug)]
#[command(name = "cityfeed")]
#[command(version)]
#[command(about = "Incremental REST ingestion into SQLite with reports and charts")]
#[command(long_about = "cityfeed pulls weather, air-quality and news data into a local SQLite
database a slice at a time, then aggregates everything stored so far into
text reports, a CSV file and PNG charts.

EXAMPLES:
    cityfeed weather                         # Ingest the next 25 cities
    cityfeed news                            # Ingest the next page of articles
    cityfeed --no-charts weather             # Skip chart rendering
    cityfeed --log-level debug news          # Verbose logging
    cityfeed stats                           # Show what has been stored
    cityfeed completions bash > cityfeed.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

CREDENTIALS:
    weather_api_key.txt  - OpenWeatherMap API key
    api_key.txt          - NewsAPI key
    run_number.txt       - next news page, must exist before the first news run")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Do not render charts
    #[arg(long, global = true)]
    no_charts: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Prefix and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "1;31"),
            Level::Warn => ("WARN ", "1;33"),
            Level::Info => ("INFO ", "1;32"),
            Level::Debug => ("DEBUG", "1;36"),
            Level::Trace => ("TRACE", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (prefix, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, prefix, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Start at Trace so the level can only be narrowed afterwards
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "cityfeed", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&level));
    }

    let config = load_config(&cli)?;
    let controller = Controller::with_config(config)?;

    match cli.command {
        Commands::Weather => {
            let summary = controller.run_weather().await?;
            if !summary.advanced {
                info!("Nothing new ingested; reports were rebuilt from stored data.");
            }
            report_outputs(&summary.reports, &summary.charts);
        }
        Commands::News => {
            let summary = controller.run_news().await?;
            info!(
                "Page {}: {} articles stored, {} duplicates skipped, {} failed queries",
                summary.page, summary.articles_inserted, summary.duplicates_skipped, summary.failed_queries
            );
            report_outputs(&summary.reports, &summary.charts);
        }
        Commands::Stats => {
            let status = controller.status()?;
            println!("{}", status.database);
            match status.weather_chunk {
                Some(chunk) => println!("Weather chunks processed: {}", chunk),
                None => println!("Weather chunk counter unreadable"),
            }
            match status.news_page {
                Some(page) => println!("Next news page: {}", page),
                None => println!("News page counter missing"),
            }
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Load or create the configuration and apply command line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let (mut config, created) = Config::load_or_create(&cli.config)?;
    if created {
        warn!("Config file not found at {:?}, created default config.", cli.config);
    }

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(level_filter(&config.log_level));
    }

    if cli.no_charts {
        config.render_charts = false;
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn report_outputs(reports: &[PathBuf], charts: &[ChartOutcome]) {
    for report in reports {
        info!("Report: {}", report.display());
    }
    for chart in charts {
        if let ChartOutcome::Rendered(path) = chart {
            info!("Chart: {}", path.display());
        }
    }
}
