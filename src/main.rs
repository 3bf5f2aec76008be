//! # logscan - CLI Entry Point
//!
//! Commands:
//! - `scan`        - Run one detector over a log file and print a JSON page
//! - `report`      - Run every detector and print finding counts
//! - `detectors`   - List detector names
//! - `serve`       - Start the HTTP scan API
//! - `init-config` - Generate a default configuration file
//!
//! Copyright (c) 2026 logscan contributors. Licensed under the MIT License.

use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

use logscan::api::{self, PageParams, ScanPage};
use logscan::detection::{self, Detector};
use logscan::log_sources::RecordSet;
use logscan::{ScanError, ScanResult, ScannerConfig};

/// logscan - access log threat scanner.
///
/// Flags SQL injection, path traversal, bots, LFI/RFI, WordPress probes,
/// brute force, error responses and internal source addresses.
#[derive(Parser, Debug)]
#[command(name = "logscan")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "logscan.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one detector over a log file.
    Scan {
        /// Detector name (see `detectors`).
        detector: Detector,

        /// Access log file to scan.
        file: PathBuf,

        /// Page size. Defaults to scan.default_limit.
        #[arg(long)]
        limit: Option<usize>,

        /// Findings to skip before the page starts.
        #[arg(long)]
        offset: Option<usize>,
    },

    /// Run every detector and print finding counts.
    Report {
        /// Access log file to scan.
        file: PathBuf,
    },

    /// List available detectors.
    Detectors,

    /// Start the HTTP scan API.
    Serve,

    /// Generate a default configuration file.
    InitConfig,
}

#[tokio::main]
async fn main() -> ScanResult<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { detector, file, limit, offset } => {
            cmd_scan(&cli.config, detector, &file, PageParams { limit, offset })
        }
        Commands::Report { file } => cmd_report(&file),
        Commands::Detectors => {
            cmd_detectors();
            Ok(())
        }
        Commands::Serve => cmd_serve(&cli.config).await,
        Commands::InitConfig => cmd_init_config(&cli.config),
    }
}

fn read_records(file: &Path) -> ScanResult<RecordSet> {
    let raw = std::fs::read(file)?;
    let records = RecordSet::parse(&raw);
    info!("Parsed {} records from {}", records.len(), file.display());
    Ok(records)
}

fn cmd_scan(config_path: &Path, detector: Detector, file: &Path, params: PageParams) -> ScanResult<()> {
    let config = ScannerConfig::load_or_default(config_path)?;
    let (limit, offset) = params.resolve(&config.scan)?;

    let records = read_records(file)?;
    let result = detector.detect(&records);
    let page = ScanPage::build(&result, limit, offset);

    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

fn cmd_report(file: &Path) -> ScanResult<()> {
    let records = read_records(file)?;

    println!("{}: {} records", file.display(), records.len());
    for result in detection::scan_all(&records) {
        println!("  {:<16} {:>8}", result.detector().slug(), result.len());
    }
    Ok(())
}

fn cmd_detectors() {
    for detector in Detector::ALL {
        println!("{:<16} {}", detector.slug(), detector.description());
    }
}

async fn cmd_serve(config_path: &Path) -> ScanResult<()> {
    let config = ScannerConfig::load_or_default(config_path)?;
    info!("logscan v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Upload limit {} bytes, default page size {}, CORS {}",
        config.server.max_upload_bytes,
        config.scan.default_limit,
        if config.server.enable_cors { "enabled" } else { "disabled" },
    );
    api::serve(config).await
}

fn cmd_init_config(config_path: &Path) -> ScanResult<()> {
    if config_path.exists() {
        return Err(ScanError::Config(format!(
            "Configuration file already exists: {}. Remove it first or use a different path.",
            config_path.display()
        )));
    }

    ScannerConfig::write_default(config_path)?;
    println!("Default configuration written to: {}", config_path.display());
    println!();
    println!("Key settings:");
    println!("  [server] - bind address, port, CORS origins, upload size limit");
    println!("  [scan]   - default and maximum page size");

    Ok(())
}
