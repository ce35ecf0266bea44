use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use pii_guard_core::{render_report, scan, validate_scan_root, OutputFormat};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "pii-guard",
    author,
    version,
    about = "Scan a directory tree for personal data (GDPR compliance)"
)]
struct Cli {
    /// Directory to scan (default: current directory)
    #[arg(value_name = "DIRECTORY", default_value = ".")]
    directory: PathBuf,

    /// Output results as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    validate_scan_root(&cli.directory)?;

    eprintln!("Scanning {} for PII...", cli.directory.display());
    let report = scan(&cli.directory)?;

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let rendered = render_report(&report, format).context("failed to render report")?;
    println!("{rendered}");

    // Critical/high findings flip the exit code so the tool gates CI runs.
    Ok(if report.has_blocking_findings() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
