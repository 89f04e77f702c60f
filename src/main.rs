//! CLI entry point for the peer checker.
//!
//! Scans a public peer list, probes every peer once and prints the report.

use anyhow::Result;
use clap::Parser;
use log::error;
use peer_checker::{utils::CheckerConfig, PeerChecker};
use std::io::Write;
use std::path::PathBuf;

/// Peer Checker - reachability and latency of public peers
#[derive(Parser)]
#[command(name = "peer-checker")]
#[command(about = "Checks which peers of a public peer list are alive, sorted by latency")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(after_help = "Example: peer-checker ~/Projects/yggdrasil/public_peers")]
struct Cli {
    /// Path to the public peers repository on disk
    #[arg(value_name = "ROOT")]
    root: PathBuf,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only check these regions (can be used multiple times)
    #[arg(short, long, value_name = "REGION")]
    region: Vec<String>,

    /// Only check these country files, e.g. germany.md (can be used multiple times)
    #[arg(short = 'C', long, value_name = "FILE")]
    country: Vec<String>,

    /// TCP/TLS connect timeout in seconds
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Verbose logging (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CheckerConfig::load(cli.config.as_deref())?;

    if !cli.region.is_empty() {
        config.discovery.regions = cli.region;
    }
    if !cli.country.is_empty() {
        config.discovery.countries = cli.country;
    }
    if let Some(timeout) = cli.timeout {
        config.probe.connect_timeout = timeout;
    }
    config.validate()?;

    setup_logging(&config.logging.level, cli.verbose, cli.quiet);

    let checker = PeerChecker::new(config)?;
    let report = match checker.run(&cli.root).await {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            eprintln!("Can't find peers in a directory: {}", cli.root.display());
            std::process::exit(1);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report.render(&mut out)?;
    out.flush()?;

    Ok(())
}

fn setup_logging(configured: &str, verbose: u8, quiet: bool) {
    let log_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => configured,
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_secs()
        .init();
}
