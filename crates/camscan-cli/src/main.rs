//! camscan - Main entry point
//!
//! Runs a single camera discovery scan of the local subnet and prints the
//! cameras found.

mod config;

use anyhow::Result;
use camscan_core::CameraRecord;
use camscan_discovery::DiscoveryScanner;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "camscan")]
#[command(about = "Discover RTSP and HTTP cameras on the local network")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "camscan.toml")]
    config: PathBuf,

    /// Subnet prefix to scan (e.g. 192.168.1.), overrides interface detection
    #[arg(short, long)]
    subnet: Option<String>,

    /// Port probe timeout in milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Maximum number of simultaneous port probes
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Write the default configuration to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("camscan v{}", env!("CARGO_PKG_VERSION"));

    if let Some(path) = args.write_config {
        config::save_default_config(&path)?;
        info!(path = %path.display(), "Wrote default configuration");
        return Ok(());
    }

    // Load configuration
    let mut config = config::load_config(&args.config)?;

    // Command-line overrides
    if let Some(subnet) = args.subnet {
        config.discovery.subnet = Some(subnet);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.discovery.probe_timeout_ms = timeout_ms;
    }
    if let Some(max) = args.max_concurrency {
        config.discovery.max_concurrent_probes = Some(max);
    }

    let scanner = DiscoveryScanner::new(config.to_scanner_config())?;

    let cameras = match scanner.try_discover().await {
        Ok(cameras) => cameras,
        Err(e) => {
            eprintln!("Could not determine network range: {}", e);
            Vec::new()
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&cameras)?);
    } else {
        print_cameras(&cameras);
    }

    Ok(())
}

fn print_cameras(cameras: &[CameraRecord]) {
    if cameras.is_empty() {
        println!("No cameras were identified.");
        return;
    }

    println!("Discovered {} cameras:", cameras.len());
    for camera in cameras {
        println!(
            "  - {} {} at {}:{} ({})",
            camera.brand, camera.model, camera.address, camera.port, camera.protocol
        );
        println!("    Stream: {}", camera.stream_endpoint);
    }
}
