//! anonsift CLI
//!
//! Harvest open proxy relays and classify their anonymity.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use anonsift_core::{CandidateEndpoint, MemoryStore, RelayStore};
use anonsift_net::{direct_client, EchoOracle, HttpEchoOracle, ProbeConfig, SharedOracle};
use anonsift_runtime::{RealIdentityResolver, ScanCoordinator};
use anonsift_sources::{default_sources, harvest, parse_text_list, ProxySource, TextListSource};

mod config;
use config::ScanSettings;

#[derive(Parser)]
#[command(name = "anonsift")]
#[command(author, version, about = "anonsift: relay harvesting and anonymity classification", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest candidates and classify every one
    Scan {
        /// Read candidates from a file (one host:port per line) instead of harvesting
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write verified anonymous relays to this file as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum concurrent probes
        #[arg(long)]
        workers: Option<usize>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Probe at most this many candidates
        #[arg(long)]
        limit: Option<usize>,

        /// TOML settings file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Collect and print unique candidates without probing
    Harvest {
        /// Stop after this many candidates
        #[arg(long)]
        limit: Option<usize>,

        /// TOML settings file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Check echo oracle reachability and print the observed identity
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Scan {
            input,
            output,
            workers,
            timeout,
            limit,
            config,
        } => {
            run_scan(input, output, workers, timeout, limit, config).await?;
        }
        Commands::Harvest { limit, config } => {
            run_harvest(limit, config).await?;
        }
        Commands::Status => {
            check_status().await?;
        }
    }

    Ok(())
}

fn load_settings(config: Option<&Path>) -> Result<(ScanSettings, ProbeConfig)> {
    let settings = ScanSettings::load(config)?;
    let probe_config = settings.probe_config();
    Ok((settings, probe_config))
}

fn build_sources(settings: &ScanSettings) -> Vec<Box<dyn ProxySource>> {
    let mut sources = default_sources();
    for extra in &settings.extra_sources {
        sources.push(Box::new(TextListSource::new(
            extra.name.clone(),
            extra.urls.clone(),
        )));
    }
    sources
}

async fn collect_candidates(
    settings: &ScanSettings,
    probe_config: &ProbeConfig,
) -> Result<Vec<CandidateEndpoint>> {
    let client = direct_client(probe_config)?;
    let delay = Duration::from_millis(probe_config.courtesy_delay_ms);

    let candidates = harvest(build_sources(settings), client, delay)
        .collect::<Vec<_>>()
        .await;
    Ok(candidates)
}

fn read_candidates(path: &Path) -> Result<Vec<CandidateEndpoint>> {
    let body = fs::read_to_string(path)?;
    Ok(parse_text_list(&body))
}

async fn run_scan(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    workers: Option<usize>,
    timeout: Option<u64>,
    limit: Option<usize>,
    config: Option<PathBuf>,
) -> Result<()> {
    println!("🔎 anonsift - relay anonymity scan\n");

    let (settings, mut probe_config) = load_settings(config.as_deref())?;
    if let Some(workers) = workers {
        probe_config.max_in_flight = workers;
    }
    if let Some(timeout) = timeout {
        probe_config.timeout_secs = timeout;
    }

    let mut candidates = match &input {
        Some(path) => {
            let candidates = read_candidates(path)?;
            println!("📄 Loaded {} candidates from {}", candidates.len(), path.display());
            candidates
        }
        None => {
            println!("🌐 Harvesting candidates from list sources...");
            let candidates = collect_candidates(&settings, &probe_config).await?;
            println!("📦 Harvested {} unique candidates", candidates.len());
            candidates
        }
    };

    if let Some(limit) = limit {
        candidates.truncate(limit);
    }

    let oracle: SharedOracle = Arc::new(HttpEchoOracle::new(probe_config.clone()));

    // Identity resolution strictly precedes probing.
    let resolver = RealIdentityResolver::new(oracle.clone());
    let identity = resolver.resolve().await;
    match identity.address() {
        Some(ip) => println!("🪪 Real outbound address: {}", ip),
        None => println!("⚠️  Real address unresolved - degraded mode (header checks disabled)"),
    }

    println!(
        "🚀 Probing {} candidates with {} workers, {}s timeout\n",
        candidates.len(),
        probe_config.max_in_flight,
        probe_config.timeout_secs
    );

    let store = Arc::new(MemoryStore::new());
    let coordinator =
        ScanCoordinator::new(oracle, store.clone(), probe_config.max_in_flight);
    let tally = coordinator.run(candidates, &identity).await;

    println!("✅ Scan complete:");
    println!("   anonymous:   {}", tally.anonymous);
    println!("   transparent: {}", tally.transparent);
    println!("   failed:      {}", tally.failed);

    let verified = store.get_all();
    match output {
        Some(path) => {
            fs::write(&path, serde_json::to_string_pretty(&verified)?)?;
            println!(
                "\n📄 Wrote {} verified relays to {}",
                verified.len(),
                path.display()
            );
        }
        None => {
            if !verified.is_empty() {
                println!("\nVerified anonymous relays:");
                for relay in &verified {
                    println!("   {} -> exit {}", relay.endpoint, relay.observed_exit);
                }
            }
        }
    }

    Ok(())
}

async fn run_harvest(limit: Option<usize>, config: Option<PathBuf>) -> Result<()> {
    let (settings, probe_config) = load_settings(config.as_deref())?;

    let mut candidates = collect_candidates(&settings, &probe_config).await?;
    if let Some(limit) = limit {
        candidates.truncate(limit);
    }

    for candidate in &candidates {
        println!("{}", candidate);
    }
    eprintln!("{} unique candidates", candidates.len());

    Ok(())
}

async fn check_status() -> Result<()> {
    println!("🔌 Checking echo oracle...\n");

    let probe_config = ProbeConfig::default();
    let oracle = HttpEchoOracle::new(probe_config.clone());

    match oracle.observed_origins(None).await {
        Ok(origins) => {
            println!("✅ Oracle reachable at {}", probe_config.ip_url);
            println!("   Observed origin: {}", origins.join(", "));
        }
        Err(e) => {
            println!("❌ Oracle unreachable: {}", e);
            println!("   Expected echo-IP endpoint at: {}", probe_config.ip_url);
        }
    }

    Ok(())
}
