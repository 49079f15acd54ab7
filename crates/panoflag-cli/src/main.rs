use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use panoflag_client::{
    JsonFileSink, SidewalkSourceLister, StreetViewMetadataProvider, convert_json_to_csv,
};
use panoflag_core::config::{
    DEFAULT_CHUNK_SIZE, DEFAULT_MAX_IN_FLIGHT, DEFAULT_PACING_INTERVAL, EnrichmentConfig,
};
use panoflag_core::engine::TracingEngineReporter;
use panoflag_core::pacing::{FixedPacer, NoPacer};
use panoflag_core::traits::{NullSink, Pacer, ResultSink};
use panoflag_core::{EnrichmentService, RunSummary};

#[derive(Parser)]
#[command(
    name = "panoflag",
    version,
    about = "Flag survey panoramas whose imagery metadata is missing or unretrievable"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up imagery metadata for every panorama lacking image dimensions
    Run {
        /// Survey deployment, e.g. "amsterdam"
        #[arg(short, long)]
        city: String,

        /// Lookups per chunk
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Concurrent lookups allowed within a chunk
        #[arg(long, default_value_t = DEFAULT_MAX_IN_FLIGHT)]
        max_in_flight: usize,

        /// Seconds to wait between chunks (0 disables pacing)
        #[arg(long, default_value_t = DEFAULT_PACING_INTERVAL.as_secs())]
        pacing_secs: u64,

        /// Panorama list endpoint (defaults to the city's survey server)
        #[arg(long)]
        source_url: Option<String>,

        /// Street View metadata endpoint
        #[arg(long, env = "PANOFLAG_PROVIDER_URL")]
        provider_url: String,

        /// Per-lookup timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,

        /// Directory for the result documents
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Also write CSV copies of the result documents
        #[arg(long, default_value_t = false)]
        csv: bool,

        /// Run every lookup but do not write any files
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Convert previously written result documents to CSV
    ToCsv {
        /// Survey deployment the documents belong to
        #[arg(short, long)]
        city: String,

        /// Directory holding the JSON documents
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("panoflag=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            city,
            chunk_size,
            max_in_flight,
            pacing_secs,
            source_url,
            provider_url,
            timeout_secs,
            output_dir,
            csv,
            dry_run,
        } => {
            let config = EnrichmentConfig::new(city)
                .with_chunk_size(chunk_size)
                .with_max_in_flight(max_in_flight)
                .with_pacing_interval(Duration::from_secs(pacing_secs));
            config.validate().map_err(|e| anyhow::anyhow!(e))?;

            let lister = match source_url {
                Some(url) => SidewalkSourceLister::new(url),
                None => SidewalkSourceLister::for_config(&config),
            }
            .context("Failed to create survey API client")?;
            let provider = StreetViewMetadataProvider::with_timeout(
                &provider_url,
                Duration::from_secs(timeout_secs),
            )
            .context("Failed to create metadata client")?;

            let summary = if dry_run {
                run_with(lister, provider, NullSink, &config).await?
            } else {
                let sink = JsonFileSink::new(&output_dir, &config).with_csv(csv);
                run_with(lister, provider, sink, &config).await?
            };

            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::ToCsv { city, dir } => {
            cmd_to_csv(&city, &dir).await?;
        }
    }

    Ok(())
}

async fn run_with<K: ResultSink>(
    lister: SidewalkSourceLister,
    provider: StreetViewMetadataProvider,
    sink: K,
    config: &EnrichmentConfig,
) -> Result<RunSummary> {
    if config.pacing_interval.is_zero() {
        run_service(lister, provider, NoPacer, sink, config).await
    } else {
        let pacer = FixedPacer::new(config.pacing_interval);
        run_service(lister, provider, pacer, sink, config).await
    }
}

async fn run_service<Z: Pacer, K: ResultSink>(
    lister: SidewalkSourceLister,
    provider: StreetViewMetadataProvider,
    pacer: Z,
    sink: K,
    config: &EnrichmentConfig,
) -> Result<RunSummary> {
    let service = EnrichmentService::new(lister, provider, pacer, sink, config)
        .map_err(|e| anyhow::anyhow!(e))?;

    service.run(&TracingEngineReporter).await.map_err(|e| {
        if e.is_retryable() {
            tracing::error!(error = %e, "Run aborted by a transient failure, safe to rerun");
        }
        anyhow::anyhow!(e)
    })
}

async fn cmd_to_csv(city: &str, dir: &Path) -> Result<()> {
    let config = EnrichmentConfig::new(city);
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let (enriched, unresolved) = convert_json_to_csv(dir, &config)
        .await
        .with_context(|| format!("Failed to convert result documents in {}", dir.display()))?;

    println!("{}", enriched.display());
    println!("{}", unresolved.display());
    Ok(())
}
