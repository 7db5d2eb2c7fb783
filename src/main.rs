use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ride_fare_estimator::{run_pipeline, AppResult, Config};

/// Estimate a fare for every ride in a CSV of GPS pings.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Input CSV: ride_id,lat,lng,timestamp (grouped by ride)
    input: PathBuf,

    /// Output CSV: ride_id,cost
    output: PathBuf,

    /// Number of fare workers (overrides FARE_WORKERS)
    #[arg(long, short)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ride_fare_estimator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fare estimation failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let started = Instant::now();

    let config = Config::from_env_with_workers(cli.workers)?;

    let input = BufReader::with_capacity(64 * 1024, File::open(&cli.input)?);
    let output = BufWriter::new(File::create(&cli.output)?);
    tracing::info!(
        input = %cli.input.display(),
        output = %cli.output.display(),
        "Estimating fares"
    );

    run_pipeline(&config, input, output).await?;

    tracing::info!(elapsed = ?started.elapsed(), "Time elapsed");
    Ok(())
}
