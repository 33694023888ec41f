//! Voter lattice simulator CLI
//!
//! Runs one simulation per (probability, step count) pair and writes one
//! CSV file per run into the output directory.

use clap::Parser;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use voter_sim::{BatchConfig, BatchRunner, OutputFormat, RunResult};

/// Voter lattice Monte Carlo simulator
#[derive(Parser, Debug)]
#[command(name = "voter-sim")]
#[command(
    about = "Simulate a binary-opinion lattice and record its magnetization",
    long_about = None
)]
struct Args {
    /// Size of one side of the square grid
    #[arg(short = 'n', long)]
    grid_size: usize,

    /// Probability that an individual changes its state
    /// (comma separated or repeated for several runs)
    #[arg(short, long = "probability", value_delimiter = ',', required = true)]
    probabilities: Vec<f64>,

    /// Monte Carlo steps to perform (comma separated or repeated for several runs)
    #[arg(short, long, value_delimiter = ',', required = true)]
    steps: Vec<u64>,

    /// Seed for the random source (defaults to the current time in milliseconds)
    #[arg(long)]
    seed: Option<u64>,

    /// Existing directory receiving one file per run
    #[arg(long)]
    output_directory: PathBuf,

    /// Output line layout
    #[arg(long, value_enum, default_value_t = OutputFormat::Snapshot)]
    format: OutputFormat,

    /// Maximum number of runs executing at once
    #[arg(short, long, default_value = "1")]
    jobs: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for scripting
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.output_directory.is_dir() {
        eprintln!(
            "Error: output directory {} does not exist",
            args.output_directory.display()
        );
        std::process::exit(1);
    }

    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    });

    let config = BatchConfig {
        grid_size: args.grid_size,
        probabilities: args.probabilities,
        steps: args.steps,
        seed,
        output_dir: args.output_directory,
        output_format: args.format,
        max_parallel_runs: args.jobs,
    };
    debug!("config = {:?}", config);

    let runner = match BatchRunner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if !args.json {
        info!("Voter lattice simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let results = runner.run_all().await;
    let failed: Vec<&RunResult> = results.iter().filter(|r| !r.passed()).collect();

    if args.json {
        let summary = serde_json::json!({
            "total": results.len(),
            "passed": results.len() - failed.len(),
            "failed": failed.len(),
            "seed": seed,
            "results": results,
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize summary: {}", e),
        }
    } else {
        for result in &results {
            if let Some(summary) = &result.summary {
                info!(
                    "✓ p={} steps={} -> {} (final m={:.4})",
                    result.settings.probability,
                    result.settings.steps,
                    result.output_path.display(),
                    summary.final_magnetization
                );
            } else {
                error!(
                    "✗ p={} steps={} FAILED: {}",
                    result.settings.probability,
                    result.settings.steps,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }

        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        if failed.is_empty() {
            info!("✅ All {} run(s) completed", results.len());
        } else {
            error!("❌ {}/{} run(s) failed", failed.len(), results.len());
        }
    }

    // Exit with proper code for scripts
    if !failed.is_empty() {
        std::process::exit(1);
    }
}
