use std::fs;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use company_cleaner::app::CleanCompaniesUseCase;
use company_cleaner::config::Config;
use company_cleaner::infra::{CsvRecordSource, CsvTableSink};
use company_cleaner::logging;
use company_cleaner::observability;
use company_cleaner::pipeline::processing::address::AddressDecomposer;

#[derive(Parser)]
#[command(name = "company_cleaner")]
#[command(about = "Cleans, decomposes and merges multi-source company records")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (falls back to $COMPANY_CLEANER_CONFIG, then ./config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full cleaning batch
    Run {
        /// Input CSV (overrides [io].input)
        #[arg(long)]
        input: Option<String>,
        /// Intermediate CSV, one row per input record (overrides [io].intermediate)
        #[arg(long)]
        intermediate: Option<String>,
        /// Final merged CSV (overrides [io].output)
        #[arg(long)]
        output: Option<String>,
        /// Write the Prometheus text exposition here when the run finishes
        #[arg(long)]
        metrics_out: Option<String>,
    },
    /// Decompose a single address and print its components as JSON
    Decompose {
        address: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config =
        Config::resolve(cli.config.as_deref()).context("Failed to load configuration")?;
    let _guard = logging::init_logging(&config.logging.dir);
    let reference = Arc::new(config.reference.load_reference()?);

    match cli.command {
        Commands::Run {
            input,
            intermediate,
            output,
            metrics_out,
        } => {
            if let Some(input) = input {
                config.io.input = input;
            }
            if let Some(intermediate) = intermediate {
                config.io.intermediate = intermediate;
            }
            if let Some(output) = output {
                config.io.output = output;
            }
            observability::init()?;

            let delimiter = config.io.delimiter as u8;
            let use_case = CleanCompaniesUseCase::new(
                &config,
                reference,
                Box::new(CsvRecordSource::new(&config.io.input, delimiter)),
                Box::new(CsvTableSink::new(&config.io.intermediate, delimiter)),
                Box::new(CsvTableSink::new(&config.io.output, delimiter)),
            );

            println!("🧹 Cleaning companies from {}...", config.io.input);
            let summary = match use_case.run().await {
                Ok(summary) => summary,
                Err(e) => {
                    error!("Cleaning run failed: {:#}", e);
                    println!("❌ Cleaning run failed: {:#}", e);
                    return Err(e);
                }
            };

            println!("\n📊 Run {}:", summary.run_id);
            println!("   Rows read: {}", summary.rows_read);
            println!("   Dropped (no name): {}", summary.rows_dropped);
            println!("   Records normalized: {}", summary.records_normalized);
            println!("   Canonical records: {}", summary.canonical_records);
            println!("   Groups with conflicts: {}", summary.conflicting_groups);
            println!("   Elapsed: {:.2?}", summary.elapsed);
            println!("   Intermediate: {}", config.io.intermediate);
            println!("   Output: {}", config.io.output);

            if let Some(path) = metrics_out {
                let text = observability::render().unwrap_or_default();
                fs::write(&path, text)
                    .with_context(|| format!("Failed to write metrics to '{}'", path))?;
                info!(path = %path, "Metrics written");
            }
        }
        Commands::Decompose { address } => {
            let decomposer = AddressDecomposer::new(reference);
            let components = decomposer.decompose(&address);
            println!("{}", serde_json::to_string_pretty(&components)?);
        }
    }
    Ok(())
}
