//! Hydrant CLI — run the training pipeline or classify a single record.

use clap::Parser;
use hydrant_ml::{PipelineConfig, PipelineOrchestrator, PredictionRequest, PredictionService};
use std::path::PathBuf;

/// Hydrant: stage-gated water-potability prediction
#[derive(Parser, Debug)]
#[command(name = "hydrant", version, about, long_about = None)]
struct Cli {
    /// Configuration file path (YAML; defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the full pipeline: ingest, clean, validate, transform, train,
    /// evaluate, predict
    Run,

    /// Classify one record against the trained model
    Predict {
        /// JSON object of feature -> value, e.g. '{"ph": "7.2", "Hardness": "110"}'
        #[arg(long)]
        input: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    hydrant_core::logging::init(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Run => {
            std::fs::create_dir_all(&config.artifacts_root)?;
            let summary = PipelineOrchestrator::standard(config).run().await?;
            println!(
                "pipeline completed: {}",
                summary
                    .completed
                    .iter()
                    .map(|s| s.name())
                    .collect::<Vec<_>>()
                    .join(" -> ")
            );
        }
        Commands::Predict { input } => {
            let request = PredictionRequest::from_json(&input)?;
            let service = PredictionService::open(&config)?;
            match service.classify(&request) {
                Ok(label) => println!("{label}"),
                Err(rejection) => {
                    eprintln!("rejected: {rejection}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
