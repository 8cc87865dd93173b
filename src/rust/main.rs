use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use finecast::{
    ArtifactBundle, ArtifactStore, BundleSource, FinePredictor, PipelineConfig, PipelineError, RawRecord,
};
use log::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict the fine category of one record read from a JSON file
    Predict {
        /// Bundle directory containing bundle.json
        #[arg(short, long, env = "FINECAST_BUNDLE")]
        bundle: PathBuf,
        /// JSON object mapping field names to raw values
        #[arg(short, long)]
        record: PathBuf,
        /// Year used for vehicle age (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Print the bundle's held-out performance metrics
    Metrics {
        #[arg(short, long, env = "FINECAST_BUNDLE")]
        bundle: PathBuf,
    },
    /// Check a stored bundle against its checksums
    Verify {
        #[arg(short, long)]
        name: String,
    },
    /// Download a published bundle into the local store
    Fetch {
        #[arg(short, long)]
        name: String,
        /// Directory URL holding bundle.json
        #[arg(short, long)]
        url: String,
        /// Expected SHA-256 of bundle.json
        #[arg(long)]
        sha256: Option<String>,
        /// Force a fresh download even if a verified copy exists
        #[arg(short, long)]
        fresh: bool,
    },
}

fn load_bundle(dir: &Path) -> Result<Arc<ArtifactBundle>> {
    let start = Instant::now();
    let bundle = ArtifactBundle::from_dir(dir)
        .with_context(|| format!("Failed to load bundle from {}", dir.display()))?;
    info!("Bundle loaded in {:.2?}", start.elapsed());
    Ok(Arc::new(bundle))
}

fn predict(bundle: &Path, record: &Path, year: Option<i32>) -> Result<()> {
    let mut config = PipelineConfig::default();
    if let Some(year) = year {
        config = config.with_current_year(year);
    }
    let predictor = FinePredictor::new(load_bundle(bundle)?).with_config(config);

    let text = fs::read_to_string(record).with_context(|| format!("Failed to read {}", record.display()))?;
    let record = RawRecord::from_json_str(&text).context("Record must be a JSON object")?;

    let start = Instant::now();
    match predictor.predict(&record) {
        Ok(result) => {
            info!("Prediction took {:.2?}", start.elapsed());
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(PipelineError::ValidationError(report)) => {
            eprintln!("Record rejected:");
            for field in &report.missing {
                eprintln!("  missing: {}", field);
            }
            for field in &report.invalid {
                eprintln!("  invalid: {} ({})", field.field, field.reason);
            }
            Err(PipelineError::ValidationError(report).into())
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Predict { bundle, record, year } => predict(&bundle, &record, year)?,
        Command::Metrics { bundle } => {
            let bundle = load_bundle(&bundle)?;
            println!("{}", serde_json::to_string_pretty(&bundle.performance().summary())?);
        }
        Command::Verify { name } => {
            let store = ArtifactStore::new_default()?;
            if store.verify_bundle(&name)? {
                println!("Bundle '{}' verified at {}", name, store.bundle_dir(&name)?.display());
            } else {
                anyhow::bail!("Bundle '{}' is missing or failed verification", name);
            }
        }
        Command::Fetch { name, url, sha256, fresh } => {
            let store = ArtifactStore::new_default()?;
            let source = BundleSource {
                name,
                base_url: url,
                manifest_hash: sha256,
            };
            if fresh {
                info!("Fresh download requested - removing any stored copy...");
                store.remove_bundle(&source.name)?;
            }
            store.ensure_bundle(&source).await?;
            println!("Bundle '{}' ready at {}", source.name, store.bundle_dir(&source.name)?.display());
        }
    }

    Ok(())
}
