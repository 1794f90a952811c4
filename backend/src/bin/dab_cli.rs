//! Command-line front end for the DAB wrangling pipeline.
//!
//! Every command prints its result as JSON on stdout.
//!
//! ```bash
//! dab-cli clean-upload --antenna TxAntennaDAB.csv --params TxParamsDAB.csv
//! dab-cli upload-json formatted_data.json
//! dab-cli dump --output formatted_data.json
//! dab-cli visualise --kind "Summary Statistics" --multiplex C18A --multiplex C188
//! dab-cli visualise --kind correlation --multiplex C18A --column Site --column C18A
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dab_rust::api::{Multiplex, VisualisationKind, VisualisationRequest};
use dab_rust::db::{self, DocumentRepository, RepositoryFactory};
use dab_rust::services::{clean_and_upload, visualise_from_store};

/// Clean, store and analyse the UK DAB transmitter extracts.
#[derive(Parser, Debug)]
#[command(name = "dab-cli", author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a repository.toml
    ///
    /// If not specified, looks in the current directory, backend/ and the parent
    /// directory, then falls back to environment variables.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline over the two CSV extracts and replace the store
    CleanUpload {
        /// Antenna extract (file name must contain "antenna")
        #[arg(long, value_name = "FILE")]
        antenna: PathBuf,

        /// Transmitter params extract (file name must contain "params")
        #[arg(long, value_name = "FILE")]
        params: PathBuf,
    },

    /// Replace the store with a JSON array of already-formatted documents
    UploadJson {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Write every stored document to a pretty-printed JSON file
    Dump {
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Produce a chart model from the stored records
    Visualise {
        /// "Summary Statistics", "Other Bar Graphs" or "Correlation"
        #[arg(long)]
        kind: VisualisationKind,

        /// Multiplex code, repeatable (C18A, C18F, C188)
        #[arg(long = "multiplex", value_name = "CODE", required = true)]
        multiplexes: Vec<Multiplex>,

        /// Column to include, repeatable
        #[arg(long = "column", value_name = "NAME")]
        columns: Vec<String>,
    },
}

#[derive(Serialize)]
struct DumpOutcome {
    output: PathBuf,
    documents: usize,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn open_repository(config: Option<&PathBuf>) -> Result<Arc<dyn DocumentRepository>> {
    let repo = match config {
        Some(path) => RepositoryFactory::from_config_file(path)
            .await
            .with_context(|| format!("Failed to open repository from {}", path.display()))?,
        None => RepositoryFactory::from_default_config()
            .await
            .context("Failed to open document repository")?,
    };
    Ok(repo)
}

async fn run(command: Command, repo: &dyn DocumentRepository) -> Result<()> {
    match command {
        Command::CleanUpload { antenna, params } => {
            let outcome = clean_and_upload(repo, &antenna, &params).await?;
            print_json(&outcome)
        }
        Command::UploadJson { file } => {
            let documents = db::load_documents_file(&file).await?;
            let summary = db::upload_documents(repo, documents).await?;
            print_json(&summary)
        }
        Command::Dump { output } => {
            let documents = db::dump_documents(repo, &output).await?;
            print_json(&DumpOutcome { output, documents })
        }
        Command::Visualise {
            kind,
            multiplexes,
            columns,
        } => {
            let mut request = VisualisationRequest::new(kind, multiplexes);
            if !columns.is_empty() {
                request = request.with_columns(columns);
            }
            let outcome = visualise_from_store(repo, &request).await?;
            print_json(&outcome)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let repo = open_repository(cli.config.as_ref()).await?;
    info!("Repository opened");

    let result = run(cli.command, repo.as_ref()).await;
    repo.close().await?;
    result
}
