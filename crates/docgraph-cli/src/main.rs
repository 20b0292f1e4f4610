//! DocGraph CLI - Command-line interface
//!
//! Usage:
//!   docgraph extract <input.json> [--config <file>] [--output <file>] [--pretty]
//!   docgraph sections <input.json>
//!   docgraph config [--config <file>]

mod source;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use docgraph_core::{AppConfig, DocumentSource, LoggingConfig};
use docgraph_extractor::{DocumentPipeline, SectionClassifier};

use crate::source::JsonDocumentSource;

#[derive(Parser)]
#[command(name = "docgraph")]
#[command(about = "Document to knowledge graph extraction")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract sections, concepts and the concept graph from a layout document
    Extract {
        /// Layout document (JSON)
        input: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON result
        #[arg(long)]
        pretty: bool,
    },
    /// List the detected sections of a layout document
    Sections {
        /// Layout document (JSON)
        input: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    }
    .with_env_override()
    .context("Failed to load configuration")?;

    init_tracing(&config.logging);

    match cli.command {
        Commands::Extract {
            input,
            output,
            pretty,
        } => {
            let pipeline = DocumentPipeline::new(config.extraction)?;
            let result = pipeline.extract_from_source(&JsonDocumentSource::new(&input));

            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Result written to {}", path.display());
                }
                None => println!("{}", json),
            }

            if !result.extraction_metadata.success {
                tracing::warn!(
                    "Extraction failed: {}",
                    result.extraction_metadata.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        Commands::Sections { input } => {
            let document = JsonDocumentSource::new(&input)
                .load()
                .with_context(|| format!("Failed to load {}", input.display()))?;
            let classifier = SectionClassifier::new(config.extraction.sections)?;

            for page in &document.pages {
                match classifier.classify_page(page) {
                    Ok(sections) => {
                        for section in sections {
                            println!(
                                "p{:<4} L{} {:<60} {} words",
                                section.page, section.level, section.title, section.word_count
                            );
                        }
                    }
                    Err(e) => tracing::warn!("Skipping page {}: {}", page.number, e),
                }
            }
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Install the global subscriber; `RUST_LOG` takes precedence over the config
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}
