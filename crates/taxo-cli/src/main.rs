//! Taxo CLI - Command-line interface
//!
//! Usage:
//!   taxo --terms <file> --features <file> build [--json]
//!   taxo --terms <file> --features <file> show <term>
//!   taxo --terms <file> --features <file> tree [term]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use taxo_core::{AppConfig, LoggingConfig, TermRegistry};
use taxo_extractor::fragment::{render_forest, render_hierarchy, DEFAULT_RELATED_LIMIT};
use taxo_extractor::{BuildReport, TaxonomyBuilder, TermFragment};

#[derive(Parser)]
#[command(name = "taxo")]
#[command(about = "Term taxonomy construction engine")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    inputs: Inputs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Inputs {
    /// Term table (term, score, count)
    #[arg(long, global = true)]
    terms: Option<PathBuf>,

    /// Feature-vector table
    #[arg(long, global = true)]
    features: Option<PathBuf>,

    /// Optional role table (term, role)
    #[arg(long, global = true)]
    roles: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the taxonomy and print a summary
    Build {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the neighbourhood of one term
    Show {
        /// Term name
        term: String,

        /// Maximum number of related terms
        #[arg(long, default_value_t = DEFAULT_RELATED_LIMIT)]
        limit: usize,

        /// Print the fragment as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the hierarchy below a term, or every hierarchy
    Tree {
        /// Root term
        term: Option<String>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path)
            .and_then(AppConfig::with_env_override)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => AppConfig::from_env().context("reading configuration from environment"),
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn build(inputs: &Inputs, config: AppConfig) -> Result<(TermRegistry, BuildReport)> {
    let terms = inputs.terms.as_ref().context("--terms is required")?;
    let features = inputs.features.as_ref().context("--features is required")?;
    debug!("Building from {} and {}", terms.display(), features.display());

    TaxonomyBuilder::try_new(config)?
        .build_from_files(terms, features, inputs.roles.as_deref())
        .context("building taxonomy")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.inputs.config.as_ref())?;
    init_tracing(&config.logging);

    let (registry, report) = build(&cli.inputs, config)?;

    match cli.command {
        Commands::Build { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }
        }
        Commands::Show { term, limit, json } => {
            let id = registry
                .id_of(&term)
                .with_context(|| format!("unknown term '{term}'"))?;
            let fragment = TermFragment::new(&registry, id, limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&fragment)?);
            } else {
                print!("{fragment}");
            }
        }
        Commands::Tree { term } => match term {
            Some(term) => {
                let id = registry
                    .id_of(&term)
                    .with_context(|| format!("unknown term '{term}'"))?;
                print!("{}", render_hierarchy(&registry, id));
            }
            None => print!("{}", render_forest(&registry)),
        },
    }

    Ok(())
}
