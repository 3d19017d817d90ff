//! Vista CLI - command-line front end for the Vista gallery core.
//!
//! Fetches photo catalogs, applies category filters and samples average
//! image colors using the same components a graphical host would embed.
//!
//! # Usage
//!
//! ```bash
//! # Print the catalog from the configured source
//! vista catalog
//!
//! # Only travel photos, one JSON object per line
//! vista catalog --category travel --format jsonl
//!
//! # Average color of local images
//! vista color thumb1.jpg thumb2.png
//!
//! # View configuration
//! vista config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Vista - lazy-loading photo gallery core.
#[derive(Parser, Debug)]
#[command(name = "vista")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the photo catalog and print the photos of a category
    Catalog(cli::catalog::CatalogArgs),

    /// Print the average color of images
    Color(cli::color::ColorArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match vista_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `vista config path`."
            );
            vista_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Vista v{}", vista_core::VERSION);

    match cli.command {
        Commands::Catalog(args) => cli::catalog::execute(args, config).await,
        Commands::Color(args) => cli::color::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
