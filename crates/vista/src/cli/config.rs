//! The `vista config` command for configuration management.

use clap::{Args, Subcommand};
use std::path::Path;
use vista_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration and where it came from
    Show,

    /// Show config file path and whether it exists
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            print!("{}", render_effective(&Config::default_path())?);
        }

        ConfigCommand::Path => {
            let path = Config::default_path();
            if path.exists() {
                println!("{}", path.display());
            } else {
                println!("{} (not created; run `vista config init`)", path.display());
            }
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();
            write_default(&path, force)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

/// The effective configuration as TOML, headed by a comment naming its source.
fn render_effective(path: &Path) -> anyhow::Result<String> {
    let (header, config) = if path.exists() {
        (
            format!("# Loaded from {}", path.display()),
            Config::load_from(path)?,
        )
    } else {
        (
            format!("# No file at {}; showing built-in defaults", path.display()),
            Config::default(),
        )
    };
    Ok(format!("{header}\n{}", config.to_toml()?))
}

fn write_default(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::default().to_toml()?)?;
    Ok(())
}
