//! Playbill CLI - HTML shell and runtime configuration builder.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "playbill")]
#[command(about = "Assembles the HTML shell and runtime configuration for a JS game bundle")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the playbill.toml build document
    #[arg(short, long, default_value = "playbill.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a playbill project in the current directory
    Init {
        /// Skip interactive prompts, overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Build the HTML shell, stage assets, and emit the bundler plan
    Build {
        /// Output directory (defaults to the document's build.output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Build with the release profile
        #[arg(long)]
        release: bool,
    },

    /// Print the projected runtime configuration per target
    Inspect {
        /// Apply the release profile first
        #[arg(long)]
        release: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(yes).await?;
        }
        Commands::Build { output, release } => {
            commands::build::run(cli.config, output, release).await?;
        }
        Commands::Inspect { release } => {
            commands::inspect::run(cli.config, release).await?;
        }
    }

    Ok(())
}
