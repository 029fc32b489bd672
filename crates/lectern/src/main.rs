//! Lectern CLI - in-place editable site server.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "lectern")]
#[command(about = "In-place editable marketing and documentation site")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to site.toml config file
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a site in the current directory
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Serve the site
    Serve {
        /// Port to listen on (defaults to config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to config)
        #[arg(long)]
        host: Option<String>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Check content for broken references and malformed documents
    Check,
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
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Serve {
            port,
            host,
            no_open,
        } => {
            commands::serve::run(&cli.config, port, host, !no_open).await?;
        }
        Commands::Check => {
            commands::check::run(&cli.config).await?;
        }
    }

    Ok(())
}
