//! Launchkit CLI - migrations, model checks and offline reply validation.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! lk-cli migrate
//!
//! # Check the model endpoint
//! lk-cli ping
//!
//! # Run a saved model reply through the ingestion pipeline
//! lk-cli validate --kind product reply.txt
//! lk-cli validate --kind bundle --truncated reply.txt
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `ping` - Send the ping prompt to the configured model
//! - `validate` - Extract, decode and normalise a saved reply

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::validate::RecordKind;

#[derive(Parser)]
#[command(name = "lk-cli")]
#[command(author, version, about = "Launchkit CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations against `DATABASE_URL`
    Migrate,
    /// Send the ping prompt to the configured model
    Ping,
    /// Run a saved model reply through the ingestion pipeline
    Validate {
        /// Record type the reply should contain
        #[arg(short, long, value_enum)]
        kind: RecordKind,

        /// Treat the reply as cut off by the output length limit
        #[arg(long)]
        truncated: bool,

        /// File holding the raw reply text
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Ping => commands::ping::run().await?,
        Commands::Validate {
            kind,
            truncated,
            file,
        } => commands::validate::run(kind, truncated, &file)?,
    }
    Ok(())
}
