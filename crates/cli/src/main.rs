//! Farmgate CLI - Database index and seeding tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the marketplace's indexes
//! fg-cli indexes
//!
//! # Seed the database from a fixture file
//! fg-cli seed --file fixtures/demo.yaml
//!
//! # Wipe the collections first, then seed
//! fg-cli seed --file fixtures/demo.yaml --drop
//! ```
//!
//! # Commands
//!
//! - `indexes` - Create the indexes the query paths rely on
//! - `seed` - Load products, users and reviews from a YAML fixture
//!
//! # Environment Variables
//!
//! - `FARMGATE_DATABASE_URL` - Connection string (`DATABASE_URL` as fallback)
//! - `FARMGATE_DATABASE_NAME` - Database name, defaults to `farmgate`

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fg-cli")]
#[command(author, version, about = "Farmgate CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database indexes the server's query paths rely on
    Indexes,
    /// Seed the database from a YAML fixture file
    Seed {
        /// Path to the YAML fixture file
        #[arg(short, long)]
        file: String,

        /// Drop the marketplace collections before seeding
        #[arg(long, default_value_t = false)]
        drop: bool,
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
        Commands::Indexes => commands::indexes::create_all().await?,
        Commands::Seed { file, drop } => commands::seed::from_file(&file, drop).await?,
    }
    Ok(())
}
