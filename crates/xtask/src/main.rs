//! Development tasks for the arena workspace
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod content;

use anyhow::Result;
use clap::Parser;
use commands::{Simulate, Validate};
use tracing_subscriber::EnvFilter;

/// Development tasks for the arena workspace
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for the arena rules engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Load the catalogue and check it against the handler registry
    Validate(Validate),

    /// Run a scripted headless duel and print a summary
    Simulate(Simulate),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for ARENA_DATA_DIR and RUST_LOG)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate(cmd) => cmd.execute(),
        Command::Simulate(cmd) => cmd.execute(),
    }
}
