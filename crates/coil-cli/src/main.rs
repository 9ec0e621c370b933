//! Coil CLI - headless arena runs from the command line.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "coil")]
#[command(author, version, about = "Coil - chain locomotion and encapsulation arena", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default coil.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Run an arena simulation
    Run {
        /// Config file (default: coil.toml in this or a parent directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Simulated seconds (overrides the config)
        #[arg(short, long)]
        seconds: Option<f32>,

        /// Spawner seed (overrides the config)
        #[arg(long)]
        seed: Option<u64>,

        /// Drive leader and segments through the physics world
        #[arg(long)]
        physics: bool,

        /// Print the final snapshot as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config {
        /// Config file (default: coil.toml in this or a parent directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Run {
            config,
            seconds,
            seed,
            physics,
            json,
        } => commands::run::run(commands::run::RunOptions {
            config,
            seconds,
            seed,
            physics,
            json,
        }),
        Commands::Config { config } => commands::show::run(config),
    }
}
