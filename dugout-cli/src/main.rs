//! Dugout CLI - Command-line interface
//!
//! Commands:
//! - build: Build and print a random legal roster
//! - play: Play one game or a series between two rosters
//! - evolve: Run the genetic roster optimizer

mod build_cmd;
mod common;
mod evolve;
mod match_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dugout")]
#[command(about = "Card baseball simulator and roster optimizer")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a random roster within the point range
    Build(build_cmd::BuildArgs),
    /// Play games between two rosters
    Play(match_cmd::PlayArgs),
    /// Evolve a roster against benchmark teams
    Evolve(evolve::EvolveArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => build_cmd::run(args, cli.seed),
        Commands::Play(args) => match_cmd::run(args, cli.seed),
        Commands::Evolve(args) => evolve::run(args, cli.seed),
    }
}
