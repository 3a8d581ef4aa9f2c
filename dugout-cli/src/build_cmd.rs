//! Build command - construct a random legal roster
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_roster(), report()

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use dugout_core::{CardPool, PointRange, RosterBuilder, Team, DEFAULT_MAX_ATTEMPTS};

use crate::common::{create_rng, save_team, PoolArgs};

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub pool: PoolArgs,

    /// Team name
    #[arg(long, default_value = "Random Nine")]
    pub name: String,

    /// Construction attempts before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub attempts: usize,

    /// Write the roster as JSON
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the roster as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Also write the card pool in use (e.g. the generated demo pool) as a card file
    #[arg(long, value_name = "FILE")]
    pub save_pool: Option<PathBuf>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: BuildArgs, seed: Option<u64>) -> Result<()> {
    let pool = args.pool.load()?;
    if let Some(path) = &args.save_pool {
        export_pool(&pool, path)?;
    }
    let team = build_roster(&pool, args.pool.points(), &args, seed)?;

    if let Some(path) = &args.output {
        save_team(&team, path)?;
    }
    report(&team, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_roster(pool: &CardPool, points: PointRange, args: &BuildArgs, seed: Option<u64>) -> Result<Team> {
    let mut rng = create_rng(seed);
    let builder = RosterBuilder::new(pool, points).with_max_attempts(args.attempts);
    let team = builder
        .build(&args.name, &mut rng)
        .with_context(|| format!("No roster within {} points", points))?;
    tracing::info!("Built {} ({} points)", team.name, team.total_points());
    Ok(team)
}

fn export_pool(pool: &CardPool, path: &Path) -> Result<()> {
    pool.save(path)
        .with_context(|| format!("Failed to write card pool to {}", path.display()))?;
    tracing::info!("Wrote {} cards to {}", pool.len(), path.display());
    Ok(())
}

fn report(team: &Team, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(team)?);
    } else {
        print!("{}", team);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dugout_core::demo_pool;

    fn make_test_args() -> BuildArgs {
        BuildArgs {
            pool: PoolArgs {
                cards: None,
                demo_seed: 42,
                min_points: 4500,
                max_points: 5000,
            },
            name: "Test Nine".to_string(),
            attempts: DEFAULT_MAX_ATTEMPTS,
            output: None,
            json: false,
            save_pool: None,
        }
    }

    #[test]
    fn test_build_roster_in_range() {
        let args = make_test_args();
        let pool = demo_pool(42);
        let team = build_roster(&pool, args.pool.points(), &args, Some(3)).unwrap();
        assert_eq!(team.name, "Test Nine");
        assert!(args.pool.points().contains(team.total_points()));
    }

    #[test]
    fn test_exported_pool_loads_back() {
        let pool = demo_pool(42);
        let path = std::env::temp_dir().join(format!("dugout-pool-{}.json", std::process::id()));
        export_pool(&pool, &path).unwrap();
        let loaded = CardPool::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.len(), pool.len());
        assert_eq!(loaded.cards(), pool.cards());
    }

    #[test]
    fn test_impossible_range_reports_context() {
        let args = make_test_args();
        let pool = demo_pool(42);
        let err = build_roster(&pool, PointRange::new(0, 10), &args, Some(3)).unwrap_err();
        assert!(err.to_string().contains("No roster within 0-10 points"));
    }
}
