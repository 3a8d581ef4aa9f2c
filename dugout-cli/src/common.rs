//! Arguments and helpers shared by every command
//!
//! Level 4 - Utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use dugout_core::{demo_pool, CardPool, PointRange, Team};

/// Where the cards come from
#[derive(Args, Clone, Debug)]
pub struct PoolArgs {
    /// Card pool JSON file (array of tagged batter/pitcher cards)
    #[arg(long, value_name = "FILE")]
    pub cards: Option<PathBuf>,

    /// Seed for the generated demo pool, used when --cards is absent
    #[arg(long, default_value = "42")]
    pub demo_seed: u64,

    /// Minimum roster points
    #[arg(long, default_value = "4500")]
    pub min_points: u32,

    /// Maximum roster points
    #[arg(long, default_value = "5000")]
    pub max_points: u32,
}

impl PoolArgs {
    pub fn points(&self) -> PointRange {
        PointRange::new(self.min_points, self.max_points)
    }

    pub fn load(&self) -> Result<CardPool> {
        let pool = match &self.cards {
            Some(path) => {
                CardPool::load(path).with_context(|| format!("Failed to load card pool: {}", path.display()))?
            }
            None => demo_pool(self.demo_seed),
        };
        tracing::info!(
            "Card pool: {} batters, {} pitchers",
            pool.batters().len(),
            pool.pitchers().len()
        );
        Ok(pool)
    }
}

/// Create RNG from seed or random
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

pub fn load_team(path: &Path) -> Result<Team> {
    Team::load(path).with_context(|| format!("Failed to load roster: {}", path.display()))
}

pub fn save_team(team: &Team, path: &Path) -> Result<()> {
    team.save(path)
        .with_context(|| format!("Failed to save roster: {}", path.display()))?;
    tracing::info!("Saved roster {} to {}", team.name, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(Some(42));
        let mut rng2 = create_rng(Some(42));
        assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
    }

    #[test]
    fn test_demo_pool_when_no_file() {
        let args = PoolArgs {
            cards: None,
            demo_seed: 7,
            min_points: 1,
            max_points: 2,
        };
        assert!(!args.load().unwrap().is_empty());
        assert_eq!(args.points(), PointRange::new(1, 2));
    }

    #[test]
    fn test_missing_pool_file_errors() {
        let args = PoolArgs {
            cards: Some(PathBuf::from("/nonexistent/cards.json")),
            demo_seed: 7,
            min_points: 0,
            max_points: 1,
        };
        let err = args.load().unwrap_err();
        assert!(err.to_string().contains("Failed to load card pool"));
    }
}
