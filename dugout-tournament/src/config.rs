//! Configuration types for match play and evaluation
//!
//! Level 4 - Utilities and configuration

use dugout_core::GameConfig;

/// Configuration for fitness evaluation
#[derive(Clone, Debug)]
pub struct EvalConfig {
    /// Games against each benchmark team
    pub games_per_benchmark: usize,
    /// Whether to run games in parallel
    pub parallel: bool,
    /// Rules for every game played
    pub game: GameConfig,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            games_per_benchmark: 10,
            parallel: true,
            // Play-by-play is never read during evaluation
            game: GameConfig::default().with_log(false),
        }
    }
}

impl EvalConfig {
    /// Create config with specified games per benchmark
    pub fn new(games_per_benchmark: usize) -> Self {
        Self {
            games_per_benchmark,
            ..Default::default()
        }
    }

    /// Set game rules
    pub fn with_game(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    /// Run every game on the calling thread
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_config_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.games_per_benchmark, 10);
        assert!(config.parallel);
        assert!(!config.game.record_log);
        assert_eq!(config.game.innings, 9);
    }

    #[test]
    fn test_eval_config_builders() {
        let config = EvalConfig::new(4).sequential().with_game(GameConfig::default().with_max_innings(12));
        assert_eq!(config.games_per_benchmark, 4);
        assert!(!config.parallel);
        assert_eq!(config.game.max_innings, 12);
    }
}
