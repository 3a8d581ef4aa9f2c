//! Dugout Evolution - Genetic algorithm for roster building
//!
//! This crate provides the roster optimizer:
//! - Population management with elitism and immigration
//! - Selection (tournament)
//! - Mutation (point-respecting card swaps)
//! - Readable candidate names

pub mod candidate;
pub mod mutation;
pub mod naming;
pub mod optimizer;
pub mod selection;

pub use candidate::Candidate;
pub use mutation::{mutate_roster, RosterGroup};
pub use naming::{roster_name, roster_signature, signature_to_name};
pub use optimizer::{
    EvolutionResult, GenerationStats, GeneticOptimizer, NoProgress, Phase, ProgressObserver, StopHandle,
};
pub use selection::tournament_select;

use dugout_core::{PointRange, DEFAULT_MAX_ATTEMPTS};
use dugout_tournament::EvalConfig;

/// Invalid optimizer settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("population_size must be at least 1")]
    EmptyPopulation,

    #[error("elitism ({elitism}) must be smaller than population_size ({population})")]
    ElitismTooLarge { elitism: usize, population: usize },

    #[error("{name} must be within [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },

    #[error("elitism ({elitism}) plus immigrants ({immigrants}) exceed population_size ({population})")]
    TooManyImmigrants {
        elitism: usize,
        immigrants: usize,
        population: usize,
    },

    #[error("tournament_size must be at least 1")]
    EmptyTournament,

    #[error("num_benchmark_teams must be at least 1")]
    NoBenchmarks,

    #[error("games_per_benchmark must be at least 1")]
    NoGames,

    #[error("point range {0} is empty")]
    EmptyPointRange(PointRange),

    #[error("max_build_attempts must be at least 1")]
    NoBuildAttempts,
}

/// Errors that stop an evolution run
#[derive(Debug, thiserror::Error)]
pub enum EvolveError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no roster could be built for the initial population: {reason}")]
    EmptyPopulation { reason: String },

    #[error("no benchmark roster could be built: {reason}")]
    NoBenchmarks { reason: String },
}

/// Evolution configuration
#[derive(Clone, Debug)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    /// Probability that an offspring is mutated rather than cloned
    pub mutation_rate: f64,
    /// Swap attempts per mutation
    pub num_mutation_swaps: usize,
    /// Top candidates copied unchanged into each generation
    pub elitism: usize,
    /// Share of each generation replaced by fresh random rosters
    pub immigration_rate: f64,
    pub tournament_size: usize,
    pub num_benchmark_teams: usize,
    pub points: PointRange,
    pub max_build_attempts: usize,
    pub eval: EvalConfig,
    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            generations: 20,
            mutation_rate: 0.8,
            num_mutation_swaps: 1,
            elitism: 3,
            immigration_rate: 0.1,
            tournament_size: 3,
            num_benchmark_teams: 5,
            points: PointRange::default(),
            max_build_attempts: DEFAULT_MAX_ATTEMPTS,
            eval: EvalConfig::default(),
            seed: None,
        }
    }
}

impl EvolutionConfig {
    pub fn with_population(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_benchmarks(mut self, num_benchmark_teams: usize, games_per_benchmark: usize) -> Self {
        self.num_benchmark_teams = num_benchmark_teams;
        self.eval.games_per_benchmark = games_per_benchmark;
        self
    }

    pub fn with_points(mut self, points: PointRange) -> Self {
        self.points = points;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_eval(mut self, eval: EvalConfig) -> Self {
        self.eval = eval;
        self
    }

    /// Immigrants injected per generation
    pub fn immigrants(&self) -> usize {
        (self.population_size as f64 * self.immigration_rate).floor() as usize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.elitism >= self.population_size {
            return Err(ConfigError::ElitismTooLarge {
                elitism: self.elitism,
                population: self.population_size,
            });
        }
        for (name, value) in [
            ("mutation_rate", self.mutation_rate),
            ("immigration_rate", self.immigration_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }
        if self.elitism + self.immigrants() > self.population_size {
            return Err(ConfigError::TooManyImmigrants {
                elitism: self.elitism,
                immigrants: self.immigrants(),
                population: self.population_size,
            });
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::EmptyTournament);
        }
        if self.num_benchmark_teams == 0 {
            return Err(ConfigError::NoBenchmarks);
        }
        if self.eval.games_per_benchmark == 0 {
            return Err(ConfigError::NoGames);
        }
        if self.points.min > self.points.max {
            return Err(ConfigError::EmptyPointRange(self.points));
        }
        if self.max_build_attempts == 0 {
            return Err(ConfigError::NoBuildAttempts);
        }
        Ok(())
    }
}
