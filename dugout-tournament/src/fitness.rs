//! Fitness evaluation for evolution
//!
//! Level 2 - Phase-level implementation

use dugout_core::Team;
use rayon::prelude::*;

use crate::config::EvalConfig;
use crate::match_play::{play_match, play_match_parallel, MatchResult};

/// Result of fitness evaluation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FitnessResult {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub runs_scored: u32,
    pub runs_allowed: u32,
    /// Games played against each benchmark
    pub games_per_benchmark: u32,
    /// Number of benchmark teams faced
    pub benchmarks_faced: u32,
    /// Wins over total games, in [0, 1]
    pub fitness: f64,
}

impl FitnessResult {
    /// Create empty result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Total games played
    pub fn total_games(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    /// Win rate (wins / total games); draws count as non-wins
    pub fn win_rate(&self) -> f64 {
        let total = self.total_games();
        if total == 0 {
            0.0
        } else {
            self.wins as f64 / total as f64
        }
    }

    pub fn run_differential(&self) -> i64 {
        self.runs_scored as i64 - self.runs_allowed as i64
    }
}

/// Evaluate a candidate against the benchmark teams (Level 2 phase)
///
/// Benchmark `b` is played with base seed `seed + b * games_per_benchmark`,
/// giving every game in the evaluation its own seed. The candidate's stats
/// are left untouched; see [`EvaluationSession`] for the stat-recording path.
pub fn evaluate_fitness(
    candidate: &Team,
    benchmarks: &[Team],
    config: &EvalConfig,
    seed: u64,
) -> FitnessResult {
    if benchmarks.is_empty() {
        return FitnessResult::empty();
    }

    let match_results = play_against_benchmarks(candidate, benchmarks, config, seed);
    aggregate_fitness(&match_results, benchmarks.len())
}

/// Evaluates candidates against a fixed benchmark set, folding each
/// evaluation's games into the candidate's season and career stats.
pub struct EvaluationSession<'a> {
    benchmarks: &'a [Team],
    config: &'a EvalConfig,
}

impl<'a> EvaluationSession<'a> {
    pub fn new(benchmarks: &'a [Team], config: &'a EvalConfig) -> Self {
        Self { benchmarks, config }
    }

    /// Reset the candidate's season, play every benchmark and record the
    /// candidate's box scores in game order.
    pub fn evaluate(&self, candidate: &mut Team, seed: u64) -> FitnessResult {
        candidate.stats.reset_season();
        if self.benchmarks.is_empty() {
            return FitnessResult::empty();
        }

        let match_results = play_against_benchmarks(candidate, self.benchmarks, self.config, seed);
        for game in match_results.iter().flat_map(|m| &m.games) {
            candidate.record_game(game.first_box());
        }

        let result = aggregate_fitness(&match_results, self.benchmarks.len());
        tracing::debug!(
            team = %candidate.name,
            wins = result.wins,
            games = result.total_games(),
            fitness = result.fitness,
            "evaluated"
        );
        result
    }
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

fn benchmark_seed(seed: u64, index: usize, config: &EvalConfig) -> u64 {
    seed.wrapping_add((index * config.games_per_benchmark) as u64)
}

/// Play the candidate against every benchmark, results in benchmark order
fn play_against_benchmarks(
    candidate: &Team,
    benchmarks: &[Team],
    config: &EvalConfig,
    seed: u64,
) -> Vec<MatchResult> {
    if config.parallel {
        benchmarks
            .par_iter()
            .enumerate()
            .map(|(i, benchmark)| play_vs_benchmark(candidate, benchmark, config, benchmark_seed(seed, i, config)))
            .collect()
    } else {
        benchmarks
            .iter()
            .enumerate()
            .map(|(i, benchmark)| play_vs_benchmark(candidate, benchmark, config, benchmark_seed(seed, i, config)))
            .collect()
    }
}

fn play_vs_benchmark(candidate: &Team, benchmark: &Team, config: &EvalConfig, seed: u64) -> MatchResult {
    if config.parallel {
        play_match_parallel(candidate, benchmark, config.games_per_benchmark, &config.game, seed)
    } else {
        play_match(candidate, benchmark, config.games_per_benchmark, &config.game, seed)
    }
}

/// Aggregate match results into fitness result
fn aggregate_fitness(results: &[MatchResult], benchmark_count: usize) -> FitnessResult {
    let mut fitness = FitnessResult::empty();
    let mut total_games = 0u32;

    for result in results {
        fitness.wins += result.wins;
        fitness.losses += result.losses;
        fitness.draws += result.draws;
        fitness.runs_scored += result.runs_for;
        fitness.runs_allowed += result.runs_against;
        total_games += result.games_played;
    }

    fitness.benchmarks_faced = benchmark_count as u32;
    fitness.games_per_benchmark = if benchmark_count > 0 {
        total_games / benchmark_count as u32
    } else {
        0
    };
    fitness.fitness = fitness.win_rate();
    fitness
}
