//! Match play - a series of games between two teams
//!
//! Level 2 - Phase-level implementation

use dugout_core::{play_game_with_starters, BoxScore, GameConfig, GameOutcome, Side, Team};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// One game of a match, seen from the first team
#[derive(Clone, Debug)]
pub struct MatchGame {
    /// True if the first team batted last
    pub first_at_home: bool,
    pub outcome: GameOutcome,
}

impl MatchGame {
    pub fn first_side(&self) -> Side {
        if self.first_at_home {
            Side::Home
        } else {
            Side::Away
        }
    }

    pub fn first_won(&self) -> bool {
        self.outcome.winner() == Some(self.first_side())
    }

    pub fn first_box(&self) -> &BoxScore {
        self.outcome.box_score(self.first_side())
    }

    pub fn second_box(&self) -> &BoxScore {
        self.outcome.box_score(self.first_side().opponent())
    }
}

/// Result of a match (multiple games), from the first team's perspective
#[derive(Clone, Debug, Default)]
pub struct MatchResult {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub runs_for: u32,
    pub runs_against: u32,
    pub games_played: u32,
    /// Individual games in play order
    pub games: Vec<MatchGame>,
}

impl MatchResult {
    /// Create empty result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Combine two results; games keep their order, `self` first
    pub fn combine(&self, other: &MatchResult) -> MatchResult {
        let mut games = self.games.clone();
        games.extend(other.games.iter().cloned());

        MatchResult {
            wins: self.wins + other.wins,
            losses: self.losses + other.losses,
            draws: self.draws + other.draws,
            runs_for: self.runs_for + other.runs_for,
            runs_against: self.runs_against + other.runs_against,
            games_played: self.games_played + other.games_played,
            games,
        }
    }

    /// Get win rate for the first team
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.wins as f64 / self.games_played as f64
        }
    }

    pub fn run_differential(&self) -> i64 {
        self.runs_for as i64 - self.runs_against as i64
    }
}

/// Play a match between two teams (Level 2 phase)
///
/// The home side alternates, first team at home in even-numbered games. Game
/// `i` starts rotation slot `i % 4` for both teams and is seeded with
/// `base_seed + i`, so results do not depend on execution order.
pub fn play_match(
    first: &Team,
    second: &Team,
    games: usize,
    config: &GameConfig,
    base_seed: u64,
) -> MatchResult {
    if games == 0 {
        return MatchResult::empty();
    }

    let plans = prepare_game_plans(games);
    let results = plans
        .iter()
        .map(|plan| play_single_game(first, second, config, plan, base_seed))
        .collect();
    aggregate_results(results)
}

/// Play a match with parallel execution (Level 2 phase)
pub fn play_match_parallel(
    first: &Team,
    second: &Team,
    games: usize,
    config: &GameConfig,
    base_seed: u64,
) -> MatchResult {
    if games == 0 {
        return MatchResult::empty();
    }

    let plans = prepare_game_plans(games);
    let results = plans
        .par_iter()
        .map(|plan| play_single_game(first, second, config, plan, base_seed))
        .collect();
    aggregate_results(results)
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Setup for a single game in a match
#[derive(Clone, Copy)]
struct GamePlan {
    first_at_home: bool,
    /// Game index (for seeding and rotation)
    game_index: usize,
}

fn prepare_game_plans(games: usize) -> Vec<GamePlan> {
    (0..games)
        .map(|i| GamePlan {
            first_at_home: i % 2 == 0,
            game_index: i,
        })
        .collect()
}

fn play_single_game(
    first: &Team,
    second: &Team,
    config: &GameConfig,
    plan: &GamePlan,
    base_seed: u64,
) -> MatchGame {
    let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(plan.game_index as u64));
    let starter = plan.game_index;

    let outcome = if plan.first_at_home {
        play_game_with_starters(second, first, starter, starter, config, &mut rng)
    } else {
        play_game_with_starters(first, second, starter, starter, config, &mut rng)
    };

    MatchGame {
        first_at_home: plan.first_at_home,
        outcome,
    }
}

fn aggregate_results(games: Vec<MatchGame>) -> MatchResult {
    let mut result = MatchResult::empty();

    for game in &games {
        let side = game.first_side();
        result.runs_for += game.outcome.score(side);
        result.runs_against += game.outcome.score(side.opponent());
        match game.outcome.winner() {
            Some(winner) if winner == side => result.wins += 1,
            Some(_) => result.losses += 1,
            None => result.draws += 1,
        }
    }

    result.games_played = games.len() as u32;
    result.games = games;
    result
}
