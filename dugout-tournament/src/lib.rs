//! Dugout Tournament - Fitness evaluation through game playing
//!
//! This crate provides evaluation infrastructure:
//! - Match play between two teams with alternating home field
//! - Fitness evaluation against a set of benchmark teams
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 2: evaluate_fitness, play_match (phases)
//! - Level 3: play_single_game, aggregate_fitness (steps)
//! - Level 4: configuration

mod config;
mod fitness;
mod match_play;

pub use config::EvalConfig;
pub use fitness::{evaluate_fitness, EvaluationSession, FitnessResult};
pub use match_play::{play_match, play_match_parallel, MatchGame, MatchResult};
