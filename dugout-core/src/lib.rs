//! Dugout Core - card baseball simulation
//!
//! This crate provides the simulation engine:
//! - Player cards, position eligibility and the card pool
//! - Plate appearance resolution and baserunning
//! - Teams, random roster construction and stats
//! - Full-game simulation with pitcher fatigue and extra innings

pub mod card;
pub mod pool;
pub mod matchup;
pub mod baserunning;
pub mod stats;
pub mod team;
pub mod roster;
pub mod game;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenient access
pub use card::{
    eligible_positions, BatterCard, CardError, CardKey, PitcherCard, PitcherRole, PlayerCard, Position,
    PositionSet, MAX_CARD_POINTS, MAX_PITCHER_INNINGS,
};
pub use pool::{demo_pool, CardPool};
pub use matchup::{resolve, resolve_with_rule, OutKind, Outcome, PitchRule, Resolution};
pub use baserunning::{advance, Advance, Bases};
pub use stats::{BattingLine, BoxScore, PitchingLine, StatLedger, StatLine};
pub use team::{BullpenArm, BullpenRole, LineupSpot, PointRange, RosterError, RosterParts, Team};
pub use roster::{RosterBuilder, DEFAULT_MAX_ATTEMPTS};
pub use game::{play_game, play_game_with_starters, GameConfig, GameOutcome, GameSimulator, Linescore, Side};
