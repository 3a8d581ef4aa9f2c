//! Integration tests for the Dugout simulator
//!
//! Tests the full stack: card pool, roster construction, game simulation,
//! fitness evaluation and the genetic optimizer

use dugout_core::{
    advance, demo_pool, resolve, Bases, BullpenRole, CardPool, GameConfig, GameSimulator, OutKind, Outcome,
    PlayerCard, PointRange, Position, RosterBuilder, Team,
};
use dugout_evolve::{EvolutionConfig, GeneticOptimizer, Phase};
use dugout_tournament::{evaluate_fitness, play_match, EvalConfig, EvaluationSession};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn build_team(pool: &CardPool, name: &str, seed: u64) -> Team {
    RosterBuilder::new(pool, PointRange::default())
        .build(name, &mut ChaCha8Rng::seed_from_u64(seed))
        .unwrap()
}

fn small_evolution(seed: u64) -> EvolutionConfig {
    EvolutionConfig {
        population_size: 6,
        generations: 3,
        elitism: 1,
        immigration_rate: 0.2,
        ..Default::default()
    }
    .with_benchmarks(2, 2)
    .with_seed(seed)
}

// ============================================================================
// CARDS AND ROSTERS
// ============================================================================

#[test]
fn test_pool_from_json_with_chart_codes() {
    let json = r#"[
        {"type": "batter", "name": "Slugger", "year": "2003", "set": "Base", "pts": 420,
         "position": "1B", "positions": ["LFRF"], "onbase": 11,
         "so": 3, "gb": 2, "fb": 2, "bb": 4, "b1": 4, "b1p": 0, "b2": 2, "b3": 0, "hr": 3},
        {"type": "pitcher", "name": "Ace", "pts": 500, "position": "SP", "control": 5, "ip": 7,
         "pu": 2, "so": 6, "gb": 6, "fb": 3, "bb": 1, "b1": 2, "b2": 0, "hr": 0}
    ]"#;

    let pool = CardPool::from_json(json).unwrap();
    assert_eq!(pool.batters().len(), 1);
    assert_eq!(pool.pitchers().len(), 1);

    let slugger = &pool.batters()[0];
    assert!(slugger.can_play(Position::FirstBase));
    assert!(slugger.can_play(Position::LeftField));
    assert!(slugger.can_play(Position::RightField));
    assert!(slugger.can_play(Position::DesignatedHitter));
    assert!(!slugger.can_play(Position::Catcher));
}

#[test]
fn test_pool_rejects_bad_chart() {
    let json = r#"[
        {"type": "batter", "name": "Broken", "pts": 100, "position": "C", "onbase": 8,
         "so": 3, "gb": 2, "fb": 2, "bb": 4, "b1": 4, "b1p": 0, "b2": 2, "b3": 0, "hr": 4}
    ]"#;
    assert!(CardPool::from_json(json).is_err());
}

#[test]
fn test_built_roster_shape() {
    let pool = demo_pool(42);
    let team = build_team(&pool, "Shape", 1);

    assert_eq!(team.lineup().len(), 9);
    assert_eq!(team.bench().len(), 1);
    assert_eq!(team.rotation().len(), 4);
    assert_eq!(team.bullpen().len(), 6);
    assert!(PointRange::default().contains(team.total_points()));

    for position in Position::ALL {
        let count = team.lineup().iter().filter(|s| s.slot == position).count();
        assert_eq!(count, 1, "{} filled {} times", position, count);
    }
    assert!(team.bullpen().iter().filter(|a| a.role == BullpenRole::Closer).count() <= 1);
    assert!(team.validate().is_ok());
}

#[test]
fn test_roster_json_round_trip_keeps_stats() {
    let pool = demo_pool(42);
    let mut away = build_team(&pool, "Away", 2);
    let mut home = build_team(&pool, "Home", 3);
    GameSimulator::with_seed(GameConfig::default().with_log(false), 4).play_and_record(&mut away, &mut home);

    let path = std::env::temp_dir().join(format!("dugout-roster-{}.json", std::process::id()));
    away.save(&path).unwrap();
    let loaded = Team::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.to_parts(), away.to_parts());
    assert_eq!(loaded.stats, away.stats);
    assert!(!loaded.stats.career.is_empty());
}

#[test]
fn test_every_roll_resolves() {
    let pool = demo_pool(7);
    for batter in pool.batters().iter().take(10) {
        for pitcher in pool.pitchers().iter().take(10) {
            for pitch in 1..=20 {
                for swing in 1..=20 {
                    let outcome = resolve(batter, pitcher, pitch, swing);
                    assert_ne!(outcome, Outcome::Out(OutKind::Unrecorded));
                }
            }
        }
    }
}

// ============================================================================
// BASERUNNING SCENARIOS
// ============================================================================

#[test]
fn test_walk_with_first_and_second() {
    let bases = Bases::new(Some('a'), Some('b'), None);
    let result = advance(&bases, Outcome::Walk, 'z');
    assert_eq!(result.runs(), 0);
    assert_eq!(result.bases, Bases::new(Some('z'), Some('a'), Some('b')));
}

#[test]
fn test_grand_slam() {
    let bases = Bases::new(Some('a'), Some('b'), Some('c'));
    let result = advance(&bases, Outcome::HomeRun, 'z');
    assert_eq!(result.runs(), 4);
    assert!(result.bases.is_empty());
}

#[test]
fn test_single_advance_blocked_batter() {
    let bases = Bases::new(Some('a'), None, None);
    let result = advance(&bases, Outcome::SingleAdvance, 'z');
    assert_eq!(result.runs(), 0);
    assert_eq!(result.bases, Bases::new(Some('z'), Some('a'), None));
}

// ============================================================================
// GAMES AND FITNESS
// ============================================================================

#[test]
fn test_game_deterministic_and_consistent() {
    let pool = demo_pool(42);
    let away = build_team(&pool, "Away", 5);
    let home = build_team(&pool, "Home", 6);

    let a = GameSimulator::with_seed(GameConfig::default(), 99).play_game(&away, &home);
    let b = GameSimulator::with_seed(GameConfig::default(), 99).play_game(&away, &home);

    assert_eq!(a.away_score, b.away_score);
    assert_eq!(a.home_score, b.home_score);
    assert_eq!(a.log, b.log);
    assert_eq!(a.away_box.runs(), a.away_score);
    assert_eq!(a.home_box.runs(), a.home_score);
    assert!(a.innings_played >= 9);
}

#[test]
fn test_match_alternates_home() {
    let pool = demo_pool(42);
    let first = build_team(&pool, "First", 7);
    let second = build_team(&pool, "Second", 8);

    let result = play_match(&first, &second, 4, &GameConfig::default().with_log(false), 10);
    assert_eq!(result.games_played, 4);
    assert_eq!(result.wins + result.losses + result.draws, 4);
    let homes: Vec<bool> = result.games.iter().map(|g| g.first_at_home).collect();
    assert_eq!(homes, vec![true, false, true, false]);
}

#[test]
fn test_fitness_in_unit_range() {
    let pool = demo_pool(42);
    let candidate = build_team(&pool, "Candidate", 11);
    let benchmarks: Vec<Team> = (0..3).map(|i| build_team(&pool, "Bench", 20 + i)).collect();

    let result = evaluate_fitness(&candidate, &benchmarks, &EvalConfig::new(4), 1);
    assert_eq!(result.total_games(), 12);
    assert!((0.0..=1.0).contains(&result.fitness));
    assert_eq!(result.fitness, result.wins as f64 / 12.0);
}

#[test]
fn test_session_resets_season_between_evaluations() {
    let pool = demo_pool(42);
    let mut candidate = build_team(&pool, "Candidate", 12);
    let benchmarks = vec![build_team(&pool, "Bench", 30)];
    let config = EvalConfig::new(3);
    let session = EvaluationSession::new(&benchmarks, &config);

    session.evaluate(&mut candidate, 1);
    session.evaluate(&mut candidate, 2);

    let leadoff = candidate.lineup()[0].card.key();
    let season = candidate.stats.season_line(&leadoff).map(|l| l.batting.games);
    let career = candidate.stats.career_line(&leadoff).map(|l| l.batting.games);
    assert_eq!(season, Some(3));
    assert_eq!(career, Some(6));
}

// ============================================================================
// EVOLUTION
// ============================================================================

#[test]
fn test_evolution_end_to_end() {
    let pool = demo_pool(42);
    let result = GeneticOptimizer::new(&pool, small_evolution(1)).unwrap().run().unwrap();

    assert_eq!(result.phase, Phase::Done);
    assert_eq!(result.history.len(), 4);
    for pair in result.history.windows(2) {
        assert!(pair[1].best_ever >= pair[0].best_ever);
    }

    let best = result.best_team().unwrap();
    assert!(best.validate().is_ok());
    assert!(PointRange::default().contains(best.total_points()));
    assert!(result.best_fitness().unwrap() >= result.history[0].best);
}

#[test]
fn test_evolution_reproducible() {
    let pool = demo_pool(42);
    let a = GeneticOptimizer::new(&pool, small_evolution(3)).unwrap().run().unwrap();
    let b = GeneticOptimizer::new(&pool, small_evolution(3)).unwrap().run().unwrap();
    assert_eq!(a.history, b.history);
}

#[test]
fn test_stopped_before_evaluation_has_no_result() {
    let pool = demo_pool(42);
    let optimizer = GeneticOptimizer::new(&pool, small_evolution(4)).unwrap();
    optimizer.stop_handle().request_stop();
    let result = optimizer.run().unwrap();
    assert_eq!(result.phase, Phase::Stopped);
    assert!(result.best.is_none());
}

#[test]
fn test_unknown_card_type_rejected() {
    let json = r#"{"type": "manager", "name": "Skip"}"#;
    assert!(serde_json::from_str::<PlayerCard>(json).is_err());
}
