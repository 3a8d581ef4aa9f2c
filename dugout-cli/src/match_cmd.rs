//! Play command - games between two rosters
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_teams(), play_single(), play_series()
//! - Level 3: box score and series reporting
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use dugout_core::{BoxScore, GameConfig, GameOutcome, GameSimulator, PitchRule, RosterBuilder, Team};
use dugout_tournament::{play_match_parallel, MatchResult};

use crate::common::{create_rng, load_team, PoolArgs};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub pool: PoolArgs,

    /// Away roster JSON file (random roster when absent)
    #[arg(long, value_name = "FILE")]
    pub away: Option<PathBuf>,

    /// Home roster JSON file (random roster when absent)
    #[arg(long, value_name = "FILE")]
    pub home: Option<PathBuf>,

    /// Number of games (home field alternates in a series)
    #[arg(long, default_value = "1")]
    pub games: usize,

    /// Regulation innings
    #[arg(long, default_value = "9")]
    pub innings: u32,

    /// Add pitcher control to the pitch roll
    #[arg(long)]
    pub control: bool,

    /// Print the play-by-play of a single game
    #[arg(long)]
    pub log: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Load or build both rosters
/// 2. Play one game or a series
/// 3. Report results
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let mut rng = create_rng(seed);
    let (away, home) = load_teams(&args, &mut rng)?;
    let config = game_config(&args);

    tracing::info!("Starting: {} at {} ({} games)", away.name, home.name, args.games);

    if args.games <= 1 {
        let outcome = play_single(&away, &home, config, &mut rng);
        report_game(&away, &home, &outcome, &args)
    } else {
        let result = play_series(&away, &home, &args, config, &mut rng);
        report_series(&away, &home, &result, args.json)
    }
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_teams(args: &PlayArgs, rng: &mut ChaCha8Rng) -> Result<(Team, Team)> {
    let pool = match (&args.away, &args.home) {
        (Some(_), Some(_)) => None,
        _ => Some(args.pool.load()?),
    };
    let builder = pool.as_ref().map(|p| RosterBuilder::new(p, args.pool.points()));

    let mut obtain = |path: &Option<PathBuf>, name: &str| -> Result<Team> {
        match (path, &builder) {
            (Some(path), _) => load_team(path),
            (None, Some(builder)) => builder
                .build(name, &mut *rng)
                .with_context(|| format!("Failed to build {} roster", name)),
            (None, None) => anyhow::bail!("no roster source for {}", name),
        }
    };

    let away = obtain(&args.away, "Visitors")?;
    let home = obtain(&args.home, "Home Nine")?;
    Ok((away, home))
}

fn game_config(args: &PlayArgs) -> GameConfig {
    let rule = if args.control {
        PitchRule::RollPlusControl
    } else {
        PitchRule::RollOnly
    };
    GameConfig::default()
        .with_innings(args.innings)
        .with_pitch_rule(rule)
        .with_log(args.log)
}

fn play_single(away: &Team, home: &Team, config: GameConfig, rng: &mut ChaCha8Rng) -> GameOutcome {
    let mut sim = GameSimulator::with_seed(config, rng.gen());
    sim.play_game(away, home)
}

/// Series with the home roster as the first team; home field alternates
fn play_series(away: &Team, home: &Team, args: &PlayArgs, config: GameConfig, rng: &mut ChaCha8Rng) -> MatchResult {
    // Game 0 puts the first team at home, so pass the home roster first
    play_match_parallel(home, away, args.games, &config.with_log(false), rng.gen())
}

// ============================================================================
// LEVEL 3 - REPORTING
// ============================================================================

fn report_game(away: &Team, home: &Team, outcome: &GameOutcome, args: &PlayArgs) -> Result<()> {
    if args.json {
        #[derive(serde::Serialize)]
        struct JsonGame<'a> {
            away: &'a str,
            home: &'a str,
            away_score: u32,
            home_score: u32,
            innings: u32,
            walk_off: bool,
            linescore: &'a dugout_core::Linescore,
            log: &'a [String],
        }
        let json = JsonGame {
            away: &away.name,
            home: &home.name,
            away_score: outcome.away_score,
            home_score: outcome.home_score,
            innings: outcome.innings_played,
            walk_off: outcome.walk_off,
            linescore: &outcome.linescore,
            log: &outcome.log,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    if args.log {
        for line in &outcome.log {
            println!("{}", line);
        }
        println!();
    }

    println!("=== Final ===");
    println!("{}", outcome.linescore);
    println!(
        "{} {}, {} {}{}",
        away.name,
        outcome.away_score,
        home.name,
        outcome.home_score,
        if outcome.walk_off { " (walk-off)" } else { "" }
    );
    println!();
    print_box(away, &outcome.away_box);
    println!();
    print_box(home, &outcome.home_box);
    Ok(())
}

fn report_series(away: &Team, home: &Team, result: &MatchResult, json: bool) -> Result<()> {
    // `result` is from the home roster's point of view
    if json {
        #[derive(serde::Serialize)]
        struct JsonSeries<'a> {
            first: &'a str,
            second: &'a str,
            first_wins: u32,
            second_wins: u32,
            draws: u32,
            first_runs: u32,
            second_runs: u32,
        }
        let json = JsonSeries {
            first: &home.name,
            second: &away.name,
            first_wins: result.wins,
            second_wins: result.losses,
            draws: result.draws,
            first_runs: result.runs_for,
            second_runs: result.runs_against,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!("\n=== Series Results ===");
    println!("Total games: {}", result.games_played);
    println!("{:<20} {:>3} wins  {:>4} runs", home.name, result.wins, result.runs_for);
    println!("{:<20} {:>3} wins  {:>4} runs", away.name, result.losses, result.runs_against);
    if result.draws > 0 {
        println!("Draws: {}", result.draws);
    }

    println!("\nGame details:");
    for (i, game) in result.games.iter().enumerate() {
        let (first_runs, second_runs) = if game.first_at_home {
            (game.outcome.home_score, game.outcome.away_score)
        } else {
            (game.outcome.away_score, game.outcome.home_score)
        };
        println!(
            "  Game {:>3}: {} {} ({} H) - {} ({} H) {}{}",
            i + 1,
            home.name,
            first_runs,
            game.first_box().hits(),
            second_runs,
            game.second_box().hits(),
            away.name,
            innings_note(game.outcome.innings_played)
        );
    }
    Ok(())
}

fn print_box(team: &Team, box_score: &BoxScore) {
    println!("{:<28} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3}", team.name, "AB", "R", "H", "RBI", "BB", "SO");
    for (spot, line) in team.lineup().iter().zip(&box_score.batting) {
        println!(
            "  {:<3} {:<22} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3}",
            spot.slot.code(),
            truncate(&spot.card.name, 22),
            line.at_bats,
            line.runs,
            line.hits,
            line.rbi,
            line.walks,
            line.strikeouts
        );
    }
    println!("{:<28} {:>4} {:>3} {:>3} {:>3} {:>3}", "Pitching", "IP", "H", "R", "BB", "SO");
    for (index, line) in box_score.pitching.iter().enumerate() {
        if line.batters_faced == 0 {
            continue;
        }
        let name = team.staff(index).map_or("?", |card| card.name.as_str());
        println!(
            "  {:<26} {:>4} {:>3} {:>3} {:>3} {:>3}",
            truncate(name, 26),
            line.innings_display(),
            line.hits_allowed,
            line.runs_allowed,
            line.walks_allowed,
            line.strikeouts
        );
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn innings_note(innings: u32) -> String {
    if innings > 9 {
        format!(" ({} inn)", innings)
    } else {
        String::new()
    }
}

fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}
