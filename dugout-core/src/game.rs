//! Full-game simulation.
//!
//! Teams are read-only during a game. Each side's in-game state (next batter,
//! pitcher on the mound, which relievers have been used, box score) lives in
//! a per-game [`SideState`], so the same team can play many games at once.

use crate::baserunning::{advance, Bases};
use crate::matchup::{resolve_with_rule, Outcome, PitchRule};
use crate::stats::BoxScore;
use crate::team::Team;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Regulation game length
pub const REGULATION_INNINGS: u32 = 9;

/// Faces on the simulation die
pub const DIE_SIDES: u8 = 20;

/// Game rules and safety limits
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub innings: u32,
    /// Game is called a draw after this many innings
    pub max_innings: u32,
    /// Half-inning is ended after this many batters
    pub max_batters_per_half: u32,
    /// Keep a play-by-play log
    pub record_log: bool,
    pub pitch_rule: PitchRule,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            innings: REGULATION_INNINGS,
            max_innings: 30,
            max_batters_per_half: 100,
            record_log: true,
            pitch_rule: PitchRule::RollOnly,
        }
    }
}

impl GameConfig {
    pub fn with_log(mut self, record_log: bool) -> Self {
        self.record_log = record_log;
        self
    }

    pub fn with_innings(mut self, innings: u32) -> Self {
        self.innings = innings;
        self
    }

    pub fn with_max_innings(mut self, max_innings: u32) -> Self {
        self.max_innings = max_innings;
        self
    }

    pub fn with_pitch_rule(mut self, pitch_rule: PitchRule) -> Self {
        self.pitch_rule = pitch_rule;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Away,
    Home,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Away => Side::Home,
            Side::Home => Side::Away,
        }
    }
}

/// Runs by inning; the home half is `None` when it was not played
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Linescore {
    pub away: Vec<u32>,
    pub home: Vec<Option<u32>>,
}

impl fmt::Display for Linescore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Away |")?;
        for runs in &self.away {
            write!(f, " {:>2}", runs)?;
        }
        writeln!(f, " | {}", self.away.iter().sum::<u32>())?;
        write!(f, "Home |")?;
        for runs in &self.home {
            match runs {
                Some(r) => write!(f, " {:>2}", r)?,
                None => write!(f, "  X")?,
            }
        }
        write!(f, " | {}", self.home.iter().flatten().sum::<u32>())
    }
}

/// Everything a finished game reports
#[derive(Clone, Debug)]
pub struct GameOutcome {
    pub away_score: u32,
    pub home_score: u32,
    pub innings_played: u32,
    pub linescore: Linescore,
    /// Home team took the lead in the final half-inning
    pub walk_off: bool,
    pub log: Vec<String>,
    pub away_box: BoxScore,
    pub home_box: BoxScore,
}

impl GameOutcome {
    /// `None` for a draw
    pub fn winner(&self) -> Option<Side> {
        match self.away_score.cmp(&self.home_score) {
            std::cmp::Ordering::Greater => Some(Side::Away),
            std::cmp::Ordering::Less => Some(Side::Home),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.winner().is_none()
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Away => self.away_score,
            Side::Home => self.home_score,
        }
    }

    pub fn box_score(&self, side: Side) -> &BoxScore {
        match side {
            Side::Away => &self.away_box,
            Side::Home => &self.home_box,
        }
    }
}

/// Plays games with its own random stream
#[derive(Clone, Debug)]
pub struct GameSimulator<R = ChaCha8Rng> {
    config: GameConfig,
    rng: R,
}

impl GameSimulator<ChaCha8Rng> {
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameSimulator<R> {
    pub fn new(config: GameConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Play with both teams' first starters
    pub fn play_game(&mut self, away: &Team, home: &Team) -> GameOutcome {
        play_game(away, home, &self.config, &mut self.rng)
    }

    pub fn play_game_with_starters(
        &mut self,
        away: &Team,
        home: &Team,
        away_starter: usize,
        home_starter: usize,
    ) -> GameOutcome {
        play_game_with_starters(away, home, away_starter, home_starter, &self.config, &mut self.rng)
    }

    /// Play a game and fold each side's box score into its stat ledger
    pub fn play_and_record(&mut self, away: &mut Team, home: &mut Team) -> GameOutcome {
        let outcome = self.play_game(away, home);
        away.record_game(&outcome.away_box);
        home.record_game(&outcome.home_box);
        outcome
    }
}

/// Play one game with both teams' first starters
pub fn play_game<R: Rng + ?Sized>(away: &Team, home: &Team, config: &GameConfig, rng: &mut R) -> GameOutcome {
    play_game_with_starters(away, home, 0, 0, config, rng)
}

/// Play one game. Starter indices wrap around each team's rotation.
pub fn play_game_with_starters<R: Rng + ?Sized>(
    away: &Team,
    home: &Team,
    away_starter: usize,
    home_starter: usize,
    config: &GameConfig,
    rng: &mut R,
) -> GameOutcome {
    let mut log = GameLog::new(config.record_log);
    let mut away_state = SideState::new(away, away_starter);
    let mut home_state = SideState::new(home, home_starter);
    let mut linescore = Linescore::default();
    let regulation = config.innings.max(1);
    let max_innings = config.max_innings.max(regulation);
    let mut walk_off = false;
    let mut inning = 1;

    log.push(|| format!("{} at {}", away.name, home.name));

    loop {
        let top = play_half_inning(&mut away_state, &mut home_state, Frame::top(inning), None, config, rng, &mut log);
        linescore.away.push(top.runs);

        if inning >= regulation && home_state.score > away_state.score {
            linescore.home.push(None);
            break;
        }

        let target = (inning >= regulation).then_some(away_state.score);
        let bottom = play_half_inning(
            &mut home_state,
            &mut away_state,
            Frame::bottom(inning),
            target,
            config,
            rng,
            &mut log,
        );
        linescore.home.push(Some(bottom.runs));

        if bottom.walk_off {
            walk_off = true;
            break;
        }
        if inning >= regulation && away_state.score != home_state.score {
            break;
        }
        if inning >= max_innings {
            tracing::warn!(inning, away = %away.name, home = %home.name, "innings limit reached, calling game a draw");
            log.push(|| format!("Game called after {} innings", inning));
            break;
        }
        inning += 1;
    }

    log.push(|| {
        format!(
            "Final: {} {}, {} {}",
            away.name, away_state.score, home.name, home_state.score
        )
    });

    GameOutcome {
        away_score: away_state.score,
        home_score: home_state.score,
        innings_played: inning,
        linescore,
        walk_off,
        log: log.into_lines(),
        away_box: away_state.box_score,
        home_box: home_state.box_score,
    }
}

// ============================================================================
// In-game state
// ============================================================================

#[derive(Clone, Copy, Debug)]
enum Half {
    Top,
    Bottom,
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    inning: u32,
    half: Half,
}

impl Frame {
    fn top(inning: u32) -> Self {
        Self { inning, half: Half::Top }
    }

    fn bottom(inning: u32) -> Self {
        Self {
            inning,
            half: Half::Bottom,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let half = match self.half {
            Half::Top => "Top",
            Half::Bottom => "Bottom",
        };
        write!(f, "{} of inning {}", half, self.inning)
    }
}

/// Play-by-play lines, formatted only when recording
struct GameLog {
    enabled: bool,
    lines: Vec<String>,
}

impl GameLog {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            lines: Vec::new(),
        }
    }

    fn push(&mut self, line: impl FnOnce() -> String) {
        if self.enabled {
            self.lines.push(line());
        }
    }

    fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// One team's side of a game in progress
struct SideState<'a> {
    team: &'a Team,
    /// Next lineup spot to bat
    cursor: usize,
    /// Staff slot of the pitcher on the mound
    pitcher: usize,
    bullpen_used: Vec<bool>,
    score: u32,
    box_score: BoxScore,
}

impl<'a> SideState<'a> {
    fn new(team: &'a Team, starter: usize) -> Self {
        let rotation = team.rotation().len().max(1);
        Self {
            team,
            cursor: 0,
            pitcher: starter % rotation,
            bullpen_used: vec![false; team.bullpen().len()],
            score: 0,
            box_score: BoxScore::new(team.lineup().len(), team.staff_len()),
        }
    }

    fn pitcher_name(&self) -> &str {
        self.team.staff(self.pitcher).map(|c| c.name.as_str()).unwrap_or("?")
    }

    /// Recording one more out would exceed the current pitcher's limit
    fn needs_relief(&self) -> bool {
        let limit = self.team.staff(self.pitcher).map(|c| c.outs_limit()).unwrap_or(0);
        self.box_score.pitching[self.pitcher].outs + 1 > limit
    }

    /// Bring in a random unused reliever. Returns false when the bullpen is empty.
    fn bring_in_reliever<R: Rng + ?Sized>(&mut self, rng: &mut R, log: &mut GameLog) -> bool {
        let available: Vec<usize> = self
            .bullpen_used
            .iter()
            .enumerate()
            .filter(|(_, used)| !**used)
            .map(|(i, _)| i)
            .collect();
        if available.is_empty() {
            return false;
        }

        let pick = available[rng.gen_range(0..available.len())];
        self.bullpen_used[pick] = true;
        let previous = self.pitcher_name().to_string();
        self.pitcher = self.team.rotation().len() + pick;
        let team = self.team.name.as_str();
        let incoming = self.pitcher_name();
        log.push(|| format!("Pitching change for {}: {} replaces {}", team, incoming, previous));
        true
    }

    /// Advance the batting order and return the spot that bats
    fn next_batter(&mut self) -> usize {
        let spot = self.cursor;
        self.cursor = (self.cursor + 1) % self.team.lineup().len();
        spot
    }
}

struct HalfInning {
    runs: u32,
    walk_off: bool,
}

/// Play a half-inning. `walk_off_target` is set in the home half of the final
/// inning: the half ends as soon as the batting side's score passes it.
fn play_half_inning<R: Rng + ?Sized>(
    batting: &mut SideState<'_>,
    pitching: &mut SideState<'_>,
    frame: Frame,
    walk_off_target: Option<u32>,
    config: &GameConfig,
    rng: &mut R,
    log: &mut GameLog,
) -> HalfInning {
    let mut outs = 0u32;
    let mut runs = 0u32;
    let mut batters = 0u32;
    let mut bases: Bases<usize> = Bases::empty();
    let mut walk_off = false;

    log.push(|| format!("--- {} ---", frame));

    while outs < 3 {
        if batters >= config.max_batters_per_half {
            tracing::warn!(%frame, batters, "batter limit reached, ending half-inning");
            log.push(|| format!("Half-inning stopped after {} batters", batters));
            break;
        }
        if pitching.needs_relief() && !pitching.bring_in_reliever(rng, log) {
            tracing::warn!(team = %pitching.team.name, %frame, "bullpen exhausted, ending half-inning");
            log.push(|| format!("{} has no pitchers left", pitching.team.name));
            break;
        }

        let spot = batting.next_batter();
        let batting_team = batting.team;
        let pitching_team = pitching.team;
        let batter = &batting_team.lineup()[spot].card;
        let pitcher_slot = pitching.pitcher;
        let Some(pitcher) = pitching_team.staff(pitcher_slot) else {
            break;
        };

        let pitch_roll = rng.gen_range(1..=DIE_SIDES);
        let swing_roll = rng.gen_range(1..=DIE_SIDES);
        let resolution = resolve_with_rule(batter, pitcher, pitch_roll, swing_roll, config.pitch_rule);
        let outcome = resolution.outcome;
        let play = advance(&bases, outcome, spot);
        let scored = play.runs() as u32;

        batting.box_score.batting[spot].record(outcome, scored);
        for &runner in &play.scored {
            batting.box_score.batting[runner].runs += 1;
        }
        pitching.box_score.pitching[pitcher_slot].record(outcome, scored);

        batters += 1;
        runs += scored;
        batting.score += scored;
        bases = play.bases;
        if outcome.is_out() {
            outs += 1;
        }

        log.push(|| {
            let chart = if resolution.good_pitch { "pitcher" } else { "batter" };
            let runners = describe_bases(&bases, batting_team);
            let mut line = format!(
                "{} vs {}: pitch {} swing {} ({} chart) -> {} | {} out | {}",
                batter.name,
                pitcher.name,
                pitch_roll,
                swing_roll,
                chart,
                outcome_text(outcome),
                outs,
                runners
            );
            if scored > 0 {
                line.push_str(&format!(" | {} run(s) score", scored));
            }
            line
        });

        if let Some(target) = walk_off_target {
            if batting.score > target {
                walk_off = true;
                log.push(|| format!("Walk-off! {} wins", batting.team.name));
                break;
            }
        }
    }

    HalfInning { runs, walk_off }
}

fn describe_bases(bases: &Bases<usize>, team: &Team) -> String {
    if bases.is_empty() {
        return "bases empty".to_string();
    }
    bases
        .occupied()
        .map(|(base, spot)| format!("{}B: {}", base, team.lineup()[spot].card.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn outcome_text(outcome: Outcome) -> &'static str {
    use crate::matchup::OutKind;
    match outcome {
        Outcome::Out(OutKind::Strikeout) => "strikeout",
        Outcome::Out(OutKind::GroundBall) => "ground out",
        Outcome::Out(OutKind::FlyBall) => "fly out",
        Outcome::Out(OutKind::PopUp) => "pop out",
        Outcome::Out(OutKind::Unrecorded) => "out",
        Outcome::Walk => "walk",
        Outcome::Single => "single",
        Outcome::SingleAdvance => "single, extra base",
        Outcome::Double => "double",
        Outcome::Triple => "triple",
        Outcome::HomeRun => "home run",
    }
}
