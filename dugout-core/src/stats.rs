//! Batting and pitching statistics.
//!
//! Games produce a [`BoxScore`] indexed by lineup spot and staff slot. A
//! [`StatLedger`] accumulates box-score lines per card, split into the current
//! season (reset for every evaluation) and a career total.

use crate::card::CardKey;
use crate::matchup::{OutKind, Outcome};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Linear weights used for batting runs
pub mod weights {
    pub const WALK: f64 = 0.292;
    pub const SINGLE: f64 = 0.456;
    pub const DOUBLE: f64 = 0.763;
    pub const TRIPLE: f64 = 1.064;
    pub const HOME_RUN: f64 = 1.380;
    pub const OUT: f64 = -0.265;
}

/// A batter's counting stats
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingLine {
    pub games: u32,
    pub plate_appearances: u32,
    pub at_bats: u32,
    pub runs: u32,
    pub hits: u32,
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
    pub home_runs: u32,
    pub rbi: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub outs: u32,
}

impl BattingLine {
    /// Count one plate appearance
    pub fn record(&mut self, outcome: Outcome, rbi: u32) {
        self.plate_appearances += 1;
        self.rbi += rbi;
        if outcome != Outcome::Walk {
            self.at_bats += 1;
        }
        if outcome.is_hit() {
            self.hits += 1;
        }
        match outcome {
            Outcome::Out(kind) => {
                self.outs += 1;
                if kind == OutKind::Strikeout {
                    self.strikeouts += 1;
                }
            }
            Outcome::Walk => self.walks += 1,
            Outcome::Single | Outcome::SingleAdvance => self.singles += 1,
            Outcome::Double => self.doubles += 1,
            Outcome::Triple => self.triples += 1,
            Outcome::HomeRun => self.home_runs += 1,
        }
    }

    pub fn total_bases(&self) -> u32 {
        self.singles + 2 * self.doubles + 3 * self.triples + 4 * self.home_runs
    }

    pub fn average(&self) -> f64 {
        ratio(self.hits, self.at_bats)
    }

    pub fn on_base_pct(&self) -> f64 {
        ratio(self.hits + self.walks, self.plate_appearances)
    }

    pub fn slugging(&self) -> f64 {
        ratio(self.total_bases(), self.at_bats)
    }

    pub fn ops(&self) -> f64 {
        self.on_base_pct() + self.slugging()
    }

    /// Linear-weights run value above an average hitter
    pub fn batting_runs(&self) -> f64 {
        self.walks as f64 * weights::WALK
            + self.singles as f64 * weights::SINGLE
            + self.doubles as f64 * weights::DOUBLE
            + self.triples as f64 * weights::TRIPLE
            + self.home_runs as f64 * weights::HOME_RUN
            + self.outs as f64 * weights::OUT
    }
}

impl AddAssign<&BattingLine> for BattingLine {
    fn add_assign(&mut self, other: &BattingLine) {
        self.games += other.games;
        self.plate_appearances += other.plate_appearances;
        self.at_bats += other.at_bats;
        self.runs += other.runs;
        self.hits += other.hits;
        self.singles += other.singles;
        self.doubles += other.doubles;
        self.triples += other.triples;
        self.home_runs += other.home_runs;
        self.rbi += other.rbi;
        self.walks += other.walks;
        self.strikeouts += other.strikeouts;
        self.outs += other.outs;
    }
}

/// A pitcher's counting stats.
///
/// Every run charged to a pitcher is earned; there are no errors to make one
/// unearned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchingLine {
    pub games: u32,
    pub batters_faced: u32,
    pub outs: u32,
    pub hits_allowed: u32,
    pub walks_allowed: u32,
    pub strikeouts: u32,
    pub home_runs_allowed: u32,
    pub runs_allowed: u32,
    pub earned_runs: u32,
}

impl PitchingLine {
    /// Count one batter faced
    pub fn record(&mut self, outcome: Outcome, runs: u32) {
        self.batters_faced += 1;
        self.runs_allowed += runs;
        self.earned_runs += runs;
        if outcome.is_hit() {
            self.hits_allowed += 1;
        }
        match outcome {
            Outcome::Out(kind) => {
                self.outs += 1;
                if kind == OutKind::Strikeout {
                    self.strikeouts += 1;
                }
            }
            Outcome::Walk => self.walks_allowed += 1,
            Outcome::HomeRun => self.home_runs_allowed += 1,
            Outcome::Single | Outcome::SingleAdvance | Outcome::Double | Outcome::Triple => {}
        }
    }

    pub fn innings_pitched(&self) -> f64 {
        self.outs as f64 / 3.0
    }

    /// Innings in scorebook notation: `6.2` is six and two-thirds
    pub fn innings_display(&self) -> String {
        format!("{}.{}", self.outs / 3, self.outs % 3)
    }

    pub fn era(&self) -> f64 {
        per_nine(self.earned_runs, self.outs)
    }

    pub fn whip(&self) -> f64 {
        if self.outs == 0 {
            return 0.0;
        }
        (self.walks_allowed + self.hits_allowed) as f64 / self.innings_pitched()
    }

    pub fn strikeouts_per_nine(&self) -> f64 {
        per_nine(self.strikeouts, self.outs)
    }
}

impl AddAssign<&PitchingLine> for PitchingLine {
    fn add_assign(&mut self, other: &PitchingLine) {
        self.games += other.games;
        self.batters_faced += other.batters_faced;
        self.outs += other.outs;
        self.hits_allowed += other.hits_allowed;
        self.walks_allowed += other.walks_allowed;
        self.strikeouts += other.strikeouts;
        self.home_runs_allowed += other.home_runs_allowed;
        self.runs_allowed += other.runs_allowed;
        self.earned_runs += other.earned_runs;
    }
}

/// One team's box score: batting by lineup spot, pitching by staff slot
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxScore {
    pub batting: Vec<BattingLine>,
    pub pitching: Vec<PitchingLine>,
}

impl BoxScore {
    pub fn new(lineup_len: usize, staff_len: usize) -> Self {
        Self {
            batting: vec![BattingLine::default(); lineup_len],
            pitching: vec![PitchingLine::default(); staff_len],
        }
    }

    pub fn runs(&self) -> u32 {
        self.batting.iter().map(|b| b.runs).sum()
    }

    pub fn hits(&self) -> u32 {
        self.batting.iter().map(|b| b.hits).sum()
    }

    pub fn pitching_outs(&self) -> u32 {
        self.pitching.iter().map(|p| p.outs).sum()
    }
}

/// Combined batting and pitching totals for a card
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    pub batting: BattingLine,
    pub pitching: PitchingLine,
}

/// Season and career stats keyed by card
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatLedger {
    pub season: FxHashMap<CardKey, StatLine>,
    pub career: FxHashMap<CardKey, StatLine>,
}

impl StatLedger {
    /// Add a batter's game line to both season and career totals
    pub fn add_batting(&mut self, key: &CardKey, line: &BattingLine) {
        let mut game = line.clone();
        game.games = 1;
        self.season.entry(key.clone()).or_default().batting += &game;
        self.career.entry(key.clone()).or_default().batting += &game;
    }

    /// Add a pitcher's game line; pitchers who did not appear are skipped
    pub fn add_pitching(&mut self, key: &CardKey, line: &PitchingLine) {
        if line.batters_faced == 0 {
            return;
        }
        let mut game = line.clone();
        game.games = 1;
        self.season.entry(key.clone()).or_default().pitching += &game;
        self.career.entry(key.clone()).or_default().pitching += &game;
    }

    pub fn reset_season(&mut self) {
        self.season.clear();
    }

    pub fn clear(&mut self) {
        self.season.clear();
        self.career.clear();
    }

    pub fn season_line(&self, key: &CardKey) -> Option<&StatLine> {
        self.season.get(key)
    }

    pub fn career_line(&self, key: &CardKey) -> Option<&StatLine> {
        self.career.get(key)
    }
}

fn ratio(num: u32, den: u32) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn per_nine(count: u32, outs: u32) -> f64 {
    if outs == 0 {
        0.0
    } else {
        count as f64 * 27.0 / outs as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batting_record() {
        let mut line = BattingLine::default();
        line.record(Outcome::HomeRun, 2);
        line.record(Outcome::Walk, 0);
        line.record(Outcome::Out(OutKind::Strikeout), 0);
        line.record(Outcome::SingleAdvance, 1);

        assert_eq!(line.plate_appearances, 4);
        assert_eq!(line.at_bats, 3);
        assert_eq!(line.hits, 2);
        assert_eq!(line.rbi, 3);
        assert_eq!(line.strikeouts, 1);
        assert_eq!(line.total_bases(), 5);
        assert!((line.average() - 2.0 / 3.0).abs() < 1e-9);
        assert!((line.on_base_pct() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_box_score_totals() {
        let mut box_score = BoxScore::new(3, 1);
        box_score.batting[0].record(Outcome::Double, 0);
        box_score.batting[2].record(Outcome::Walk, 0);
        box_score.batting[2].record(Outcome::HomeRun, 2);
        box_score.pitching[0].record(Outcome::HomeRun, 2);
        assert_eq!(box_score.hits(), 2);
        assert_eq!(box_score.pitching[0].hits_allowed, 1);
        assert_eq!(box_score.pitching[0].home_runs_allowed, 1);
    }

    #[test]
    fn test_batting_runs_weights() {
        let line = BattingLine {
            walks: 1,
            home_runs: 1,
            outs: 2,
            ..Default::default()
        };
        let expected = 0.292 + 1.380 - 2.0 * 0.265;
        assert!((line.batting_runs() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_pitching_rates() {
        let line = PitchingLine {
            outs: 20,
            earned_runs: 3,
            runs_allowed: 3,
            hits_allowed: 5,
            walks_allowed: 2,
            strikeouts: 7,
            ..Default::default()
        };
        assert_eq!(line.innings_display(), "6.2");
        assert!((line.era() - 3.0 * 27.0 / 20.0).abs() < 1e-9);
        assert!((line.whip() - 7.0 / (20.0 / 3.0)).abs() < 1e-9);
        assert!((line.strikeouts_per_nine() - 7.0 * 27.0 / 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_outs_rates_are_zero() {
        let line = PitchingLine::default();
        assert_eq!(line.era(), 0.0);
        assert_eq!(line.whip(), 0.0);
        assert_eq!(line.innings_display(), "0.0");
    }

    #[test]
    fn test_ledger_season_reset_keeps_career() {
        let key = CardKey::new("Slugger", Some("2001"), None);
        let mut ledger = StatLedger::default();
        let line = BattingLine {
            hits: 2,
            at_bats: 4,
            ..Default::default()
        };
        ledger.add_batting(&key, &line);
        ledger.add_batting(&key, &line);
        assert_eq!(ledger.season_line(&key).map(|l| l.batting.games), Some(2));

        ledger.reset_season();
        assert!(ledger.season_line(&key).is_none());
        assert_eq!(ledger.career_line(&key).map(|l| l.batting.hits), Some(4));
    }

    #[test]
    fn test_idle_pitcher_not_recorded() {
        let key = CardKey::new("Mopup", None, None);
        let mut ledger = StatLedger::default();
        ledger.add_pitching(&key, &PitchingLine::default());
        assert!(ledger.career.is_empty());
    }
}
