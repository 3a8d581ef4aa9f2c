//! Teams: a nine-man lineup, one bench bat, four starters and six relievers.

use crate::card::{BatterCard, CardKey, PitcherCard, Position};
use crate::stats::{BoxScore, StatLedger};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

pub const LINEUP_SIZE: usize = 9;
pub const BENCH_SIZE: usize = 1;
pub const ROTATION_SIZE: usize = 4;
pub const BULLPEN_SIZE: usize = 6;

/// Errors from building or validating a roster
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error(
        "could not build roster '{name}' in {attempts} attempts ({batters} batters, {pitchers} pitchers in pool)"
    )]
    ConstructionFailed {
        name: String,
        attempts: usize,
        batters: usize,
        pitchers: usize,
    },

    #[error("pool has {batters} batters and {pitchers} pitchers; at least {required} of each are needed")]
    InsufficientPool {
        batters: usize,
        pitchers: usize,
        required: usize,
    },

    #[error("invalid roster '{name}': {reason}")]
    InvalidShape { name: String, reason: String },
}

/// Inclusive bounds on a roster's total card points
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRange {
    pub min: u32,
    pub max: u32,
}

impl PointRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, points: u32) -> bool {
        (self.min..=self.max).contains(&points)
    }
}

impl Default for PointRange {
    fn default() -> Self {
        Self {
            min: 4500,
            max: 5000,
        }
    }
}

impl fmt::Display for PointRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// A batter assigned to a defensive slot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineupSpot {
    pub slot: Position,
    pub card: Arc<BatterCard>,
}

/// Bullpen assignment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BullpenRole {
    Reliever,
    Closer,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BullpenArm {
    pub role: BullpenRole,
    pub card: Arc<PitcherCard>,
}

/// The card groups of a roster, without name checks or stats
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterParts {
    pub lineup: Vec<LineupSpot>,
    pub bench: Vec<Arc<BatterCard>>,
    pub rotation: Vec<Arc<PitcherCard>>,
    pub bullpen: Vec<BullpenArm>,
}

impl RosterParts {
    /// Sum of card points, saturating at `u32::MAX`
    pub fn total_points(&self) -> u32 {
        self.lineup
            .iter()
            .map(|s| s.card.points)
            .chain(self.bench.iter().map(|c| c.points))
            .chain(self.rotation.iter().map(|c| c.points))
            .chain(self.bullpen.iter().map(|a| a.card.points))
            .fold(0u32, u32::saturating_add)
    }

    /// Identity of every card on the roster
    pub fn card_keys(&self) -> impl Iterator<Item = CardKey> + '_ {
        self.lineup
            .iter()
            .map(|s| s.card.key())
            .chain(self.bench.iter().map(|c| c.key()))
            .chain(self.rotation.iter().map(|c| c.key()))
            .chain(self.bullpen.iter().map(|a| a.card.key()))
    }

    fn check(&self) -> Result<(), String> {
        if self.lineup.len() != LINEUP_SIZE {
            return Err(format!("lineup has {} batters, expected {}", self.lineup.len(), LINEUP_SIZE));
        }
        if self.bench.len() != BENCH_SIZE {
            return Err(format!("bench has {} batters, expected {}", self.bench.len(), BENCH_SIZE));
        }
        if self.rotation.len() != ROTATION_SIZE {
            return Err(format!(
                "rotation has {} pitchers, expected {}",
                self.rotation.len(),
                ROTATION_SIZE
            ));
        }
        if self.bullpen.len() != BULLPEN_SIZE {
            return Err(format!("bullpen has {} pitchers, expected {}", self.bullpen.len(), BULLPEN_SIZE));
        }

        for position in Position::ALL {
            let count = self.lineup.iter().filter(|s| s.slot == position).count();
            if count != 1 {
                return Err(format!("slot {} filled {} times", position, count));
            }
        }
        if let Some(spot) = self.lineup.iter().find(|s| !s.card.can_play(s.slot)) {
            return Err(format!("{} cannot play {}", spot.card.key(), spot.slot));
        }
        if self.bullpen.iter().filter(|a| a.role == BullpenRole::Closer).count() > 1 {
            return Err("more than one closer".to_string());
        }

        let batters = self.lineup.iter().map(|s| &s.card).chain(&self.bench);
        for card in batters {
            card.validate().map_err(|e| e.to_string())?;
        }
        let pitchers = self.rotation.iter().chain(self.bullpen.iter().map(|a| &a.card));
        for card in pitchers {
            card.validate().map_err(|e| e.to_string())?;
        }

        let mut seen = FxHashSet::default();
        for key in self.card_keys() {
            if !seen.insert(key.clone()) {
                return Err(format!("{} appears twice", key));
            }
        }
        Ok(())
    }
}

/// A complete team.
///
/// Only game-persistent data lives here. Anything that changes during a game
/// (lineup cursor, pitcher on the mound, fatigue) is owned by the simulator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    lineup: Vec<LineupSpot>,
    bench: Vec<Arc<BatterCard>>,
    rotation: Vec<Arc<PitcherCard>>,
    bullpen: Vec<BullpenArm>,
    #[serde(default)]
    pub stats: StatLedger,
}

impl Team {
    /// Assemble a team, checking the roster shape
    pub fn from_parts(name: impl Into<String>, parts: RosterParts) -> Result<Self, RosterError> {
        let name = name.into();
        parts
            .check()
            .map_err(|reason| RosterError::InvalidShape {
                name: name.clone(),
                reason,
            })?;
        Ok(Self {
            name,
            lineup: parts.lineup,
            bench: parts.bench,
            rotation: parts.rotation,
            bullpen: parts.bullpen,
            stats: StatLedger::default(),
        })
    }

    pub fn to_parts(&self) -> RosterParts {
        RosterParts {
            lineup: self.lineup.clone(),
            bench: self.bench.clone(),
            rotation: self.rotation.clone(),
            bullpen: self.bullpen.clone(),
        }
    }

    /// Re-run shape checks, e.g. after deserializing
    pub fn validate(&self) -> Result<(), RosterError> {
        self.to_parts().check().map_err(|reason| RosterError::InvalidShape {
            name: self.name.clone(),
            reason,
        })
    }

    pub fn lineup(&self) -> &[LineupSpot] {
        &self.lineup
    }

    pub fn bench(&self) -> &[Arc<BatterCard>] {
        &self.bench
    }

    pub fn rotation(&self) -> &[Arc<PitcherCard>] {
        &self.rotation
    }

    pub fn bullpen(&self) -> &[BullpenArm] {
        &self.bullpen
    }

    pub fn closer(&self) -> Option<&BullpenArm> {
        self.bullpen.iter().find(|a| a.role == BullpenRole::Closer)
    }

    /// Rotation plus bullpen
    pub fn staff_len(&self) -> usize {
        self.rotation.len() + self.bullpen.len()
    }

    /// Pitcher at a staff slot: rotation first, then bullpen
    pub fn staff(&self, index: usize) -> Option<&Arc<PitcherCard>> {
        if index < self.rotation.len() {
            self.rotation.get(index)
        } else {
            self.bullpen.get(index - self.rotation.len()).map(|a| &a.card)
        }
    }

    pub fn total_points(&self) -> u32 {
        self.to_parts().total_points()
    }

    /// Fold one game's box score into season and career stats
    pub fn record_game(&mut self, box_score: &BoxScore) {
        for (spot, line) in self.lineup.iter().zip(&box_score.batting) {
            self.stats.add_batting(&spot.card.key(), line);
        }
        for (index, line) in box_score.pitching.iter().enumerate() {
            let key = match self.staff(index) {
                Some(card) => card.key(),
                None => continue,
            };
            self.stats.add_pitching(&key, line);
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let team: Team = serde_json::from_str(&content)?;
        team.validate()?;
        Ok(team)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} pts)", self.name, self.total_points())?;
        writeln!(f, "  Lineup:")?;
        for (i, spot) in self.lineup.iter().enumerate() {
            writeln!(f, "    {}. {:<3} {}", i + 1, spot.slot.code(), spot.card)?;
        }
        writeln!(f, "  Bench:")?;
        for card in &self.bench {
            writeln!(f, "    {}", card)?;
        }
        writeln!(f, "  Rotation:")?;
        for (i, card) in self.rotation.iter().enumerate() {
            writeln!(f, "    SP{} {}", i + 1, card)?;
        }
        writeln!(f, "  Bullpen:")?;
        for arm in &self.bullpen {
            let tag = match arm.role {
                BullpenRole::Closer => "CL",
                BullpenRole::Reliever => "RP",
            };
            writeln!(f, "    {}  {}", tag, arm.card)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{BattingLine, PitchingLine};
    use crate::testing::{make_batter, make_parts, make_pitcher};
    use crate::card::PitcherRole;

    #[test]
    fn test_valid_team() {
        let team = Team::from_parts("Valid", make_parts("v")).unwrap();
        assert_eq!(team.lineup().len(), LINEUP_SIZE);
        assert_eq!(team.staff_len(), ROTATION_SIZE + BULLPEN_SIZE);
        assert_eq!(team.staff(0).map(|c| c.name.as_str()), Some("v SP1"));
        assert_eq!(team.staff(4).map(|c| c.name.as_str()), Some("v RP1"));
        assert!(team.staff(10).is_none());
        assert!(team.closer().is_some());
    }

    #[test]
    fn test_rejects_ineligible_slot() {
        let mut parts = make_parts("bad");
        parts.lineup[0].card = Arc::new(make_batter("bad outfielder", "OF", 8));
        let err = Team::from_parts("Bad", parts).unwrap_err();
        assert!(matches!(err, RosterError::InvalidShape { .. }));
    }

    #[test]
    fn test_rejects_duplicate_cards() {
        let mut parts = make_parts("dup");
        let copy = parts.rotation[0].clone();
        parts.rotation[1] = copy;
        assert!(Team::from_parts("Dup", parts).is_err());
    }

    #[test]
    fn test_rejects_two_closers() {
        let mut parts = make_parts("cl");
        parts.bullpen[1] = BullpenArm {
            role: BullpenRole::Closer,
            card: Arc::new(make_pitcher("cl extra", PitcherRole::Closer, 1)),
        };
        assert!(Team::from_parts("Closers", parts).is_err());
    }

    #[test]
    fn test_oversized_points_saturate_and_are_rejected() {
        let mut parts = make_parts("rich");
        for card in parts.rotation.iter_mut().take(2) {
            let mut priced = (**card).clone();
            priced.points = 3_000_000_000;
            *card = Arc::new(priced);
        }
        assert_eq!(parts.total_points(), u32::MAX);
        let err = Team::from_parts("Rich", parts).unwrap_err();
        assert!(err.to_string().contains("points"), "{}", err);
    }

    #[test]
    fn test_rejects_card_with_invalid_innings() {
        let mut parts = make_parts("iron");
        let mut ace = (*parts.rotation[0]).clone();
        ace.innings = 2_000_000_000;
        parts.rotation[0] = Arc::new(ace);
        assert!(Team::from_parts("Iron", parts).is_err());
    }

    #[test]
    fn test_record_game_maps_spots_to_cards() {
        let mut team = Team::from_parts("Stats", make_parts("s")).unwrap();
        let mut box_score = BoxScore::new(LINEUP_SIZE, team.staff_len());
        box_score.batting[2] = BattingLine {
            hits: 1,
            at_bats: 4,
            plate_appearances: 4,
            ..Default::default()
        };
        box_score.pitching[0] = PitchingLine {
            outs: 27,
            batters_faced: 30,
            ..Default::default()
        };
        team.record_game(&box_score);

        let batter_key = team.lineup()[2].card.key();
        let starter_key = team.rotation()[0].key();
        assert_eq!(team.stats.season_line(&batter_key).map(|l| l.batting.hits), Some(1));
        assert_eq!(team.stats.season_line(&starter_key).map(|l| l.pitching.outs), Some(27));
        // Relievers who never appeared get no line
        let idle = team.bullpen()[0].card.key();
        assert!(team.stats.season_line(&idle).is_none());
    }

    #[test]
    fn test_json_round_trip_keeps_shape() {
        let team = Team::from_parts("Json", make_parts("j")).unwrap();
        let json = serde_json::to_string(&team).unwrap();
        let back: Team = serde_json::from_str(&json).unwrap();
        assert!(back.validate().is_ok());
        assert_eq!(back.total_points(), team.total_points());
    }
}
