//! Player cards: batters, pitchers and the fielding positions they qualify for.
//!
//! A card carries a 20-sided outcome chart. Each chart field is the width of
//! one outcome's sub-range; widths are laid out contiguously from 1 in a fixed
//! order, so a card whose widths sum to 20 covers every die roll.

use crate::matchup::{OutKind, Outcome};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Faces on the die every chart is rolled against
pub const CHART_SIZE: u32 = 20;

/// Most positions a batter card can list besides its primary one
pub const MAX_SECONDARY_POSITIONS: usize = 4;

/// Highest point value a single card may carry
pub const MAX_CARD_POINTS: u32 = 10_000;

/// Most innings a pitcher card may list
pub const MAX_PITCHER_INNINGS: u32 = 30;

/// Errors raised while validating card data
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("card '{card}' has a chart covering {total} of {expected} rolls")]
    ChartCoverage { card: String, total: u32, expected: u32 },

    #[error("card '{card}' lists unknown position '{token}'")]
    UnknownPosition { card: String, token: String },

    #[error("card '{card}' lists {count} secondary positions (max {max})")]
    TooManyPositions { card: String, count: usize, max: usize },

    #[error("card '{card}' has on-base {value} (must be 0-{max})")]
    OnBaseOutOfRange { card: String, value: u8, max: u32 },

    #[error("card '{card}' is worth {value} points (max {max})")]
    PointsOutOfRange { card: String, value: u32, max: u32 },

    #[error("card '{card}' lists {value} innings (max {max})")]
    InningsOutOfRange { card: String, value: u32, max: u32 },

    #[error("card '{card}' has an empty name")]
    MissingName { card: String },

    #[error("duplicate card '{0}' in pool")]
    Duplicate(CardKey),
}

// ============================================================================
// Positions
// ============================================================================

/// The nine lineup slots
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "C")]
    Catcher,
    #[serde(rename = "1B")]
    FirstBase,
    #[serde(rename = "2B")]
    SecondBase,
    #[serde(rename = "3B")]
    ThirdBase,
    #[serde(rename = "SS")]
    Shortstop,
    #[serde(rename = "LF")]
    LeftField,
    #[serde(rename = "CF")]
    CenterField,
    #[serde(rename = "RF")]
    RightField,
    #[serde(rename = "DH")]
    DesignatedHitter,
}

impl Position {
    /// Every lineup slot, in scorebook order
    pub const ALL: [Position; 9] = [
        Position::Catcher,
        Position::FirstBase,
        Position::SecondBase,
        Position::ThirdBase,
        Position::Shortstop,
        Position::LeftField,
        Position::CenterField,
        Position::RightField,
        Position::DesignatedHitter,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Position::Catcher => "C",
            Position::FirstBase => "1B",
            Position::SecondBase => "2B",
            Position::ThirdBase => "3B",
            Position::Shortstop => "SS",
            Position::LeftField => "LF",
            Position::CenterField => "CF",
            Position::RightField => "RF",
            Position::DesignatedHitter => "DH",
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Expand one position token from a card into the slots it covers.
    ///
    /// Handles the combined codes printed on cards: `LFRF` (both corners),
    /// `OF` (all three outfield spots), `IF` (the four infield spots) and
    /// hyphenated lists such as `2B-1B-3B`.
    pub fn expand_token(token: &str) -> Option<PositionSet> {
        let token = token.trim();
        let mut set = PositionSet::empty();
        match token {
            "LFRF" => {
                set.insert(Position::LeftField);
                set.insert(Position::RightField);
            }
            "OF" => {
                set.insert(Position::LeftField);
                set.insert(Position::CenterField);
                set.insert(Position::RightField);
            }
            "IF" => {
                set.insert(Position::FirstBase);
                set.insert(Position::SecondBase);
                set.insert(Position::ThirdBase);
                set.insert(Position::Shortstop);
            }
            _ if token.contains('-') => {
                for part in token.split('-') {
                    set.insert(part.parse().ok()?);
                }
            }
            _ => set.insert(token.parse().ok()?),
        }
        Some(set)
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown position '{}'", s))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Compact set of lineup slots
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PositionSet(u16);

impl PositionSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn only(position: Position) -> Self {
        Self(position.bit())
    }

    pub fn insert(&mut self, position: Position) {
        self.0 |= position.bit();
    }

    pub fn union(self, other: PositionSet) -> Self {
        Self(self.0 | other.0)
    }

    pub fn contains(self, position: Position) -> bool {
        self.0 & position.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Position> {
        Position::ALL.into_iter().filter(move |p| self.contains(*p))
    }
}

/// Compute the lineup slots a batter may fill from its raw position strings.
///
/// Each string may hold several tokens separated by `/`. A card that lists DH
/// anywhere is a designated hitter only; every other card may also be slotted
/// at DH. Unknown tokens contribute nothing.
pub fn eligible_positions<'a, I>(positions: I) -> PositionSet
where
    I: IntoIterator<Item = &'a str>,
{
    let mut set = PositionSet::empty();
    for raw in positions {
        for token in raw.split('/').map(str::trim).filter(|t| !t.is_empty()) {
            if let Some(expanded) = Position::expand_token(token) {
                set = set.union(expanded);
            }
        }
    }

    if set.contains(Position::DesignatedHitter) {
        return PositionSet::only(Position::DesignatedHitter);
    }
    if !set.is_empty() {
        set.insert(Position::DesignatedHitter);
    }
    set
}

// ============================================================================
// Card identity
// ============================================================================

/// Identity of a printed card: name plus optional year and set.
///
/// Two cards of the same player from different sets are distinct cards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardKey(String);

impl CardKey {
    pub fn new(name: &str, year: Option<&str>, set: Option<&str>) -> Self {
        let edition = format!("{}{}", year.unwrap_or(""), set.unwrap_or(""));
        if edition.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{} - {}", name, edition))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Batters
// ============================================================================

/// A position player card
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatterCard {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    #[serde(alias = "pts")]
    pub points: u32,
    /// Primary position string as printed, e.g. `SS`, `OF` or `2B-1B-3B`
    pub position: String,
    /// Additional position strings
    #[serde(default, alias = "positions")]
    pub secondary: Vec<String>,
    /// Target the pitch roll must beat for the batter's chart to be used
    #[serde(alias = "onbase")]
    pub on_base: u8,
    #[serde(default, alias = "so")]
    pub strikeout: u8,
    #[serde(default, alias = "gb")]
    pub ground_ball: u8,
    #[serde(default, alias = "fb")]
    pub fly_ball: u8,
    #[serde(default, alias = "bb")]
    pub walk: u8,
    #[serde(default, alias = "b1")]
    pub single: u8,
    #[serde(default, alias = "b1p")]
    pub single_plus: u8,
    #[serde(default, alias = "b2")]
    pub double: u8,
    #[serde(default, alias = "b3")]
    pub triple: u8,
    #[serde(default, alias = "hr")]
    pub home_run: u8,
}

impl BatterCard {
    pub fn key(&self) -> CardKey {
        CardKey::new(&self.name, self.year.as_deref(), self.set.as_deref())
    }

    /// Chart sub-ranges in lookup order
    pub fn chart(&self) -> [(Outcome, u8); 9] {
        [
            (Outcome::Out(OutKind::Strikeout), self.strikeout),
            (Outcome::Out(OutKind::GroundBall), self.ground_ball),
            (Outcome::Out(OutKind::FlyBall), self.fly_ball),
            (Outcome::Walk, self.walk),
            (Outcome::Single, self.single),
            (Outcome::SingleAdvance, self.single_plus),
            (Outcome::Double, self.double),
            (Outcome::Triple, self.triple),
            (Outcome::HomeRun, self.home_run),
        ]
    }

    pub fn eligible_positions(&self) -> PositionSet {
        eligible_positions(
            std::iter::once(self.position.as_str()).chain(self.secondary.iter().map(String::as_str)),
        )
    }

    pub fn can_play(&self, position: Position) -> bool {
        self.eligible_positions().contains(position)
    }

    pub fn validate(&self) -> Result<(), CardError> {
        validate_common(&self.name, self.points, || self.key())?;
        if u32::from(self.on_base) > CHART_SIZE {
            return Err(CardError::OnBaseOutOfRange {
                card: self.key().to_string(),
                value: self.on_base,
                max: CHART_SIZE,
            });
        }
        if self.secondary.len() > MAX_SECONDARY_POSITIONS {
            return Err(CardError::TooManyPositions {
                card: self.key().to_string(),
                count: self.secondary.len(),
                max: MAX_SECONDARY_POSITIONS,
            });
        }
        for raw in std::iter::once(&self.position).chain(&self.secondary) {
            for token in raw.split('/').map(str::trim).filter(|t| !t.is_empty()) {
                if Position::expand_token(token).is_none() {
                    return Err(CardError::UnknownPosition {
                        card: self.key().to_string(),
                        token: token.to_string(),
                    });
                }
            }
        }
        check_coverage(&self.chart(), || self.key())
    }
}

impl fmt::Display for BatterCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {} pts)", self.key(), self.position, self.points)
    }
}

// ============================================================================
// Pitchers
// ============================================================================

/// Bullpen role printed on a pitcher card
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitcherRole {
    #[serde(alias = "SP")]
    Starter,
    #[serde(alias = "RP")]
    Reliever,
    #[serde(alias = "CL")]
    Closer,
    /// Listed as plain `P`: fits any staff role
    #[serde(alias = "P")]
    Generic,
}

impl PitcherRole {
    pub fn can_start(self) -> bool {
        matches!(self, PitcherRole::Starter | PitcherRole::Generic)
    }

    pub fn can_relieve(self) -> bool {
        matches!(self, PitcherRole::Reliever | PitcherRole::Generic)
    }

    pub fn can_close(self) -> bool {
        matches!(self, PitcherRole::Closer | PitcherRole::Generic)
    }

    pub fn code(self) -> &'static str {
        match self {
            PitcherRole::Starter => "SP",
            PitcherRole::Reliever => "RP",
            PitcherRole::Closer => "CL",
            PitcherRole::Generic => "P",
        }
    }
}

/// A pitcher card
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PitcherCard {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    #[serde(alias = "pts")]
    pub points: u32,
    #[serde(alias = "position")]
    pub role: PitcherRole,
    pub control: u8,
    /// Innings the pitcher can work before tiring; 0 when the card omits it
    #[serde(default, alias = "ip")]
    pub innings: u32,
    #[serde(default, alias = "pu")]
    pub popup: u8,
    #[serde(default, alias = "so")]
    pub strikeout: u8,
    #[serde(default, alias = "gb")]
    pub ground_ball: u8,
    #[serde(default, alias = "fb")]
    pub fly_ball: u8,
    #[serde(default, alias = "bb")]
    pub walk: u8,
    #[serde(default, alias = "b1")]
    pub single: u8,
    #[serde(default, alias = "b2")]
    pub double: u8,
    #[serde(default, alias = "hr")]
    pub home_run: u8,
}

impl PitcherCard {
    pub fn key(&self) -> CardKey {
        CardKey::new(&self.name, self.year.as_deref(), self.set.as_deref())
    }

    /// Outs this pitcher may record in one game
    pub fn outs_limit(&self) -> u32 {
        self.innings.saturating_mul(3)
    }

    /// Chart sub-ranges in lookup order
    pub fn chart(&self) -> [(Outcome, u8); 8] {
        [
            (Outcome::Out(OutKind::PopUp), self.popup),
            (Outcome::Out(OutKind::Strikeout), self.strikeout),
            (Outcome::Out(OutKind::GroundBall), self.ground_ball),
            (Outcome::Out(OutKind::FlyBall), self.fly_ball),
            (Outcome::Walk, self.walk),
            (Outcome::Single, self.single),
            (Outcome::Double, self.double),
            (Outcome::HomeRun, self.home_run),
        ]
    }

    pub fn validate(&self) -> Result<(), CardError> {
        validate_common(&self.name, self.points, || self.key())?;
        if self.innings > MAX_PITCHER_INNINGS {
            return Err(CardError::InningsOutOfRange {
                card: self.key().to_string(),
                value: self.innings,
                max: MAX_PITCHER_INNINGS,
            });
        }
        check_coverage(&self.chart(), || self.key())
    }
}

impl fmt::Display for PitcherCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {} pts)", self.key(), self.role.code(), self.points)
    }
}

/// Either kind of card, as stored in a card file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlayerCard {
    Batter(BatterCard),
    Pitcher(PitcherCard),
}

impl PlayerCard {
    pub fn key(&self) -> CardKey {
        match self {
            PlayerCard::Batter(card) => card.key(),
            PlayerCard::Pitcher(card) => card.key(),
        }
    }

    pub fn validate(&self) -> Result<(), CardError> {
        match self {
            PlayerCard::Batter(card) => card.validate(),
            PlayerCard::Pitcher(card) => card.validate(),
        }
    }
}

/// Find the outcome whose sub-range contains `roll`.
///
/// Sub-ranges start at 1 and follow the chart order; the first entry whose
/// cumulative width reaches the roll wins. Returns `None` when the roll lies
/// beyond the chart's coverage.
pub fn chart_lookup(chart: &[(Outcome, u8)], roll: u8) -> Option<Outcome> {
    let mut cumulative = 0u32;
    for &(outcome, width) in chart {
        cumulative += u32::from(width);
        if u32::from(roll) <= cumulative {
            return Some(outcome);
        }
    }
    None
}

fn validate_common(name: &str, points: u32, key: impl Fn() -> CardKey) -> Result<(), CardError> {
    if name.trim().is_empty() {
        return Err(CardError::MissingName {
            card: key().to_string(),
        });
    }
    if points > MAX_CARD_POINTS {
        return Err(CardError::PointsOutOfRange {
            card: key().to_string(),
            value: points,
            max: MAX_CARD_POINTS,
        });
    }
    Ok(())
}

fn check_coverage(chart: &[(Outcome, u8)], key: impl Fn() -> CardKey) -> Result<(), CardError> {
    let total: u32 = chart.iter().map(|(_, w)| u32::from(*w)).sum();
    if total != CHART_SIZE {
        return Err(CardError::ChartCoverage {
            card: key().to_string(),
            total,
            expected: CHART_SIZE,
        });
    }
    Ok(())
}
