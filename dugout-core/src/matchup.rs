//! Plate appearance resolution.
//!
//! A plate appearance is two d20 rolls. The pitch roll decides whose chart is
//! used; the swing roll is then looked up on that chart.

use crate::card::{chart_lookup, BatterCard, PitcherCard};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an out was made
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutKind {
    Strikeout,
    GroundBall,
    FlyBall,
    PopUp,
    /// A roll that fell outside the chart
    Unrecorded,
}

/// Result of one plate appearance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Out(OutKind),
    Walk,
    Single,
    /// Single on which the batter takes an extra base when second is open
    SingleAdvance,
    Double,
    Triple,
    HomeRun,
}

impl Outcome {
    /// Short scorebook code
    pub fn code(self) -> &'static str {
        match self {
            Outcome::Out(OutKind::Strikeout) => "SO",
            Outcome::Out(OutKind::GroundBall) => "GB",
            Outcome::Out(OutKind::FlyBall) => "FB",
            Outcome::Out(OutKind::PopUp) => "PU",
            Outcome::Out(OutKind::Unrecorded) => "OUT",
            Outcome::Walk => "BB",
            Outcome::Single => "1B",
            Outcome::SingleAdvance => "1BP",
            Outcome::Double => "2B",
            Outcome::Triple => "3B",
            Outcome::HomeRun => "HR",
        }
    }

    pub fn is_out(self) -> bool {
        matches!(self, Outcome::Out(_))
    }

    pub fn is_hit(self) -> bool {
        matches!(
            self,
            Outcome::Single | Outcome::SingleAdvance | Outcome::Double | Outcome::Triple | Outcome::HomeRun
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SO" => Ok(Outcome::Out(OutKind::Strikeout)),
            "GB" => Ok(Outcome::Out(OutKind::GroundBall)),
            "FB" => Ok(Outcome::Out(OutKind::FlyBall)),
            "PU" => Ok(Outcome::Out(OutKind::PopUp)),
            "OUT" => Ok(Outcome::Out(OutKind::Unrecorded)),
            "BB" => Ok(Outcome::Walk),
            "1B" => Ok(Outcome::Single),
            "1BP" | "1B+" => Ok(Outcome::SingleAdvance),
            "2B" => Ok(Outcome::Double),
            "3B" => Ok(Outcome::Triple),
            "HR" => Ok(Outcome::HomeRun),
            other => Err(format!("unknown outcome code '{}'", other)),
        }
    }
}

/// How the pitch roll is compared against the batter's on-base number
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PitchRule {
    /// The pitch is good when the raw roll exceeds on-base
    #[default]
    RollOnly,
    /// The pitcher's control is added to the roll first
    RollPlusControl,
}

/// Everything that happened in one plate appearance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub pitch_roll: u8,
    pub swing_roll: u8,
    /// True when the pitcher's chart was used
    pub good_pitch: bool,
    pub outcome: Outcome,
}

/// Whether the pitcher wins the pitch roll
pub fn is_good_pitch(batter: &BatterCard, pitcher: &PitcherCard, pitch_roll: u8, rule: PitchRule) -> bool {
    let roll = match rule {
        PitchRule::RollOnly => u32::from(pitch_roll),
        PitchRule::RollPlusControl => u32::from(pitch_roll) + u32::from(pitcher.control),
    };
    roll > u32::from(batter.on_base)
}

/// Resolve a plate appearance under the default pitch rule
pub fn resolve(batter: &BatterCard, pitcher: &PitcherCard, pitch_roll: u8, swing_roll: u8) -> Outcome {
    resolve_with_rule(batter, pitcher, pitch_roll, swing_roll, PitchRule::RollOnly).outcome
}

/// Resolve a plate appearance.
///
/// A swing roll the selected chart does not cover is logged and scored as an
/// out, so a malformed card never stalls a game.
pub fn resolve_with_rule(
    batter: &BatterCard,
    pitcher: &PitcherCard,
    pitch_roll: u8,
    swing_roll: u8,
    rule: PitchRule,
) -> Resolution {
    let good_pitch = is_good_pitch(batter, pitcher, pitch_roll, rule);
    let found = if good_pitch {
        chart_lookup(&pitcher.chart(), swing_roll)
    } else {
        chart_lookup(&batter.chart(), swing_roll)
    };

    let outcome = found.unwrap_or_else(|| {
        let owner = if good_pitch {
            pitcher.key()
        } else {
            batter.key()
        };
        tracing::warn!(card = %owner, roll = swing_roll, "roll not covered by chart, scoring an out");
        Outcome::Out(OutKind::Unrecorded)
    });

    Resolution {
        pitch_roll,
        swing_roll,
        good_pitch,
        outcome,
    }
}
