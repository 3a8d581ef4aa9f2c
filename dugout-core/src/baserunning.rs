//! Base state and runner advancement.
//!
//! Runners are identified by an opaque copyable id (the simulator uses the
//! lineup spot) so a run can be credited to whoever crossed the plate.

use crate::matchup::Outcome;
use std::fmt;

/// Occupants of first, second and third
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bases<R> {
    slots: [Option<R>; 3],
}

impl<R: Copy> Bases<R> {
    pub fn empty() -> Self {
        Self { slots: [None; 3] }
    }

    /// Build from explicit occupants of first, second and third
    pub fn new(first: Option<R>, second: Option<R>, third: Option<R>) -> Self {
        Self {
            slots: [first, second, third],
        }
    }

    pub fn first(&self) -> Option<R> {
        self.slots[0]
    }

    pub fn second(&self) -> Option<R> {
        self.slots[1]
    }

    pub fn third(&self) -> Option<R> {
        self.slots[2]
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Occupied bases as (base number 1-3, runner)
    pub fn occupied(&self) -> impl Iterator<Item = (usize, R)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|r| (i + 1, r)))
    }
}

impl<R: Copy> Default for Bases<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R: Copy + fmt::Display> fmt::Display for Bases<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("bases empty");
        }
        let mut first = true;
        for (base, runner) in self.occupied() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}B: {}", base, runner)?;
            first = false;
        }
        Ok(())
    }
}

/// Result of applying one outcome to the bases
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Advance<R> {
    /// Runners who scored, lead runner first, batter last
    pub scored: Vec<R>,
    pub bases: Bases<R>,
}

impl<R> Advance<R> {
    pub fn runs(&self) -> usize {
        self.scored.len()
    }
}

/// Move runners for a plate appearance outcome.
///
/// Outs leave the bases alone. A walk forces runners only where forced. A
/// plain single moves everyone up one. A single-advance does the same, then
/// the batter takes second if it is open. Doubles and triples move everyone
/// by two and three bases; a home run clears the bases.
pub fn advance<R: Copy>(bases: &Bases<R>, outcome: Outcome, batter: R) -> Advance<R> {
    let [first, second, third] = bases.slots;
    let mut scored = Vec::new();

    let slots = match outcome {
        Outcome::Out(_) => [first, second, third],
        Outcome::Walk => match (first, second) {
            (None, _) => [Some(batter), second, third],
            (Some(_), None) => [Some(batter), first, third],
            (Some(_), Some(_)) => {
                scored.extend(third);
                [Some(batter), first, second]
            }
        },
        Outcome::Single => {
            scored.extend(third);
            [Some(batter), first, second]
        }
        Outcome::SingleAdvance => {
            scored.extend(third);
            let moved = [Some(batter), first, second];
            if moved[1].is_none() {
                [None, Some(batter), moved[2]]
            } else {
                moved
            }
        }
        Outcome::Double => {
            scored.extend(third);
            scored.extend(second);
            [None, Some(batter), first]
        }
        Outcome::Triple => {
            scored.extend(third);
            scored.extend(second);
            scored.extend(first);
            [None, None, Some(batter)]
        }
        Outcome::HomeRun => {
            scored.extend(third);
            scored.extend(second);
            scored.extend(first);
            scored.push(batter);
            [None, None, None]
        }
    };

    Advance {
        scored,
        bases: Bases { slots },
    }
}
