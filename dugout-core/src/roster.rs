//! Random roster construction under a points budget.

use crate::card::{Position, PositionSet};
use crate::pool::CardPool;
use crate::team::{
    BullpenArm, BullpenRole, LineupSpot, PointRange, RosterError, RosterParts, Team, BULLPEN_SIZE,
    ROTATION_SIZE,
};
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashSet;

/// Fewest batters and pitchers a pool must offer
pub const MIN_POOL_PER_TYPE: usize = 10;

pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// Builds random legal rosters from a pool.
///
/// Position eligibility is computed once when the builder is created, and
/// lineup slots are filled scarcest first.
#[derive(Clone, Debug)]
pub struct RosterBuilder<'a> {
    pool: &'a CardPool,
    points: PointRange,
    max_attempts: usize,
    eligibility: Vec<PositionSet>,
    slot_order: Vec<Position>,
}

impl<'a> RosterBuilder<'a> {
    pub fn new(pool: &'a CardPool, points: PointRange) -> Self {
        let eligibility: Vec<PositionSet> = pool.batters().iter().map(|b| b.eligible_positions()).collect();

        let mut slot_order = Position::ALL.to_vec();
        slot_order.sort_by_key(|&slot| eligibility.iter().filter(|set| set.contains(slot)).count());

        Self {
            pool,
            points,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            eligibility,
            slot_order,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn points(&self) -> PointRange {
        self.points
    }

    /// Build a roster, retrying until one fits the point range.
    pub fn build<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> Result<Team, RosterError> {
        let batters = self.pool.batters().len();
        let pitchers = self.pool.pitchers().len();
        if batters < MIN_POOL_PER_TYPE || pitchers < MIN_POOL_PER_TYPE {
            return Err(RosterError::InsufficientPool {
                batters,
                pitchers,
                required: MIN_POOL_PER_TYPE,
            });
        }

        for attempt in 1..=self.max_attempts {
            let Some(parts) = self.try_build(rng) else {
                continue;
            };
            let total = parts.total_points();
            if !self.points.contains(total) {
                continue;
            }
            tracing::debug!(name, attempt, points = total, "built roster");
            return Team::from_parts(name, parts);
        }

        tracing::warn!(name, attempts = self.max_attempts, "roster construction failed");
        Err(RosterError::ConstructionFailed {
            name: name.to_string(),
            attempts: self.max_attempts,
            batters,
            pitchers,
        })
    }

    /// One randomized pass; `None` when a group could not be filled
    fn try_build<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<RosterParts> {
        let batters = self.pool.batters();
        let mut used: FxHashSet<usize> = FxHashSet::default();
        let mut lineup = Vec::with_capacity(self.slot_order.len());

        for &slot in &self.slot_order {
            let candidates: Vec<usize> = (0..batters.len())
                .filter(|i| !used.contains(i) && self.eligibility[*i].contains(slot))
                .collect();
            let &pick = candidates.choose(rng)?;
            used.insert(pick);
            lineup.push(LineupSpot {
                slot,
                card: batters[pick].clone(),
            });
        }
        // Batting order follows the scorebook, not the fill order
        lineup.sort_by_key(|spot| spot.slot);

        let remaining: Vec<usize> = (0..batters.len()).filter(|i| !used.contains(i)).collect();
        let &bench = remaining.choose(rng)?;
        let bench = vec![batters[bench].clone()];

        let mut order: Vec<usize> = (0..self.pool.pitchers().len()).collect();
        order.shuffle(rng);
        let pitchers = self.pool.pitchers();

        let mut rotation = Vec::with_capacity(ROTATION_SIZE);
        let mut taken: FxHashSet<usize> = FxHashSet::default();
        for &i in &order {
            if rotation.len() == ROTATION_SIZE {
                break;
            }
            if pitchers[i].role.can_start() {
                rotation.push(pitchers[i].clone());
                taken.insert(i);
            }
        }
        if rotation.len() < ROTATION_SIZE {
            return None;
        }

        let mut bullpen: Vec<BullpenArm> = Vec::with_capacity(BULLPEN_SIZE);
        let mut has_closer = false;
        for &i in order.iter().filter(|i| !taken.contains(i)) {
            if bullpen.len() == BULLPEN_SIZE {
                break;
            }
            let card = &pitchers[i];
            let role = if card.role == crate::card::PitcherRole::Closer {
                if has_closer {
                    continue;
                }
                has_closer = true;
                BullpenRole::Closer
            } else if card.role.can_relieve() {
                BullpenRole::Reliever
            } else {
                continue;
            };
            bullpen.push(BullpenArm {
                role,
                card: card.clone(),
            });
        }
        if bullpen.len() < BULLPEN_SIZE {
            return None;
        }

        Some(RosterParts {
            lineup,
            bench,
            rotation,
            bullpen,
        })
    }
}
