//! Mutation operators for roster evolution
//!
//! A swap removes one card from a random roster group and replaces it with
//! an unused card from the pool that fits the same role and keeps the
//! roster within its point range. When nothing fits, the original stays.

use dugout_core::{BatterCard, BullpenRole, CardKey, CardPool, PitcherCard, PointRange, RosterParts, Team};
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Roster groups a swap can target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RosterGroup {
    Lineup,
    Bench,
    Rotation,
    Bullpen,
}

impl RosterGroup {
    pub const ALL: [RosterGroup; 4] = [
        RosterGroup::Lineup,
        RosterGroup::Bench,
        RosterGroup::Rotation,
        RosterGroup::Bullpen,
    ];

    fn len(self, parts: &RosterParts) -> usize {
        match self {
            RosterGroup::Lineup => parts.lineup.len(),
            RosterGroup::Bench => parts.bench.len(),
            RosterGroup::Rotation => parts.rotation.len(),
            RosterGroup::Bullpen => parts.bullpen.len(),
        }
    }
}

/// Apply up to `num_swaps` swaps to a copy of `team`.
///
/// Returns `None` when no swap succeeded. The mutated team keeps the source
/// name and starts with an empty stat ledger.
pub fn mutate_roster<R: Rng + ?Sized>(
    team: &Team,
    pool: &CardPool,
    points: PointRange,
    num_swaps: usize,
    rng: &mut R,
) -> Option<Team> {
    let mut parts = team.to_parts();
    let mut swapped = 0;

    for _ in 0..num_swaps {
        if swap_one(&mut parts, pool, points, rng) {
            swapped += 1;
        }
    }

    if swapped == 0 {
        return None;
    }
    match Team::from_parts(team.name.clone(), parts) {
        Ok(mutated) => Some(mutated),
        Err(e) => {
            tracing::warn!(error = %e, "mutation produced an invalid roster");
            None
        }
    }
}

/// One swap attempt. Returns true if a card was replaced.
pub fn swap_one<R: Rng + ?Sized>(parts: &mut RosterParts, pool: &CardPool, points: PointRange, rng: &mut R) -> bool {
    let groups: Vec<RosterGroup> = RosterGroup::ALL
        .into_iter()
        .filter(|g| g.len(parts) > 0)
        .collect();
    let Some(&group) = groups.choose(rng) else {
        return false;
    };
    let index = rng.gen_range(0..group.len(parts));

    let on_roster: FxHashSet<CardKey> = parts.card_keys().collect();
    let total = parts.total_points();

    match group {
        RosterGroup::Lineup => {
            let slot = parts.lineup[index].slot;
            let outgoing = parts.lineup[index].card.points;
            let found = pick_batter(pool, &on_roster, rng, |card| {
                card.can_play(slot) && points.contains(swapped_total(total, outgoing, card.points))
            });
            found.map(|card| parts.lineup[index].card = card).is_some()
        }
        RosterGroup::Bench => {
            let outgoing = parts.bench[index].points;
            let found = pick_batter(pool, &on_roster, rng, |card| {
                points.contains(swapped_total(total, outgoing, card.points))
            });
            found.map(|card| parts.bench[index] = card).is_some()
        }
        RosterGroup::Rotation => {
            let outgoing = parts.rotation[index].points;
            let found = pick_pitcher(pool, &on_roster, rng, |card| {
                card.role.can_start() && points.contains(swapped_total(total, outgoing, card.points))
            });
            found.map(|card| parts.rotation[index] = card).is_some()
        }
        RosterGroup::Bullpen => {
            let role = parts.bullpen[index].role;
            let outgoing = parts.bullpen[index].card.points;
            let found = pick_pitcher(pool, &on_roster, rng, |card| {
                let fits = match role {
                    BullpenRole::Closer => card.role.can_close(),
                    BullpenRole::Reliever => card.role.can_relieve(),
                };
                fits && points.contains(swapped_total(total, outgoing, card.points))
            });
            found.map(|card| parts.bullpen[index].card = card).is_some()
        }
    }
}

fn swapped_total(total: u32, outgoing: u32, incoming: u32) -> u32 {
    total.saturating_sub(outgoing).saturating_add(incoming)
}

/// First acceptable unused batter in a random order
fn pick_batter<R, F>(pool: &CardPool, on_roster: &FxHashSet<CardKey>, rng: &mut R, accept: F) -> Option<Arc<BatterCard>>
where
    R: Rng + ?Sized,
    F: Fn(&BatterCard) -> bool,
{
    let mut candidates: Vec<&Arc<BatterCard>> = pool
        .batters()
        .iter()
        .filter(|c| !on_roster.contains(&c.key()))
        .collect();
    candidates.shuffle(rng);
    candidates.into_iter().find(|c| accept(c)).cloned()
}

fn pick_pitcher<R, F>(pool: &CardPool, on_roster: &FxHashSet<CardKey>, rng: &mut R, accept: F) -> Option<Arc<PitcherCard>>
where
    R: Rng + ?Sized,
    F: Fn(&PitcherCard) -> bool,
{
    let mut candidates: Vec<&Arc<PitcherCard>> = pool
        .pitchers()
        .iter()
        .filter(|c| !on_roster.contains(&c.key()))
        .collect();
    candidates.shuffle(rng);
    candidates.into_iter().find(|c| accept(c)).cloned()
}
