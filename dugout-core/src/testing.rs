//! Card and roster fixtures shared by unit tests.

use crate::card::{BatterCard, PitcherCard, PitcherRole, Position};
use crate::team::{BullpenArm, BullpenRole, LineupSpot, RosterParts, Team};
use std::sync::Arc;

pub fn make_batter(name: &str, position: &str, on_base: u8) -> BatterCard {
    BatterCard {
        name: name.to_string(),
        year: None,
        set: None,
        points: 250,
        position: position.to_string(),
        secondary: Vec::new(),
        on_base,
        strikeout: 3,
        ground_ball: 3,
        fly_ball: 2,
        walk: 4,
        single: 4,
        single_plus: 1,
        double: 1,
        triple: 0,
        home_run: 2,
    }
}

pub fn make_pitcher(name: &str, role: PitcherRole, innings: u32) -> PitcherCard {
    PitcherCard {
        name: name.to_string(),
        year: None,
        set: None,
        points: 250,
        role,
        control: 3,
        innings,
        popup: 2,
        strikeout: 5,
        ground_ball: 5,
        fly_ball: 3,
        walk: 2,
        single: 2,
        double: 0,
        home_run: 1,
    }
}

/// Batter whose pitch roll is always won by the pitcher
pub fn out_batter(name: &str, position: &str) -> BatterCard {
    BatterCard {
        on_base: 0,
        strikeout: 20,
        ground_ball: 0,
        fly_ball: 0,
        walk: 0,
        single: 0,
        single_plus: 0,
        double: 0,
        home_run: 0,
        ..make_batter(name, position, 0)
    }
}

/// Batter who always uses his own chart, and it is all home runs
pub fn homer_batter(name: &str, position: &str) -> BatterCard {
    BatterCard {
        strikeout: 0,
        ground_ball: 0,
        fly_ball: 0,
        walk: 0,
        single: 0,
        single_plus: 0,
        double: 0,
        home_run: 20,
        ..make_batter(name, position, 20)
    }
}

/// Pitcher whose chart is nothing but strikeouts
pub fn strikeout_pitcher(name: &str, role: PitcherRole, innings: u32) -> PitcherCard {
    PitcherCard {
        popup: 0,
        strikeout: 20,
        ground_ball: 0,
        fly_ball: 0,
        walk: 0,
        single: 0,
        double: 0,
        home_run: 0,
        ..make_pitcher(name, role, innings)
    }
}

/// A legal roster of ordinary cards, 5000 points total
pub fn make_parts(prefix: &str) -> RosterParts {
    let lineup = Position::ALL
        .iter()
        .map(|&slot| LineupSpot {
            slot,
            card: Arc::new(make_batter(&format!("{} {}", prefix, slot.code()), slot.code(), 8)),
        })
        .collect();
    let bench = vec![Arc::new(make_batter(&format!("{} bench", prefix), "C", 8))];
    let rotation = (1..=4)
        .map(|i| Arc::new(make_pitcher(&format!("{} SP{}", prefix, i), PitcherRole::Starter, 6)))
        .collect();
    let mut bullpen: Vec<BullpenArm> = (1..=5)
        .map(|i| BullpenArm {
            role: BullpenRole::Reliever,
            card: Arc::new(make_pitcher(&format!("{} RP{}", prefix, i), PitcherRole::Reliever, 1)),
        })
        .collect();
    bullpen.push(BullpenArm {
        role: BullpenRole::Closer,
        card: Arc::new(make_pitcher(&format!("{} CL", prefix), PitcherRole::Closer, 1)),
    });
    RosterParts {
        lineup,
        bench,
        rotation,
        bullpen,
    }
}

pub fn make_team(prefix: &str) -> Team {
    Team::from_parts(prefix, make_parts(prefix)).unwrap()
}

/// Roster that can never reach base and whose pitchers strike out everyone
pub fn all_out_parts(prefix: &str, starter_innings: u32, reliever_innings: u32) -> RosterParts {
    let mut parts = make_parts(prefix);
    for spot in &mut parts.lineup {
        spot.card = Arc::new(out_batter(&spot.card.name, spot.slot.code()));
    }
    for card in &mut parts.rotation {
        *card = Arc::new(strikeout_pitcher(&card.name, PitcherRole::Starter, starter_innings));
    }
    for arm in &mut parts.bullpen {
        arm.card = Arc::new(strikeout_pitcher(&arm.card.name, arm.card.role, reliever_innings));
    }
    parts
}
