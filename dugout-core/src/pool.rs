//! The card pool rosters are drawn from.

use crate::card::{BatterCard, CardError, PitcherCard, PitcherRole, PlayerCard};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use std::path::Path;
use std::sync::Arc;

/// Validated, duplicate-free cards split by type
#[derive(Clone, Debug, Default)]
pub struct CardPool {
    batters: Vec<Arc<BatterCard>>,
    pitchers: Vec<Arc<PitcherCard>>,
}

impl CardPool {
    /// Build a pool, validating every card and rejecting duplicates
    pub fn from_cards(cards: Vec<PlayerCard>) -> Result<Self, CardError> {
        let mut seen = FxHashSet::default();
        let mut pool = CardPool::default();
        for card in cards {
            card.validate()?;
            let key = card.key();
            if !seen.insert(key.clone()) {
                return Err(CardError::Duplicate(key));
            }
            match card {
                PlayerCard::Batter(b) => pool.batters.push(Arc::new(b)),
                PlayerCard::Pitcher(p) => pool.pitchers.push(Arc::new(p)),
            }
        }
        Ok(pool)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let cards: Vec<PlayerCard> = serde_json::from_str(json)?;
        Ok(Self::from_cards(cards)?)
    }

    /// Load a JSON array of cards
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let pool = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            batters = pool.batters.len(),
            pitchers = pool.pitchers.len(),
            "loaded card pool"
        );
        Ok(pool)
    }

    pub fn batters(&self) -> &[Arc<BatterCard>] {
        &self.batters
    }

    pub fn pitchers(&self) -> &[Arc<PitcherCard>] {
        &self.pitchers
    }

    pub fn len(&self) -> usize {
        self.batters.len() + self.pitchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All cards, batters first
    pub fn cards(&self) -> Vec<PlayerCard> {
        self.batters
            .iter()
            .map(|b| PlayerCard::Batter(b.as_ref().clone()))
            .chain(self.pitchers.iter().map(|p| PlayerCard::Pitcher(p.as_ref().clone())))
            .collect()
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(&self.cards())?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ============================================================================
// Generated pool
// ============================================================================

const DEMO_BATTERS: usize = 90;
const DEMO_PITCHERS: usize = 60;

/// Position strings handed out round-robin; every slot is well covered
const DEMO_POSITIONS: [&str; 15] = [
    "C", "1B", "2B", "3B", "SS", "LF", "CF", "RF", "OF", "IF", "LFRF", "2B-SS", "C", "1B-3B", "DH",
];

const DEMO_ROLES: [PitcherRole; 6] = [
    PitcherRole::Starter,
    PitcherRole::Reliever,
    PitcherRole::Starter,
    PitcherRole::Reliever,
    PitcherRole::Closer,
    PitcherRole::Generic,
];

const FIRST_NAMES: [&str; 16] = [
    "Ace", "Buck", "Chico", "Dusty", "Eddie", "Flip", "Gus", "Hank", "Ike", "Jody", "Kit", "Lefty", "Moose",
    "Nap", "Ozzie", "Pee Wee",
];

const LAST_NAMES: [&str; 16] = [
    "Abbott", "Barnes", "Crowley", "Dunn", "Ellis", "Fenwick", "Gault", "Hollis", "Irvin", "Jessup", "Kellner",
    "Lasko", "Mercer", "Nolan", "Orr", "Pruitt",
];

/// Deterministic synthetic pool for demos and tests.
///
/// Charts always cover 20 rolls and points loosely track card quality, so
/// default point bounds admit plenty of rosters.
pub fn demo_pool(seed: u64) -> CardPool {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut batters = Vec::with_capacity(DEMO_BATTERS);
    let mut pitchers = Vec::with_capacity(DEMO_PITCHERS);

    for i in 0..DEMO_BATTERS {
        batters.push(Arc::new(demo_batter(&mut rng, i)));
    }
    for i in 0..DEMO_PITCHERS {
        pitchers.push(Arc::new(demo_pitcher(&mut rng, i)));
    }
    batters.shuffle(&mut rng);
    pitchers.shuffle(&mut rng);

    CardPool { batters, pitchers }
}

fn demo_name(index: usize) -> String {
    let first = FIRST_NAMES[index % FIRST_NAMES.len()];
    let last = LAST_NAMES[(index / FIRST_NAMES.len() + index) % LAST_NAMES.len()];
    format!("{} {}", first, last)
}

/// Take up to `want` from `remaining`
fn take(remaining: &mut u8, want: u8) -> u8 {
    let got = want.min(*remaining);
    *remaining -= got;
    got
}

fn demo_batter<R: Rng>(rng: &mut R, index: usize) -> BatterCard {
    let mut remaining = 20u8;
    let strikeout = take(&mut remaining, rng.gen_range(1..=3));
    let ground_ball = take(&mut remaining, rng.gen_range(1..=3));
    let fly_ball = take(&mut remaining, rng.gen_range(1..=3));
    let walk = take(&mut remaining, rng.gen_range(3..=5));
    let home_run = take(&mut remaining, rng.gen_range(0..=3));
    let triple = take(&mut remaining, rng.gen_range(0..=1));
    let double = take(&mut remaining, rng.gen_range(1..=2));
    let single_plus = take(&mut remaining, rng.gen_range(0..=2));
    let single = remaining;

    let on_base: u8 = rng.gen_range(7..=12);
    let quality = i32::from(on_base) * 25 + i32::from(home_run) * 20 + i32::from(double + triple) * 8
        - i32::from(strikeout) * 5;
    let points = (quality - 40 + rng.gen_range(-20..=20)).clamp(60, 600) as u32;

    BatterCard {
        name: demo_name(index),
        year: Some(format!("{}", 2000 + index % 5)),
        set: Some("Demo".to_string()),
        points,
        position: DEMO_POSITIONS[index % DEMO_POSITIONS.len()].to_string(),
        secondary: Vec::new(),
        on_base,
        strikeout,
        ground_ball,
        fly_ball,
        walk,
        single,
        single_plus,
        double,
        triple,
        home_run,
    }
}

fn demo_pitcher<R: Rng>(rng: &mut R, index: usize) -> PitcherCard {
    let role = DEMO_ROLES[index % DEMO_ROLES.len()];
    let control: u8 = rng.gen_range(1..=6);

    let mut remaining = 20u8;
    let popup = take(&mut remaining, rng.gen_range(1..=3));
    let strikeout = take(&mut remaining, rng.gen_range(3..=6));
    let ground_ball = take(&mut remaining, rng.gen_range(4..=6));
    let fly_ball = take(&mut remaining, rng.gen_range(3..=5));
    let walk = take(&mut remaining, rng.gen_range(1..=2));
    let home_run = take(&mut remaining, rng.gen_range(0..=1));
    let double = take(&mut remaining, rng.gen_range(0..=1));
    let single = remaining;

    let innings = match role {
        PitcherRole::Starter => rng.gen_range(5..=7),
        PitcherRole::Reliever | PitcherRole::Closer => rng.gen_range(1..=2),
        PitcherRole::Generic => rng.gen_range(2..=4),
    };
    let quality = i32::from(control) * 40 + i32::from(popup + strikeout) * 12 + innings as i32 * 15
        - i32::from(single + double + home_run) * 10;
    let points = (quality + rng.gen_range(-20..=20)).clamp(40, 600) as u32;

    PitcherCard {
        name: demo_name(index + DEMO_BATTERS),
        year: Some(format!("{}", 2000 + index % 5)),
        set: Some("Demo".to_string()),
        points,
        role,
        control,
        innings,
        popup,
        strikeout,
        ground_ball,
        fly_ball,
        walk,
        single,
        double,
        home_run,
    }
}
