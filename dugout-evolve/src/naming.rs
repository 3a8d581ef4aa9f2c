//! Roster naming - readable identifiers for tracking evolution
//!
//! Generates two-word names (e.g., "gritty-slugger") from a roster's cards.
//! Names depend only on which cards are on the roster, so the same roster
//! always gets the same name.

use dugout_core::Team;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

// 32 adjectives + 32 nouns = 1024 names
const ADJECTIVES: [&str; 32] = [
    "crafty", "gritty", "scrappy", "lanky", "wily", "steady", "rowdy", "dusty",
    "sly", "hungry", "fearless", "lucky", "nimble", "burly", "sneaky", "patient",
    "blazing", "humble", "stubborn", "clutch", "rookie", "veteran", "southpaw", "golden",
    "iron", "electric", "quiet", "loud", "muddy", "sunny", "midnight", "rusty",
];

const NOUNS: [&str; 32] = [
    "slugger", "ace", "catcher", "shortstop", "bullpen", "dugout", "diamond", "bleacher",
    "fastball", "curveball", "slider", "knuckler", "bunt", "triple", "homer", "walkoff",
    "mitt", "glove", "spikes", "pennant", "infield", "outfield", "backstop", "mound",
    "batboy", "closer", "setup", "leadoff", "cleanup", "pinch", "squeeze", "grand-slam",
];

/// Signature of a roster's cards, independent of slot assignment order.
pub fn roster_signature(team: &Team) -> String {
    let mut keys: Vec<String> = team.to_parts().card_keys().map(|k| k.to_string()).collect();
    keys.sort();
    keys.join("|")
}

/// Convert a roster signature to a deterministic two-word name.
pub fn signature_to_name(sig: &str) -> String {
    let mut hasher = DefaultHasher::new();
    sig.hash(&mut hasher);
    let h = hasher.finish();

    let adj_idx = ((h >> 5) & 0x1F) as usize; // bits 5-9 -> adjective
    let noun_idx = (h & 0x1F) as usize; // bits 0-4 -> noun

    format!("{}-{}", ADJECTIVES[adj_idx], NOUNS[noun_idx])
}

/// Name a roster from its cards
pub fn roster_name(team: &Team) -> String {
    signature_to_name(&roster_signature(team))
}
