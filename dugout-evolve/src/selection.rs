//! Parent selection
//!
//! A tournament draws `k` distinct members of the population and the one
//! with the highest fitness becomes the parent.

use rand::seq::index::sample;
use rand::Rng;

/// Pick a parent by tournament.
///
/// `fitness[i]` scores `population[i]`. The tournament shrinks to the
/// population size when `k` is larger. On equal fitness the contestant
/// drawn first wins.
///
/// # Panics
/// Panics if the population is empty, `k` is 0, or the slices differ in length.
pub fn tournament_select<'a, T, R: Rng + ?Sized>(population: &'a [T], fitness: &[f64], k: usize, rng: &mut R) -> &'a T {
    assert!(!population.is_empty(), "cannot select from an empty population");
    assert!(k > 0, "tournament needs at least one contestant");
    assert_eq!(population.len(), fitness.len(), "one fitness value per member");

    let drawn = sample(rng, population.len(), k.min(population.len()));
    let winner = drawn
        .iter()
        .reduce(|best, idx| if fitness[idx] > fitness[best] { idx } else { best })
        .unwrap_or(0);

    &population[winner]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_strong_rosters_win_more_often() {
        let rosters: Vec<&str> = vec!["r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7"];
        let win_rates: Vec<f64> = (0..8).map(|i| i as f64 / 8.0).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let top_half = (0..200)
            .map(|_| tournament_select(&rosters, &win_rates, 3, &mut rng))
            .filter(|r| ["r4", "r5", "r6", "r7"].contains(*r))
            .count();
        assert!(top_half > 140, "top half picked {} of 200 times", top_half);
    }

    #[test]
    fn test_two_weakest_never_chosen_in_three_way() {
        // Contestants are distinct, so at least one of the top three is drawn
        let members = [0usize, 1, 2, 3, 4];
        let win_rates = [0.1, 0.2, 0.3, 0.4, 0.5];
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        for _ in 0..300 {
            assert!(*tournament_select(&members, &win_rates, 3, &mut rng) >= 2);
        }
    }

    #[test]
    fn test_oversized_tournament_takes_leader() {
        let members = ["low", "high", "mid"];
        let win_rates = [0.2, 0.8, 0.5];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(*tournament_select(&members, &win_rates, 50, &mut rng), "high");
    }

    #[test]
    fn test_single_contestant_is_uniform_pick() {
        let members = ["a", "b"];
        let win_rates = [0.0, 1.0];
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let picked_a = (0..100)
            .filter(|_| *tournament_select(&members, &win_rates, 1, &mut rng) == "a")
            .count();
        assert!(picked_a > 20 && picked_a < 80);
    }

    #[test]
    #[should_panic]
    fn test_empty_population_panics() {
        let members: [u8; 0] = [];
        tournament_select(&members, &[], 2, &mut ChaCha8Rng::seed_from_u64(1));
    }
}
