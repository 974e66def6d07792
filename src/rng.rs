//! Seedable random number generation
//!
//! All randomness in the simulation (terrain variation, room placement,
//! combat variance, loot rolls) flows through a single `GameRng` resource
//! so a seeded run is fully reproducible.

use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;

/// Seeded random number generator for deterministic simulation.
///
/// When a seed is provided (e.g., via headless config), the same seed will
/// always produce the same run. Without a seed, uses system entropy.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    /// Create a new GameRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a new GameRng with random entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Generate a random f32 in the range [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Generate a random f32 in the given range
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }

    /// Generate a random index in [0, len)
    pub fn random_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "random_index: len must be positive");
        (self.random_f32() * len as f32) as usize % len
    }

    /// Roll against a probability in [0.0, 1.0]
    pub fn roll(&mut self, chance: f32) -> bool {
        self.random_f32() < chance
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let seed = 12345u64;
        let mut rng1 = GameRng::from_seed(seed);
        let mut rng2 = GameRng::from_seed(seed);

        for _ in 0..100 {
            assert_eq!(rng1.random_f32(), rng2.random_f32());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut rng1 = GameRng::from_seed(1);
        let mut rng2 = GameRng::from_seed(2);

        assert_ne!(rng1.random_f32(), rng2.random_f32());
    }

    #[test]
    fn test_random_range_bounds() {
        let mut rng = GameRng::from_seed(123);
        for _ in 0..100 {
            let v = rng.random_range(0.8, 1.2);
            assert!((0.8..1.2).contains(&v));
        }
    }

    #[test]
    fn test_random_index_in_bounds() {
        let mut rng = GameRng::from_seed(7);
        for _ in 0..100 {
            assert!(rng.random_index(5) < 5);
        }
    }
}
