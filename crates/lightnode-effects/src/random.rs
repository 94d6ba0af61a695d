//! Operating system randomness

use rand::rngs::OsRng;
use rand::Rng;

use lightnode_core::effects::RandomEffects;

/// Uniform indices drawn from the operating system's RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomEffects for OsRandom {
    fn random_index(&self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        OsRng.gen_range(0..upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_in_range() {
        for upper in [1, 2, 3, 17] {
            for _ in 0..50 {
                assert!(OsRandom.random_index(upper) < upper);
            }
        }
    }
}
