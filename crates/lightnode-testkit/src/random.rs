//! Seeded randomness

use parking_lot::Mutex;
use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

use lightnode_core::effects::RandomEffects;

/// Reproducible randomness from a fixed seed
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<ChaCha8Rng>,
}

impl SeededRandom {
    /// Create a generator from `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::new(42)
    }
}

impl RandomEffects for SeededRandom {
    fn random_index(&self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        self.rng.lock().gen_range(0..upper)
    }
}
