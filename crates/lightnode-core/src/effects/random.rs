//! Randomness effects

/// Source of uniform randomness for leaf sampling
pub trait RandomEffects: Send + Sync {
    /// Uniformly distributed index in `0..upper`
    ///
    /// Callers guarantee `upper > 0`.
    fn random_index(&self, upper: usize) -> usize;
}
