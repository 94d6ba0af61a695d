//! Leaf sampling
//!
//! Picks one leaf uniformly at random. Selections are independent across
//! cycles and trees: no stratification, no memory of earlier samples, and no
//! reproducibility guarantee beyond what the injected randomness provides.

use thiserror::Error;

use lightnode_core::effects::RandomEffects;

/// Errors from sample selection
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SampleError {
    /// There is nothing to sample from
    #[error("cannot sample from an empty leaf set")]
    EmptyLeafSet,
}

/// Uniform single-leaf selector
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleSelector;

impl SampleSelector {
    /// Choose one leaf from `leaves`
    pub fn select<'a, R>(&self, random: &R, leaves: &'a [String]) -> Result<&'a str, SampleError>
    where
        R: RandomEffects + ?Sized,
    {
        if leaves.is_empty() {
            return Err(SampleError::EmptyLeafSet);
        }
        // Clamp in case a handler misbehaves; the index contract is 0..len.
        let index = random.random_index(leaves.len()).min(leaves.len() - 1);
        Ok(leaves[index].as_str())
    }
}
