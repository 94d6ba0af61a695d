//! Supertraits for common effect combinations

use super::{
    ProverEffects, RandomEffects, SigningEffects, SubmissionEffects, TimeEffects,
    TreeSourceEffects,
};

/// Everything a scheduler cycle touches
///
/// Combines the data source, prover, submission, signing, time and randomness
/// effects so scheduler signatures stay readable.
pub trait LightNodeEffects:
    TreeSourceEffects + ProverEffects + SubmissionEffects + SigningEffects + TimeEffects + RandomEffects
{
}

/// Automatic implementation for types that satisfy the required bounds
impl<T> LightNodeEffects for T where
    T: TreeSourceEffects
        + ProverEffects
        + SubmissionEffects
        + SigningEffects
        + TimeEffects
        + RandomEffects
{
}
