//! Zero-knowledge prover effects

use async_trait::async_trait;

use crate::errors::{ProveError, VerifyError};
use crate::types::{ProofArtifact, VerificationOutput};

/// Proof generation and verification against a full leaf set
#[async_trait]
pub trait ProverEffects: Send + Sync {
    /// Generate an inclusion proof for `value` within `leaves`
    async fn prove(&self, leaves: &[String], value: &str) -> Result<ProofArtifact, ProveError>;

    /// Verify `proof` against `leaves`
    ///
    /// A transport-level success may still carry an incomplete answer; the
    /// caller decides what counts as complete.
    async fn verify(
        &self,
        leaves: &[String],
        proof: &ProofArtifact,
    ) -> Result<VerificationOutput, VerifyError>;
}
