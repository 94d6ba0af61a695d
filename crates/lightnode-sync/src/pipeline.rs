//! Prove, verify, submit
//!
//! [`VerificationPipeline`] sequences the three downstream calls for one
//! sampled leaf. Each stage failure is reported under its own
//! [`PipelineFailure`] variant so logs can tell "never verified" apart from
//! "verified but not accepted downstream".

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use lightnode_core::effects::{ProverEffects, SigningEffects, SubmissionEffects};
use lightnode_core::{
    ProofSubmission, ProveError, SigningError, SubmitError, TreeId, TreeSnapshot, VerifiedResult,
    VerifyError,
};

// =============================================================================
// Failures
// =============================================================================

/// Stage at which a pipeline run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Proof generation
    Prove,
    /// Proof verification
    Verify,
    /// Signing the submission
    Sign,
    /// Downstream submission
    Submit,
}

impl PipelineStage {
    /// Short label used in structured logs
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Prove => "prove",
            PipelineStage::Verify => "verify",
            PipelineStage::Sign => "sign",
            PipelineStage::Submit => "submit",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a pipeline run did not produce a [`VerifiedResult`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineFailure {
    /// Proof generation failed
    #[error("proof generation failed: {0}")]
    Prove(#[source] ProveError),

    /// Verification failed or rejected the proof
    #[error("proof verification failed: {0}")]
    Verify(#[source] VerifyError),

    /// Verification answered without a root or receipt
    #[error("verification result incomplete: missing {missing}")]
    IncompleteResult {
        /// Name of the missing field
        missing: &'static str,
    },

    /// The proof was verified but could not be signed for submission
    #[error("proof verified but signing failed: {0}")]
    Signing(#[source] SigningError),

    /// The proof was verified but the downstream ledger did not accept it
    #[error("proof verified but not accepted downstream: {error}")]
    Submit {
        /// Underlying submission error
        #[source]
        error: SubmitError,
        /// Receipt of the verified proof that was not accepted
        receipt: String,
    },
}

impl PipelineFailure {
    /// Stage the run stopped at
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineFailure::Prove(_) => PipelineStage::Prove,
            PipelineFailure::Verify(_) | PipelineFailure::IncompleteResult { .. } => {
                PipelineStage::Verify
            }
            PipelineFailure::Signing(_) => PipelineStage::Sign,
            PipelineFailure::Submit { .. } => PipelineStage::Submit,
        }
    }

    /// Whether the proof had already passed verification
    pub fn was_verified(&self) -> bool {
        matches!(
            self,
            PipelineFailure::Signing(_) | PipelineFailure::Submit { .. }
        )
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Drives prove, verify and submit for one sampled leaf
pub struct VerificationPipeline<E> {
    effects: Arc<E>,
}

impl<E> Clone for VerificationPipeline<E> {
    fn clone(&self) -> Self {
        Self {
            effects: Arc::clone(&self.effects),
        }
    }
}

impl<E> VerificationPipeline<E>
where
    E: ProverEffects + SubmissionEffects + SigningEffects,
{
    /// Create a pipeline over the given collaborators
    pub fn new(effects: Arc<E>) -> Self {
        Self { effects }
    }

    /// Prove `sample` against the snapshot's leaves, verify it and submit it
    pub async fn run(
        &self,
        tree_id: &TreeId,
        snapshot: &TreeSnapshot,
        sample: &str,
    ) -> Result<VerifiedResult, PipelineFailure> {
        let proof = self
            .effects
            .prove(&snapshot.leaves, sample)
            .await
            .map_err(PipelineFailure::Prove)?;
        debug!(tree_id = %tree_id, path_len = proof.proof_path.len(), "proof generated");

        let output = self
            .effects
            .verify(&snapshot.leaves, &proof)
            .await
            .map_err(PipelineFailure::Verify)?;
        if output.verified == Some(false) {
            return Err(PipelineFailure::Verify(VerifyError::Rejected));
        }
        let root = output
            .root
            .ok_or(PipelineFailure::IncompleteResult { missing: "root" })?;
        let receipt = output
            .receipt
            .ok_or(PipelineFailure::IncompleteResult { missing: "receipt" })?;
        debug!(tree_id = %tree_id, root = %root, "proof verified");

        let proof_hash = proof.digest();
        let signature = self
            .effects
            .sign(&proof_hash)
            .map_err(PipelineFailure::Signing)?;

        let submission = ProofSubmission {
            wallet_address: self.effects.wallet_address(),
            signature,
            proof,
            proof_hash: proof_hash.clone(),
            receipt: receipt.clone(),
            tree_id: tree_id.clone(),
        };

        let ack = match self.effects.submit(&submission).await {
            Ok(ack) => ack,
            Err(error) => return Err(PipelineFailure::Submit { error, receipt }),
        };
        if !ack.accepted {
            return Err(PipelineFailure::Submit {
                error: SubmitError::NotAccepted {
                    message: ack.message.unwrap_or_default(),
                },
                receipt,
            });
        }

        Ok(VerifiedResult {
            tree_id: tree_id.clone(),
            receipt,
            new_root: root,
            proof_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use lightnode_core::{SubmissionAck, VerificationOutput};
    use lightnode_testkit::{MockEffects, ProveBehavior, VerifyBehavior};

    fn snapshot() -> TreeSnapshot {
        TreeSnapshot::new("r0", vec!["a".into(), "b".into(), "c".into()])
    }

    fn pipeline(effects: &Arc<MockEffects>) -> VerificationPipeline<MockEffects> {
        VerificationPipeline::new(Arc::clone(effects))
    }

    #[tokio::test]
    async fn test_successful_run_submits_signed_proof() {
        let effects = Arc::new(MockEffects::new());
        effects.prover.set_verify(VerifyBehavior::Complete {
            root: "r0".into(),
            receipt: "rcpt1".into(),
        });

        let result = pipeline(&effects)
            .run(&TreeId::from("t1"), &snapshot(), "b")
            .await
            .unwrap();

        assert_eq!(result.receipt, "rcpt1");
        assert_eq!(result.new_root, "r0");

        let submissions = effects.submitter.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].proof.leaf_value, "b");
        assert_eq!(submissions[0].proof_hash, result.proof_hash);
        assert_eq!(submissions[0].wallet_address, effects.signer.wallet_address());
        assert_eq!(
            submissions[0].signature,
            effects.signer.expected_signature(&result.proof_hash)
        );
    }

    #[tokio::test]
    async fn test_prove_failure_stops_before_verify() {
        let effects = Arc::new(MockEffects::new());
        effects
            .prover
            .set_prove(ProveBehavior::Fail(ProveError::transport("down")));

        let failure = pipeline(&effects)
            .run(&TreeId::from("t1"), &snapshot(), "a")
            .await
            .unwrap_err();

        assert_eq!(failure.stage(), PipelineStage::Prove);
        assert_eq!(effects.prover.verify_calls(), 0);
        assert!(effects.submitter.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_missing_receipt_is_incomplete() {
        let effects = Arc::new(MockEffects::new());
        effects
            .prover
            .set_verify(VerifyBehavior::Raw(VerificationOutput {
                root: Some("r0".into()),
                receipt: None,
                verified: Some(true),
            }));

        let failure = pipeline(&effects)
            .run(&TreeId::from("t1"), &snapshot(), "a")
            .await
            .unwrap_err();

        assert_eq!(
            failure,
            PipelineFailure::IncompleteResult { missing: "receipt" }
        );
        assert!(effects.submitter.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_rejection() {
        let effects = Arc::new(MockEffects::new());
        effects
            .prover
            .set_verify(VerifyBehavior::Raw(VerificationOutput {
                root: Some("r0".into()),
                receipt: Some("rcpt".into()),
                verified: Some(false),
            }));

        let failure = pipeline(&effects)
            .run(&TreeId::from("t1"), &snapshot(), "a")
            .await
            .unwrap_err();
        assert_eq!(failure, PipelineFailure::Verify(VerifyError::Rejected));
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_receipt() {
        let effects = Arc::new(MockEffects::new());
        effects.prover.set_verify(VerifyBehavior::Complete {
            root: "r0".into(),
            receipt: "rcpt9".into(),
        });
        effects.submitter.fail_with(SubmitError::Rejected {
            status: 500,
            body: "ledger busy".into(),
        });

        let failure = pipeline(&effects)
            .run(&TreeId::from("t1"), &snapshot(), "a")
            .await
            .unwrap_err();

        assert!(failure.was_verified());
        assert_eq!(failure.stage(), PipelineStage::Submit);
        assert_matches!(failure, PipelineFailure::Submit { receipt, .. } if receipt == "rcpt9");
    }

    #[tokio::test]
    async fn test_unaccepted_ack_is_submit_failure() {
        let effects = Arc::new(MockEffects::new());
        effects.submitter.respond_with(SubmissionAck {
            accepted: false,
            message: Some("duplicate".into()),
        });

        let failure = pipeline(&effects)
            .run(&TreeId::from("t1"), &snapshot(), "a")
            .await
            .unwrap_err();

        assert_matches!(
            failure,
            PipelineFailure::Submit { error: SubmitError::NotAccepted { message }, .. } if message == "duplicate"
        );
    }

    #[tokio::test]
    async fn test_signing_failure_is_reported_after_verification() {
        let effects = Arc::new(MockEffects::new());
        effects.signer.fail_signing(true);

        let failure = pipeline(&effects)
            .run(&TreeId::from("t1"), &snapshot(), "a")
            .await
            .unwrap_err();

        assert_eq!(failure.stage(), PipelineStage::Sign);
        assert!(failure.was_verified());
        assert!(effects.submitter.submissions().is_empty());
    }
}
