//! Bundle of every mock behind the combined effect traits

use async_trait::async_trait;

use lightnode_core::effects::{
    ProverEffects, RandomEffects, SigningEffects, SubmissionEffects, TimeEffects,
    TreeSourceEffects,
};
use lightnode_core::{
    ProofArtifact, ProofSubmission, ProveError, QueryError, SigningError, SubmissionAck,
    SubmitError, TreeId, TreeSnapshot, VerificationOutput, VerifyError,
};

use crate::{ManualClock, MockProver, MockSigner, MockSubmitter, MockTreeSource, SeededRandom};

/// One scriptable double per collaborator
///
/// The fields are public so tests can script and inspect each collaborator
/// directly, also after the bundle has been shared behind an `Arc`.
#[derive(Debug, Default)]
pub struct MockEffects {
    /// Data source
    pub trees: MockTreeSource,
    /// Prover
    pub prover: MockProver,
    /// Submission sink
    pub submitter: MockSubmitter,
    /// Wallet signer
    pub signer: MockSigner,
    /// Clock, starting at zero
    pub clock: ManualClock,
    /// Leaf sampling randomness
    pub random: SeededRandom,
}

impl MockEffects {
    /// Create a bundle with default behaviour and seed
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bundle whose sampling uses `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self {
            random: SeededRandom::new(seed),
            ..Self::default()
        }
    }
}

#[async_trait]
impl TreeSourceEffects for MockEffects {
    async fn list_tree_ids(&self) -> Result<Vec<TreeId>, QueryError> {
        self.trees.list_tree_ids().await
    }

    async fn get_tree(&self, tree_id: &TreeId) -> Result<TreeSnapshot, QueryError> {
        self.trees.get_tree(tree_id).await
    }
}

#[async_trait]
impl ProverEffects for MockEffects {
    async fn prove(&self, leaves: &[String], value: &str) -> Result<ProofArtifact, ProveError> {
        self.prover.prove(leaves, value).await
    }

    async fn verify(
        &self,
        leaves: &[String],
        proof: &ProofArtifact,
    ) -> Result<VerificationOutput, VerifyError> {
        self.prover.verify(leaves, proof).await
    }
}

#[async_trait]
impl SubmissionEffects for MockEffects {
    async fn submit(&self, submission: &ProofSubmission) -> Result<SubmissionAck, SubmitError> {
        self.submitter.submit(submission).await
    }
}

impl SigningEffects for MockEffects {
    fn wallet_address(&self) -> String {
        self.signer.wallet_address()
    }

    fn sign(&self, message: &str) -> Result<String, SigningError> {
        self.signer.sign(message)
    }
}

impl TimeEffects for MockEffects {
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}

impl RandomEffects for MockEffects {
    fn random_index(&self, upper: usize) -> usize {
        self.random.random_index(upper)
    }
}
