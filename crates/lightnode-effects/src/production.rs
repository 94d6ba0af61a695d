//! Production handler bundle

use async_trait::async_trait;
use tracing::info;

use lightnode_core::effects::{
    ProverEffects, RandomEffects, SigningEffects, SubmissionEffects, TimeEffects,
    TreeSourceEffects,
};
use lightnode_core::{
    LightNodeConfig, ProofArtifact, ProofSubmission, ProveError, QueryError, SigningError,
    SubmissionAck, SubmitError, TreeId, TreeSnapshot, VerificationOutput, VerifyError,
};

use crate::errors::HandlerError;
use crate::http::build_client;
use crate::{CosmWasmTreeSource, HttpProver, HttpSubmitter, OsRandom, SystemClock, WalletSigner};

/// Every production handler, built from one configuration
#[derive(Debug, Clone)]
pub struct ProductionEffects {
    /// Merkle tree contract
    pub tree_source: CosmWasmTreeSource,
    /// Prover service
    pub prover: HttpProver,
    /// Submission endpoint
    pub submitter: HttpSubmitter,
    /// Wallet key
    pub wallet: WalletSigner,
    /// Wall clock
    pub clock: SystemClock,
    /// Sampling randomness
    pub random: OsRandom,
}

impl ProductionEffects {
    /// Build handlers sharing one HTTP client
    pub fn from_config(config: &LightNodeConfig) -> Result<Self, HandlerError> {
        let wallet = WalletSigner::from_hex(&config.wallet.private_key)?;
        let client = build_client(&config.api)?;

        let effects = Self {
            tree_source: CosmWasmTreeSource::new(client.clone(), &config.chain),
            prover: HttpProver::new(client.clone(), &config.prover),
            submitter: HttpSubmitter::new(client, &config.submission),
            wallet,
            clock: SystemClock,
            random: OsRandom,
        };
        info!(
            lcd = %config.chain.lcd_url,
            contract = %config.chain.contract_address,
            prover = %effects.prover.endpoint(),
            submission = %effects.submitter.endpoint(),
            timeout_s = config.api.timeout().as_secs(),
            "production handlers ready"
        );
        Ok(effects)
    }
}

#[async_trait]
impl TreeSourceEffects for ProductionEffects {
    async fn list_tree_ids(&self) -> Result<Vec<TreeId>, QueryError> {
        self.tree_source.list_tree_ids().await
    }

    async fn get_tree(&self, tree_id: &TreeId) -> Result<TreeSnapshot, QueryError> {
        self.tree_source.get_tree(tree_id).await
    }
}

#[async_trait]
impl ProverEffects for ProductionEffects {
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
impl SubmissionEffects for ProductionEffects {
    async fn submit(&self, submission: &ProofSubmission) -> Result<SubmissionAck, SubmitError> {
        self.submitter.submit(submission).await
    }
}

impl SigningEffects for ProductionEffects {
    fn wallet_address(&self) -> String {
        self.wallet.wallet_address()
    }

    fn sign(&self, message: &str) -> Result<String, SigningError> {
        self.wallet.sign(message)
    }
}

impl TimeEffects for ProductionEffects {
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}

impl RandomEffects for ProductionEffects {
    fn random_index(&self, upper: usize) -> usize {
        self.random.random_index(upper)
    }
}
