//! Scripted prover

use async_trait::async_trait;
use parking_lot::Mutex;

use lightnode_core::effects::ProverEffects;
use lightnode_core::{ProofArtifact, ProofStep, ProveError, VerificationOutput, VerifyError};

/// How [`MockProver::prove`] answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProveBehavior {
    /// Build a proof whose path lists every other leaf as a sibling
    Echo,
    /// Fail every request
    Fail(ProveError),
}

/// How [`MockProver::verify`] answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyBehavior {
    /// Verify with the given root and receipt
    Complete {
        /// Root reported by verification
        root: String,
        /// Receipt reported by verification
        receipt: String,
    },
    /// Return this output verbatim
    Raw(VerificationOutput),
    /// Fail every request
    Fail(VerifyError),
}

impl Default for VerifyBehavior {
    fn default() -> Self {
        VerifyBehavior::Complete {
            root: "mock-root".to_string(),
            receipt: "mock-receipt".to_string(),
        }
    }
}

#[derive(Debug)]
struct ProverState {
    prove: ProveBehavior,
    verify: VerifyBehavior,
    prove_calls: Vec<String>,
    verify_calls: usize,
}

/// Prover double with independently scripted prove and verify steps
#[derive(Debug)]
pub struct MockProver {
    state: Mutex<ProverState>,
}

impl Default for MockProver {
    fn default() -> Self {
        Self {
            state: Mutex::new(ProverState {
                prove: ProveBehavior::Echo,
                verify: VerifyBehavior::default(),
                prove_calls: Vec::new(),
                verify_calls: 0,
            }),
        }
    }
}

impl MockProver {
    /// Create a prover that echoes proofs and verifies everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the prove step
    pub fn set_prove(&self, behavior: ProveBehavior) {
        self.state.lock().prove = behavior;
    }

    /// Script the verify step
    pub fn set_verify(&self, behavior: VerifyBehavior) {
        self.state.lock().verify = behavior;
    }

    /// Sampled values passed to `prove`, in call order
    pub fn proved_values(&self) -> Vec<String> {
        self.state.lock().prove_calls.clone()
    }

    /// Number of `prove` calls
    pub fn prove_calls(&self) -> usize {
        self.state.lock().prove_calls.len()
    }

    /// Number of `verify` calls
    pub fn verify_calls(&self) -> usize {
        self.state.lock().verify_calls
    }
}

#[async_trait]
impl ProverEffects for MockProver {
    async fn prove(&self, leaves: &[String], value: &str) -> Result<ProofArtifact, ProveError> {
        let mut state = self.state.lock();
        state.prove_calls.push(value.to_string());
        match &state.prove {
            ProveBehavior::Fail(error) => Err(error.clone()),
            ProveBehavior::Echo => Ok(ProofArtifact {
                leaf_value: value.to_string(),
                proof_path: leaves
                    .iter()
                    .filter(|leaf| leaf.as_str() != value)
                    .map(|leaf| ProofStep {
                        sibling: leaf.clone(),
                        is_left: false,
                    })
                    .collect(),
            }),
        }
    }

    async fn verify(
        &self,
        _leaves: &[String],
        _proof: &ProofArtifact,
    ) -> Result<VerificationOutput, VerifyError> {
        let mut state = self.state.lock();
        state.verify_calls += 1;
        match &state.verify {
            VerifyBehavior::Complete { root, receipt } => Ok(VerificationOutput {
                root: Some(root.clone()),
                receipt: Some(receipt.clone()),
                verified: Some(true),
            }),
            VerifyBehavior::Raw(output) => Ok(output.clone()),
            VerifyBehavior::Fail(error) => Err(error.clone()),
        }
    }
}
