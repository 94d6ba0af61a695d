//! Downstream submission effects

use async_trait::async_trait;

use crate::errors::SubmitError;
use crate::types::{ProofSubmission, SubmissionAck};

/// Submission of verified proofs to the downstream ledger
#[async_trait]
pub trait SubmissionEffects: Send + Sync {
    /// Submit one verified proof
    async fn submit(&self, submission: &ProofSubmission) -> Result<SubmissionAck, SubmitError>;
}
