//! Downstream proof submission

use async_trait::async_trait;
use tracing::debug;

use lightnode_core::effects::SubmissionEffects;
use lightnode_core::{ProofSubmission, SubmissionAck, SubmissionConfig, SubmitError};

use crate::http::{execute, join_url};

/// Submission endpoint reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSubmitter {
    /// Create a submitter for the endpoint named in `config`
    pub fn new(client: reqwest::Client, config: &SubmissionConfig) -> Self {
        Self {
            client,
            endpoint: join_url(&config.url, &config.path),
        }
    }

    /// Full URL submissions are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Interpret the body of a 2xx submission response
///
/// Any success status is an acknowledgement. A JSON body may carry an explicit
/// `accepted` flag; anything else is kept as the acknowledgement message.
pub fn parse_ack(body: &str) -> SubmissionAck {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return SubmissionAck::accepted();
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| SubmissionAck {
        accepted: true,
        message: Some(trimmed.to_string()),
    })
}

#[async_trait]
impl SubmissionEffects for HttpSubmitter {
    async fn submit(&self, submission: &ProofSubmission) -> Result<SubmissionAck, SubmitError> {
        debug!(
            tree_id = %submission.tree_id,
            proof_hash = %submission.proof_hash,
            "submitting proof"
        );
        let body = execute(self.client.post(&self.endpoint).json(submission)).await?;
        Ok(parse_ack(&body))
    }
}
