//! Recording submission sink

use async_trait::async_trait;
use parking_lot::Mutex;

use lightnode_core::effects::SubmissionEffects;
use lightnode_core::{ProofSubmission, SubmissionAck, SubmitError};

#[derive(Debug)]
struct SubmitterState {
    response: Result<SubmissionAck, SubmitError>,
    submissions: Vec<ProofSubmission>,
}

/// Submission double that records every payload it receives
#[derive(Debug)]
pub struct MockSubmitter {
    state: Mutex<SubmitterState>,
}

impl Default for MockSubmitter {
    fn default() -> Self {
        Self {
            state: Mutex::new(SubmitterState {
                response: Ok(SubmissionAck::accepted()),
                submissions: Vec::new(),
            }),
        }
    }
}

impl MockSubmitter {
    /// Create a submitter that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every submission with `ack`
    pub fn respond_with(&self, ack: SubmissionAck) {
        self.state.lock().response = Ok(ack);
    }

    /// Fail every submission with `error`
    pub fn fail_with(&self, error: SubmitError) {
        self.state.lock().response = Err(error);
    }

    /// Payloads received so far, including rejected ones
    pub fn submissions(&self) -> Vec<ProofSubmission> {
        self.state.lock().submissions.clone()
    }
}

#[async_trait]
impl SubmissionEffects for MockSubmitter {
    async fn submit(&self, submission: &ProofSubmission) -> Result<SubmissionAck, SubmitError> {
        let mut state = self.state.lock();
        state.submissions.push(submission.clone());
        state.response.clone()
    }
}
