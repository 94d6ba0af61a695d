//! Zero-knowledge prover client
//!
//! The prover exposes a single `POST /process` endpoint. The request's
//! `operation` selects proof generation or verification; both answer with
//! the same loosely populated response shape.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use lightnode_core::effects::ProverEffects;
use lightnode_core::{ProofArtifact, ProveError, ProverConfig, VerificationOutput, VerifyError};

use crate::http::{decode, execute, join_url, HttpFailure};

/// Body of a `/process` request
#[derive(Debug, Serialize)]
pub struct ProcessRequest<'a> {
    /// `"prove"` or `"verify"`
    pub operation: &'static str,
    /// Full leaf set of the tree
    pub data: &'a [String],
    /// Leaf value to prove, for `"prove"`
    pub proof_request: Option<&'a str>,
    /// Proof to check, for `"verify"`
    pub proof: Option<&'a ProofArtifact>,
}

/// Body of a `/process` response
#[derive(Debug, Default, Deserialize)]
pub struct ProcessResponse {
    /// Root recomputed by the prover
    #[serde(default)]
    pub root: Option<String>,
    /// Generated proof
    #[serde(default)]
    pub proof: Option<ProofArtifact>,
    /// Verification verdict
    #[serde(default)]
    pub verified: Option<bool>,
    /// Verification receipt
    #[serde(default)]
    pub receipt: Option<String>,
}

impl ProcessResponse {
    /// Extract the generated proof
    pub fn into_proof(self) -> Result<ProofArtifact, ProveError> {
        self.proof
            .ok_or_else(|| ProveError::malformed("response carried no proof"))
    }

    /// Extract the verification output, rejecting an explicit negative verdict
    pub fn into_verification(self) -> Result<VerificationOutput, VerifyError> {
        if self.verified == Some(false) {
            return Err(VerifyError::Rejected);
        }
        Ok(VerificationOutput {
            root: self.root,
            receipt: self.receipt,
            verified: self.verified,
        })
    }
}

/// Prover reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpProver {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpProver {
    /// Create a prover client for the service named in `config`
    pub fn new(client: reqwest::Client, config: &ProverConfig) -> Self {
        Self {
            client,
            endpoint: join_url(&config.url, "process"),
        }
    }

    /// Full URL of the process endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn process(&self, request: &ProcessRequest<'_>) -> Result<String, HttpFailure> {
        debug!(
            operation = request.operation,
            leaves = request.data.len(),
            "prover request"
        );
        execute(self.client.post(&self.endpoint).json(request)).await
    }
}

#[async_trait]
impl ProverEffects for HttpProver {
    async fn prove(&self, leaves: &[String], value: &str) -> Result<ProofArtifact, ProveError> {
        let request = ProcessRequest {
            operation: "prove",
            data: leaves,
            proof_request: Some(value),
            proof: None,
        };
        let body = self.process(&request).await?;
        decode::<ProcessResponse>(&body)?.into_proof()
    }

    async fn verify(
        &self,
        leaves: &[String],
        proof: &ProofArtifact,
    ) -> Result<VerificationOutput, VerifyError> {
        let request = ProcessRequest {
            operation: "verify",
            data: leaves,
            proof_request: None,
            proof: Some(proof),
        };
        let body = self.process(&request).await?;
        decode::<ProcessResponse>(&body)?.into_verification()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightnode_core::ProofStep;
    use serde_json::json;

    fn leaves() -> Vec<String> {
        vec!["a".into(), "b".into()]
    }

    #[test]
    fn test_prove_request_shape() {
        let leaves = leaves();
        let request = ProcessRequest {
            operation: "prove",
            data: &leaves,
            proof_request: Some("a"),
            proof: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"operation": "prove", "data": ["a", "b"], "proof_request": "a", "proof": null})
        );
    }

    #[test]
    fn test_verify_request_encodes_path_as_pairs() {
        let leaves = leaves();
        let proof = ProofArtifact {
            leaf_value: "a".into(),
            proof_path: vec![ProofStep {
                sibling: "hb".into(),
                is_left: false,
            }],
        };
        let request = ProcessRequest {
            operation: "verify",
            data: &leaves,
            proof_request: None,
            proof: Some(&proof),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap()["proof"],
            json!({"leaf_value": "a", "proof_path": [["hb", false]]})
        );
    }

    #[test]
    fn test_prove_response_without_proof_is_malformed() {
        let response: ProcessResponse =
            serde_json::from_str(r#"{"root":"r","proof":null,"verified":null,"receipt":null}"#)
                .unwrap();
        assert!(matches!(
            response.into_proof(),
            Err(ProveError::Malformed { .. })
        ));
    }

    #[test]
    fn test_verify_response_mapping() {
        let response: ProcessResponse =
            serde_json::from_str(r#"{"root":"r0","verified":true,"receipt":"rcpt"}"#).unwrap();
        assert_eq!(
            response.into_verification().unwrap(),
            VerificationOutput {
                root: Some("r0".into()),
                receipt: Some("rcpt".into()),
                verified: Some(true),
            }
        );

        let rejected: ProcessResponse = serde_json::from_str(r#"{"verified":false}"#).unwrap();
        assert_eq!(rejected.into_verification(), Err(VerifyError::Rejected));
    }

    #[test]
    fn test_endpoint() {
        let prover = HttpProver::new(
            reqwest::Client::new(),
            &ProverConfig {
                url: "http://prover:3001/".into(),
            },
        );
        assert_eq!(prover.endpoint(), "http://prover:3001/process");
    }
}
