//! Domain types shared across the light node
//!
//! Snapshots and proof artifacts are transient, cycle-scoped values. The only
//! long-lived value is [`TreeState`], which is owned by the tree state store
//! and handed out to callers as a copy.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// =============================================================================
// Tree Identity and Snapshots
// =============================================================================

/// Opaque identifier of a remotely hosted Merkle tree
///
/// Supplied by the data source and stable across cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeId(String);

impl TreeId {
    /// Create a tree identifier from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TreeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TreeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Current contents of one tree as returned by the data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    /// Root digest, compared by equality only
    pub root: String,

    /// Leaf values in tree order
    #[serde(default)]
    pub leaves: Vec<String>,

    /// Free-form metadata attached to the tree by its publisher
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl TreeSnapshot {
    /// Build a snapshot from a root and its leaves
    pub fn new(root: impl Into<String>, leaves: Vec<String>) -> Self {
        Self {
            root: root.into(),
            leaves,
            metadata: None,
        }
    }
}

// =============================================================================
// Observation State
// =============================================================================

/// Observed state of one tree across cycles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeState {
    /// Most recently observed (or verified) root digest
    pub last_root: String,

    /// Wall-clock deadline in milliseconds before which the tree is not probed
    pub sleep_until_ms: Option<u64>,

    /// Number of consecutive observations that repeated `last_root`
    pub consecutive_same_count: u32,
}

impl TreeState {
    /// State for a tree seen for the first time
    pub fn first_seen(root: impl Into<String>) -> Self {
        Self {
            last_root: root.into(),
            sleep_until_ms: None,
            consecutive_same_count: 0,
        }
    }

    /// Whether the tree is still inside its cooldown window at `now_ms`
    ///
    /// An expired deadline is never actively cleared; it simply stops matching.
    pub fn is_asleep(&self, now_ms: u64) -> bool {
        matches!(self.sleep_until_ms, Some(until) if now_ms < until)
    }

    /// Whether a deadline was set at some point and has since passed
    pub fn has_woken(&self, now_ms: u64) -> bool {
        matches!(self.sleep_until_ms, Some(until) if now_ms >= until)
    }
}

// =============================================================================
// Proof Artifacts
// =============================================================================

/// One step of a Merkle inclusion path
///
/// Encoded on the wire as a two-element array `[sibling_digest, is_left]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, bool)", into = "(String, bool)")]
pub struct ProofStep {
    /// Digest of the sibling node
    pub sibling: String,
    /// Whether the sibling sits on the left
    pub is_left: bool,
}

impl From<(String, bool)> for ProofStep {
    fn from((sibling, is_left): (String, bool)) -> Self {
        Self { sibling, is_left }
    }
}

impl From<ProofStep> for (String, bool) {
    fn from(step: ProofStep) -> Self {
        (step.sibling, step.is_left)
    }
}

/// Proof produced by the external prover for one sampled leaf
///
/// Its internal correctness is never checked here; it is only forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofArtifact {
    /// The sampled leaf value
    pub leaf_value: String,
    /// Sibling path from the leaf to the root
    #[serde(default)]
    pub proof_path: Vec<ProofStep>,
}

impl ProofArtifact {
    /// Lowercase hex SHA-256 over the canonical JSON encoding of the proof
    pub fn digest(&self) -> String {
        let path: Vec<serde_json::Value> = self
            .proof_path
            .iter()
            .map(|step| serde_json::json!([step.sibling, step.is_left]))
            .collect();
        let canonical = serde_json::json!({
            "leaf_value": self.leaf_value,
            "proof_path": path,
        })
        .to_string();

        hex::encode(Sha256::digest(canonical.as_bytes()))
    }
}

/// Raw answer from the prover's verification endpoint
///
/// Fields stay optional so the pipeline can tell an incomplete answer apart
/// from a transport failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutput {
    /// Root recomputed by the prover
    #[serde(default)]
    pub root: Option<String>,
    /// Opaque verification receipt
    #[serde(default)]
    pub receipt: Option<String>,
    /// Explicit verdict when the prover reports one
    #[serde(default)]
    pub verified: Option<bool>,
}

/// Outcome of a proof that was generated, verified and accepted downstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedResult {
    /// Tree the proof was generated against
    pub tree_id: TreeId,
    /// Receipt returned by the verifier
    pub receipt: String,
    /// Root confirmed by verification
    pub new_root: String,
    /// Hash of the submitted proof
    pub proof_hash: String,
}

// =============================================================================
// Submission
// =============================================================================

/// Payload handed to the submission collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSubmission {
    /// Address of the submitting wallet
    pub wallet_address: String,
    /// Signature over the proof hash
    #[serde(rename = "sign")]
    pub signature: String,
    /// The verified proof
    pub proof: ProofArtifact,
    /// Hash of `proof`, see [`ProofArtifact::digest`]
    pub proof_hash: String,
    /// Receipt returned by the verifier
    pub receipt: String,
    /// Tree the proof belongs to
    pub tree_id: TreeId,
}

/// Downstream acknowledgement of a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionAck {
    /// Whether the ledger accepted the submission
    #[serde(default = "accepted_by_default")]
    pub accepted: bool,
    /// Optional human-readable detail
    #[serde(default)]
    pub message: Option<String>,
}

fn accepted_by_default() -> bool {
    true
}

impl SubmissionAck {
    /// Plain acceptance without detail
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            message: None,
        }
    }
}
