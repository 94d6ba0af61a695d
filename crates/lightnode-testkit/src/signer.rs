//! Deterministic signer

use std::sync::atomic::{AtomicBool, Ordering};

use sha2::{Digest, Sha256};

use lightnode_core::effects::SigningEffects;
use lightnode_core::SigningError;

/// Address used by [`MockSigner::default`]
pub const MOCK_WALLET_ADDRESS: &str = "0x00000000000000000000000000000000000000A1";

/// Signer whose signature is a plain hash of address and message
#[derive(Debug)]
pub struct MockSigner {
    address: String,
    failing: AtomicBool,
}

impl Default for MockSigner {
    fn default() -> Self {
        Self::new(MOCK_WALLET_ADDRESS)
    }
}

impl MockSigner {
    /// Create a signer for `address`
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every `sign` call fail
    pub fn fail_signing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Signature `sign` produces for `message`
    pub fn expected_signature(&self, message: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.address.as_bytes());
        hasher.update(message.as_bytes());
        format!("0x{}", hex::encode(hasher.finalize()))
    }
}

impl SigningEffects for MockSigner {
    fn wallet_address(&self) -> String {
        self.address.clone()
    }

    fn sign(&self, message: &str) -> Result<String, SigningError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SigningError::Signature {
                message: "mock signer configured to fail".to_string(),
            });
        }
        Ok(self.expected_signature(message))
    }
}
