//! Wallet signing effects

use crate::errors::SigningError;

/// Authentication of submissions with the node's wallet key
pub trait SigningEffects: Send + Sync {
    /// Address that identifies the submitting wallet
    fn wallet_address(&self) -> String;

    /// Sign an arbitrary message, returning the encoded signature
    fn sign(&self, message: &str) -> Result<String, SigningError>;
}
