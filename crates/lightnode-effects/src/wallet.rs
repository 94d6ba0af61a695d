//! Wallet signer
//!
//! A secp256k1 key that signs submissions the way Ethereum wallets sign
//! free-form messages (EIP-191 `personal_sign`):
//!
//! ```text
//! keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)
//! ```
//!
//! Signatures are 65 bytes `r || s || v` with `v = recovery_id + 27`,
//! hex-encoded with a `0x` prefix. The wallet address is the EIP-55
//! checksummed Ethereum address of the key.

use alloy_primitives::{keccak256, Address, B256};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;

use lightnode_core::effects::SigningEffects;
use lightnode_core::SigningError;

/// Hash of `message` under the personal-sign prefix
pub fn personal_message_hash(message: &str) -> B256 {
    let prefixed = format!("\x19Ethereum Signed Message:\n{}{}", message.len(), message);
    keccak256(prefixed.as_bytes())
}

fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    // Uncompressed SEC1 points start with the 0x04 tag byte.
    Address::from_raw_public_key(&point.as_bytes()[1..])
}

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Recover the address that produced `signature` over `message`
pub fn recover_address(message: &str, signature: &str) -> Result<Address, SigningError> {
    let bytes = hex::decode(strip_hex_prefix(signature)).map_err(|e| SigningError::Signature {
        message: format!("signature is not hex: {e}"),
    })?;
    if bytes.len() != 65 {
        return Err(SigningError::Signature {
            message: format!("expected 65 signature bytes, got {}", bytes.len()),
        });
    }

    let v = bytes[64];
    let recovery_byte = if v >= 27 { v - 27 } else { v };
    let recovery_id = RecoveryId::from_byte(recovery_byte).ok_or_else(|| SigningError::Signature {
        message: format!("invalid recovery id {v}"),
    })?;
    let signature = Signature::from_slice(&bytes[..64]).map_err(|e| SigningError::Signature {
        message: e.to_string(),
    })?;

    let hash = personal_message_hash(message);
    let key = VerifyingKey::recover_from_prehash(hash.as_slice(), &signature, recovery_id)
        .map_err(|e| SigningError::Signature {
            message: e.to_string(),
        })?;
    Ok(address_of(&key))
}

/// Wallet key used to authenticate submissions
#[derive(Clone)]
pub struct WalletSigner {
    key: SigningKey,
    address: Address,
}

impl std::fmt::Debug for WalletSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl WalletSigner {
    /// Load a key from 32 hex-encoded bytes, with or without `0x`
    pub fn from_hex(private_key: &str) -> Result<Self, SigningError> {
        let trimmed = strip_hex_prefix(private_key.trim());
        if trimmed.is_empty() {
            return Err(SigningError::InvalidKey {
                message: "no private key configured".to_string(),
            });
        }
        let bytes = hex::decode(trimmed).map_err(|e| SigningError::InvalidKey {
            message: e.to_string(),
        })?;
        let key = SigningKey::from_slice(&bytes).map_err(|e| SigningError::InvalidKey {
            message: e.to_string(),
        })?;
        let address = address_of(key.verifying_key());
        Ok(Self { key, address })
    }

    /// Wallet address
    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 checksummed address string
    pub fn checksum_address(&self) -> String {
        self.address.to_checksum(None)
    }

    /// Hex-encoded compressed SEC1 public key
    pub fn compressed_public_key(&self) -> String {
        hex::encode(self.key.verifying_key().to_encoded_point(true).as_bytes())
    }

    /// Personal-sign `message`
    pub fn sign_message(&self, message: &str) -> Result<String, SigningError> {
        let hash = personal_message_hash(message);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(hash.as_slice())
            .map_err(|e| SigningError::Signature {
                message: e.to_string(),
            })?;

        let mut bytes = Vec::with_capacity(65);
        bytes.extend_from_slice(&signature.to_bytes());
        bytes.push(recovery_id.to_byte() + 27);
        Ok(format!("0x{}", hex::encode(bytes)))
    }
}

impl SigningEffects for WalletSigner {
    fn wallet_address(&self) -> String {
        self.checksum_address()
    }

    fn sign(&self, message: &str) -> Result<String, SigningError> {
        self.sign_message(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

    #[test]
    fn test_known_key_address() {
        let signer = WalletSigner::from_hex(KEY).unwrap();
        assert_eq!(signer.wallet_address(), ADDRESS);
    }

    #[test]
    fn test_known_personal_signature() {
        let signer = WalletSigner::from_hex(KEY).unwrap();
        assert_eq!(
            hex::encode(personal_message_hash("Some data")),
            "1da44b586eb0729ff70a73c326926f6ed5a25f5b056e7f47fbc6e58d86871655"
        );
        assert_eq!(
            signer.sign("Some data").unwrap(),
            "0xb91467e570a6466aa9e9876cbcd013baba02900b8979d43fe208a4a4f339f5fd\
             6007e74cd82e037b800186422fc2da167c747ef045e5d18a5f5d4300f8e1a0291c"
        );
    }

    #[test]
    fn test_signature_recovers_signer() {
        let signer = WalletSigner::from_hex(&KEY[2..]).unwrap();
        let proof_hash = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
        let signature = signer.sign(proof_hash).unwrap();

        assert_eq!(signature.len(), 2 + 130);
        assert_eq!(recover_address(proof_hash, &signature).unwrap(), signer.address());
        assert_ne!(
            recover_address("another message", &signature).unwrap(),
            signer.address()
        );
    }

    #[test]
    fn test_compressed_public_key_shape() {
        let signer = WalletSigner::from_hex(KEY).unwrap();
        let key = signer.compressed_public_key();
        assert_eq!(key.len(), 66);
        assert!(key.starts_with("02") || key.starts_with("03"));
    }

    #[test]
    fn test_invalid_keys() {
        assert!(matches!(
            WalletSigner::from_hex(""),
            Err(SigningError::InvalidKey { .. })
        ));
        assert!(matches!(
            WalletSigner::from_hex("zz"),
            Err(SigningError::InvalidKey { .. })
        ));
        assert!(matches!(
            WalletSigner::from_hex(&"00".repeat(32)),
            Err(SigningError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_recover_rejects_short_signature() {
        assert!(matches!(
            recover_address("m", "0x1234"),
            Err(SigningError::Signature { .. })
        ));
    }
}
