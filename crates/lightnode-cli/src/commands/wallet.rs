//! Wallet inspection

use anyhow::{Context, Result};

use lightnode_core::LightNodeConfig;
use lightnode_effects::WalletSigner;

/// Print the wallet address and compressed public key
pub fn show(config: &LightNodeConfig) -> Result<()> {
    let wallet = WalletSigner::from_hex(&config.wallet.private_key)
        .context("set PRIVATE_KEY or wallet.private_key")?;
    println!("Wallet address:        {}", wallet.checksum_address());
    println!("Compressed public key: {}", wallet.compressed_public_key());
    Ok(())
}
