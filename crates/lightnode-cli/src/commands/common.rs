//! Shared helpers for command handlers

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use lightnode_core::LightNodeConfig;
use lightnode_effects::ProductionEffects;
use lightnode_sync::{CycleScheduler, SleepPolicy, SleepPolicyConfig};

/// Load, override from the environment and validate
pub fn load_config(path: &Path) -> Result<LightNodeConfig> {
    LightNodeConfig::load(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

/// Load and override from the environment without validating
pub fn load_config_unvalidated(path: &Path) -> Result<LightNodeConfig> {
    let mut config = if path.exists() {
        LightNodeConfig::load_from_file(path)?
    } else {
        LightNodeConfig::default()
    };
    config.merge_with_env()?;
    Ok(config)
}

/// Build production handlers and a scheduler over them
pub fn build_scheduler(config: &LightNodeConfig) -> Result<CycleScheduler<ProductionEffects>> {
    let effects =
        ProductionEffects::from_config(config).context("failed to build production handlers")?;
    info!(
        wallet = %effects.wallet.checksum_address(),
        public_key = %effects.wallet.compressed_public_key(),
        "wallet loaded"
    );

    let policy = SleepPolicy::new(SleepPolicyConfig::from(&config.scheduler));
    Ok(CycleScheduler::new(Arc::new(effects), policy))
}
