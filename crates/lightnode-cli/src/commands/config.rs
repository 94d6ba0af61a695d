//! Effective configuration

use anyhow::Result;
use tracing::warn;

use lightnode_core::LightNodeConfig;

/// Print the configuration as TOML, warning when it would not validate
pub fn show(config: &LightNodeConfig) -> Result<()> {
    let mut checked = config.clone();
    if let Err(err) = checked.validate() {
        warn!(error = %err, "configuration is incomplete");
    }
    print!("{}", checked.to_redacted_toml()?);
    Ok(())
}
