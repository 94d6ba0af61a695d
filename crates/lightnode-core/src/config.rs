//! Light node configuration
//!
//! Configuration is layered: defaults, then an optional TOML file, then
//! environment overrides, then validation. A missing file is not an error.
//!
//! ```toml
//! [chain]
//! lcd_url = "http://127.0.0.1:1317"
//! contract_address = "cosmos1..."
//!
//! [prover]
//! url = "http://127.0.0.1:3001"
//!
//! [scheduler]
//! unchanged_threshold = 3
//! cooldown_seconds = 300
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Downstream call timeout used when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 100;

// =============================================================================
// Sections
// =============================================================================

/// Ledger hosting the Merkle tree contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Base URL of the Cosmos LCD REST gateway
    pub lcd_url: String,
    /// Address of the Merkle tree contract
    pub contract_address: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            lcd_url: "http://127.0.0.1:1317".to_string(),
            contract_address: String::new(),
        }
    }
}

/// Zero-knowledge prover service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverConfig {
    /// Base URL of the prover; requests go to `{url}/process`
    pub url: String,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3001".to_string(),
        }
    }
}

/// Downstream submission endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Base URL of the submission API
    pub url: String,
    /// Path appended to `url` for proof submissions
    pub path: String,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080".to_string(),
            path: "/api/proof-submission".to_string(),
        }
    }
}

/// Shared settings for outbound HTTP calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Per-request timeout in seconds; 0 falls back to the default
    pub timeout_seconds: u64,
    /// Optional bearer token sent to the prover and submission endpoints
    pub auth_token: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            auth_token: String::new(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Scheduler cadence and sleep policy parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Delay between the start of two cycles
    pub cycle_interval_seconds: u64,
    /// Identical consecutive observations before a tree is put to sleep
    pub unchanged_threshold: u32,
    /// Length of the sleep window
    pub cooldown_seconds: u64,
    /// Reset the unchanged counter when a tree wakes, even if its root did not change
    pub reset_count_on_wake: bool,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            cycle_interval_seconds: 5,
            unchanged_threshold: 3,
            cooldown_seconds: 300, // 5 minutes
            reset_count_on_wake: false,
        }
    }
}

impl SchedulerSettings {
    /// Cycle interval as a duration
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_seconds)
    }

    /// Cooldown as a duration
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }
}

/// Wallet used to authenticate submissions
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Hex-encoded secp256k1 private key, with or without `0x`
    pub private_key: String,
}

impl std::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConfig")
            .field("private_key", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Root Configuration
// =============================================================================

/// Complete light node configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightNodeConfig {
    /// Tree data source
    pub chain: ChainConfig,
    /// Prover service
    pub prover: ProverConfig,
    /// Submission endpoint
    pub submission: SubmissionConfig,
    /// Outbound HTTP settings
    pub api: ApiConfig,
    /// Scheduler settings
    pub scheduler: SchedulerSettings,
    /// Wallet key
    pub wallet: WalletConfig,
}

impl LightNodeConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load from `path` when it exists, apply environment overrides and validate
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        self.merge_with_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn merge_with_lookup<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("LCD_URL") {
            self.chain.lcd_url = value;
        }
        if let Some(value) = lookup("CONTRACT_ADDR") {
            self.chain.contract_address = value;
        }
        if let Some(value) = lookup("ZK_PROVER_URL") {
            self.prover.url = value;
        }
        if let Some(value) = lookup("SUBMISSION_URL") {
            self.submission.url = value;
        }
        if let Some(value) = lookup("API_AUTH_TOKEN") {
            self.api.auth_token = value;
        }
        if let Some(value) = lookup("PRIVATE_KEY") {
            self.wallet.private_key = value;
        }
        if let Some(value) = lookup("API_REQUEST_TIMEOUT") {
            self.api.timeout_seconds = parse_env("API_REQUEST_TIMEOUT", &value)?;
        }
        if let Some(value) = lookup("CYCLE_INTERVAL") {
            self.scheduler.cycle_interval_seconds = parse_env("CYCLE_INTERVAL", &value)?;
        }
        Ok(())
    }

    /// Check required fields and ranges
    ///
    /// A zero timeout is replaced by [`DEFAULT_TIMEOUT_SECS`] rather than rejected.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        require_non_empty("chain.lcd_url", &self.chain.lcd_url)?;
        require_non_empty("chain.contract_address", &self.chain.contract_address)?;
        require_non_empty("prover.url", &self.prover.url)?;
        require_non_empty("submission.url", &self.submission.url)?;

        if self.api.timeout_seconds == 0 {
            self.api.timeout_seconds = DEFAULT_TIMEOUT_SECS;
        }
        if self.scheduler.unchanged_threshold == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.unchanged_threshold must be at least 1".to_string(),
            ));
        }
        if self.scheduler.cooldown_seconds == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.cooldown_seconds must be positive".to_string(),
            ));
        }
        if self.scheduler.cycle_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.cycle_interval_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Render as TOML with the private key redacted
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut redacted = self.clone();
        if !redacted.wallet.private_key.is_empty() {
            redacted.wallet.private_key = "<redacted>".to_string();
        }
        Ok(toml::to_string_pretty(&redacted)?)
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} is required")));
    }
    Ok(())
}

fn parse_env(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
    })
}
