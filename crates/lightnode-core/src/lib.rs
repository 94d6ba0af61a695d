//! Light Node Core: types and collaborator interfaces
//!
//! Foundation crate for the light node. It defines the vocabulary shared by the
//! scheduler (`lightnode-sync`), the production handlers (`lightnode-effects`)
//! and the test doubles (`lightnode-testkit`):
//!
//! - **Types**: tree identifiers, tree snapshots, per-tree observation state,
//!   proof artifacts and verified results
//! - **Errors**: one error enum per collaborator boundary
//! - **Effects**: async traits for the data source, prover, submission and
//!   signing collaborators, plus synchronous clock and randomness traits
//! - **Config**: the TOML configuration with environment overrides
//!
//! Nothing in this crate performs I/O on its own except configuration file
//! loading; all network access lives behind the effect traits.

#![forbid(unsafe_code)]

pub mod config;
pub mod effects;
pub mod errors;
pub mod types;

pub use config::{
    ApiConfig, ChainConfig, LightNodeConfig, ProverConfig, SchedulerSettings, SubmissionConfig,
    WalletConfig,
};
pub use errors::{ConfigError, ProveError, QueryError, SigningError, SubmitError, VerifyError};
pub use types::{
    ProofArtifact, ProofStep, ProofSubmission, SubmissionAck, TreeId, TreeSnapshot, TreeState,
    VerificationOutput, VerifiedResult,
};
