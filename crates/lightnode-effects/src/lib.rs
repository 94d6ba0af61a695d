//! Light Node Effects: production handlers
//!
//! Stateless handlers implementing the effect traits from
//! `lightnode_core::effects` against real collaborators:
//!
//! - [`CosmWasmTreeSource`]: Merkle tree contract queries over the Cosmos LCD gateway
//! - [`HttpProver`]: the zero-knowledge prover's `/process` endpoint
//! - [`HttpSubmitter`]: the downstream proof submission endpoint
//! - [`WalletSigner`]: secp256k1 wallet with Ethereum personal-sign signatures
//! - [`SystemClock`] and [`OsRandom`]
//!
//! [`ProductionEffects`] bundles one of each, built from a
//! [`LightNodeConfig`](lightnode_core::LightNodeConfig). All HTTP handlers share
//! one `reqwest::Client` carrying the configured timeout, so no downstream call
//! can block a cycle indefinitely.

#![forbid(unsafe_code)]

pub mod errors;
pub mod http;
pub mod production;
pub mod prover;
pub mod random;
pub mod submission;
pub mod time;
pub mod tree_source;
pub mod wallet;

pub use errors::HandlerError;
pub use http::build_client;
pub use production::ProductionEffects;
pub use prover::HttpProver;
pub use random::OsRandom;
pub use submission::HttpSubmitter;
pub use time::SystemClock;
pub use tree_source::CosmWasmTreeSource;
pub use wallet::{personal_message_hash, recover_address, WalletSigner};
