//! Light Node Testkit: deterministic doubles for every effect trait
//!
//! Each mock is independently scriptable and records the calls it receives.
//! [`MockEffects`] bundles one of each so a scheduler can be driven entirely
//! in memory:
//!
//! ```rust,ignore
//! let effects = MockEffects::new();
//! effects.trees.insert("t1", TreeSnapshot::new("r0", leaves));
//! effects.clock.advance_ms(300_000);
//! ```
//!
//! # Blocking Lock Usage
//!
//! Uses `parking_lot::Mutex` for scripted behaviour and call logs because
//! every access is a short clone or push and no lock is held across `.await`.

#![forbid(unsafe_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

pub mod clock;
pub mod effects;
pub mod prover;
pub mod random;
pub mod signer;
pub mod submitter;
pub mod tree_source;

pub use clock::ManualClock;
pub use effects::MockEffects;
pub use prover::{MockProver, ProveBehavior, VerifyBehavior};
pub use random::SeededRandom;
pub use signer::MockSigner;
pub use submitter::MockSubmitter;
pub use tree_source::MockTreeSource;
