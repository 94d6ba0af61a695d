//! Collaborator effect trait definitions
//!
//! Pure trait definitions for every side effect the light node performs.
//! This module defines **what** can be done; handlers define **how**:
//!
//! - **Network collaborators** (async): [`TreeSourceEffects`], [`ProverEffects`],
//!   [`SubmissionEffects`]. Production handlers live in `lightnode-effects`.
//! - **Local collaborators**: [`SigningEffects`], [`TimeEffects`], [`RandomEffects`].
//!   These are synchronous and never block on I/O.
//!
//! Mock handlers for all of them belong in `lightnode-testkit`. Every network
//! handler must carry its own bounded timeout; the scheduler never waits on
//! an unbounded call.

pub mod prover;
pub mod random;
pub mod signing;
pub mod submission;
pub mod supertraits;
pub mod time;
pub mod tree_source;

pub use prover::ProverEffects;
pub use random::RandomEffects;
pub use signing::SigningEffects;
pub use submission::SubmissionEffects;
pub use supertraits::LightNodeEffects;
pub use time::TimeEffects;
pub use tree_source::TreeSourceEffects;
