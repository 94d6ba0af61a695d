//! Light Node Sync: adaptive multi-tree sampling and verification
//!
//! Periodically walks the trees published by a data source, samples one leaf
//! of an active tree, has it proven and verified by an external prover and
//! submits the verified proof downstream.
//!
//! # Architecture
//!
//! - [`store`]: the only owner of per-tree observation state
//! - [`policy`]: pure unchanged-root sleep policy
//! - [`sampler`]: uniform single-leaf selection
//! - [`pipeline`]: prove, verify, sign and submit for one sample
//! - [`scheduler`]: one cycle as an explicit state machine
//! - [`service`]: periodic driver with cooperative shutdown
//!
//! All collaborators are injected through the effect traits in
//! `lightnode_core::effects`; nothing here talks to the network directly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lightnode_sync::{CycleScheduler, SleepPolicy};
//!
//! let scheduler = CycleScheduler::new(Arc::new(effects), SleepPolicy::default());
//! let report = scheduler.run_cycle().await?;
//! ```

#![forbid(unsafe_code)]

pub mod pipeline;
pub mod policy;
pub mod sampler;
pub mod scheduler;
pub mod service;
pub mod store;

pub use pipeline::{PipelineFailure, PipelineStage, VerificationPipeline};
pub use policy::{PolicyDecision, SleepPolicy, SleepPolicyConfig, Transition};
pub use sampler::{SampleError, SampleSelector};
pub use scheduler::{
    CycleError, CycleOutcome, CycleReport, CycleScheduler, TreeAction, TreeEvaluation,
};
pub use service::{
    HealthStatus, LightNodeService, ServiceError, ServiceState, ServiceStatistics,
};
pub use store::{Observation, Reconciliation, TreeStateStore};
