//! Cycle scheduler
//!
//! One cycle walks the tree identifiers in the order the data source lists
//! them and stops at the first tree that verifies. Per-tree failures are
//! logged and forfeit that tree for the cycle; only a failure to list the
//! trees at all is reported as a [`CycleError`].
//!
//! The walk is an explicit state machine:
//!
//! ```text
//! SelectNextTree -> FetchSnapshot -> EvaluateSleep -> Skip ------------> SelectNextTree
//!                                                  \-> SampleAndVerify -> Skip | Stop
//! ```

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use lightnode_core::effects::LightNodeEffects;
use lightnode_core::{QueryError, TreeId, TreeSnapshot, VerifiedResult};

use crate::pipeline::{PipelineFailure, VerificationPipeline};
use crate::policy::{PolicyDecision, SleepPolicy};
use crate::sampler::{SampleError, SampleSelector};
use crate::store::{Observation, TreeStateStore};

// =============================================================================
// Outcomes
// =============================================================================

/// Terminal outcome of one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A tree was verified and its proof accepted downstream
    Verified(VerifiedResult),
    /// The data source listed no trees
    NoTreesAvailable,
    /// Every listed tree was skipped or failed
    NoActiveTreeFound,
}

impl CycleOutcome {
    /// Short label used in structured logs
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleOutcome::Verified(_) => "verified",
            CycleOutcome::NoTreesAvailable => "no_trees_available",
            CycleOutcome::NoActiveTreeFound => "no_active_tree_found",
        }
    }

    /// The verified result, if the cycle succeeded
    pub fn verified(&self) -> Option<&VerifiedResult> {
        match self {
            CycleOutcome::Verified(result) => Some(result),
            _ => None,
        }
    }
}

/// What the scheduler did with one tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeAction {
    /// The tree was asleep; no network call and no state change
    SkippedAsleep {
        /// Deadline the tree sleeps until
        until_ms: u64,
    },
    /// The snapshot could not be fetched
    FetchFailed(QueryError),
    /// The observation put the tree to sleep; sampling skipped
    SleepEntered {
        /// Deadline the tree sleeps until
        until_ms: u64,
    },
    /// The tree has no leaves to sample
    EmptyLeaves,
    /// The pipeline stopped at some stage
    PipelineFailed(PipelineFailure),
    /// The tree verified; the cycle stops here
    Verified,
}

impl TreeAction {
    /// Short label used in structured logs
    pub fn as_str(&self) -> &'static str {
        match self {
            TreeAction::SkippedAsleep { .. } => "skip_asleep",
            TreeAction::FetchFailed(_) => "fetch_failed",
            TreeAction::SleepEntered { .. } => "sleep_entered",
            TreeAction::EmptyLeaves => "empty_leaves",
            TreeAction::PipelineFailed(_) => "pipeline_failed",
            TreeAction::Verified => "verified",
        }
    }
}

/// One evaluated tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEvaluation {
    /// Tree that was evaluated
    pub tree_id: TreeId,
    /// What happened to it
    pub action: TreeAction,
}

/// Everything one cycle did, in evaluation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Terminal outcome
    pub outcome: CycleOutcome,
    /// Trees the cycle reached, in listing order
    pub evaluations: Vec<TreeEvaluation>,
}

impl CycleReport {
    /// Whether a tree was verified
    pub fn is_verified(&self) -> bool {
        matches!(self.outcome, CycleOutcome::Verified(_))
    }

    /// Action taken for `tree_id`, if the cycle reached it
    pub fn action_for(&self, tree_id: &TreeId) -> Option<&TreeAction> {
        self.evaluations
            .iter()
            .find(|evaluation| &evaluation.tree_id == tree_id)
            .map(|evaluation| &evaluation.action)
    }
}

/// Failure to run a cycle at all
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CycleError {
    /// The data source could not list trees
    #[error("failed to list trees: {0}")]
    TreeListing(#[source] QueryError),
}

// =============================================================================
// State Machine
// =============================================================================

enum Step {
    SelectNextTree,
    FetchSnapshot(TreeId),
    EvaluateSleep(TreeId, TreeSnapshot),
    SampleAndVerify(TreeId, TreeSnapshot),
    Skip(TreeId, TreeAction),
    Stop(TreeId, VerifiedResult),
}

/// Drives one cycle at a time over the injected collaborators
pub struct CycleScheduler<E> {
    effects: Arc<E>,
    store: Arc<TreeStateStore>,
    policy: SleepPolicy,
    selector: SampleSelector,
    pipeline: VerificationPipeline<E>,
}

impl<E: LightNodeEffects> CycleScheduler<E> {
    /// Create a scheduler with a fresh state store
    pub fn new(effects: Arc<E>, policy: SleepPolicy) -> Self {
        Self::with_store(effects, Arc::new(TreeStateStore::new()), policy)
    }

    /// Create a scheduler sharing an existing state store
    pub fn with_store(effects: Arc<E>, store: Arc<TreeStateStore>, policy: SleepPolicy) -> Self {
        Self {
            pipeline: VerificationPipeline::new(Arc::clone(&effects)),
            effects,
            store,
            policy,
            selector: SampleSelector,
        }
    }

    /// Shared state store
    pub fn store(&self) -> &Arc<TreeStateStore> {
        &self.store
    }

    /// Injected collaborators
    pub fn effects(&self) -> &Arc<E> {
        &self.effects
    }

    /// Sleep policy in use
    pub fn policy(&self) -> &SleepPolicy {
        &self.policy
    }

    /// Run one cycle
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        let tree_ids = self
            .effects
            .list_tree_ids()
            .await
            .map_err(CycleError::TreeListing)?;

        if tree_ids.is_empty() {
            info!(outcome = "no_trees_available", "cycle finished");
            return Ok(CycleReport {
                outcome: CycleOutcome::NoTreesAvailable,
                evaluations: Vec::new(),
            });
        }
        debug!(trees = tree_ids.len(), "cycle started");

        let mut pending = tree_ids.into_iter();
        let mut evaluations = Vec::new();
        let mut step = Step::SelectNextTree;

        loop {
            step = match step {
                Step::SelectNextTree => match pending.next() {
                    Some(tree_id) => Step::FetchSnapshot(tree_id),
                    None => break,
                },
                Step::FetchSnapshot(tree_id) => {
                    let now_ms = self.effects.now_ms();
                    match self.store.get(&tree_id) {
                        Some(state) if state.is_asleep(now_ms) => {
                            let until_ms = state.sleep_until_ms.unwrap_or(now_ms);
                            Step::Skip(tree_id, TreeAction::SkippedAsleep { until_ms })
                        }
                        _ => match self.effects.get_tree(&tree_id).await {
                            Ok(snapshot) => Step::EvaluateSleep(tree_id, snapshot),
                            Err(err) => Step::Skip(tree_id, TreeAction::FetchFailed(err)),
                        },
                    }
                }
                Step::EvaluateSleep(tree_id, snapshot) => self.evaluate_sleep(tree_id, snapshot),
                Step::SampleAndVerify(tree_id, snapshot) => {
                    self.sample_and_verify(tree_id, snapshot).await
                }
                Step::Skip(tree_id, action) => {
                    log_skip(&tree_id, &action);
                    evaluations.push(TreeEvaluation { tree_id, action });
                    Step::SelectNextTree
                }
                Step::Stop(tree_id, result) => {
                    info!(
                        tree_id = %tree_id,
                        action = "verified",
                        receipt = %result.receipt,
                        root = %result.new_root,
                        "cycle finished"
                    );
                    evaluations.push(TreeEvaluation {
                        tree_id,
                        action: TreeAction::Verified,
                    });
                    return Ok(CycleReport {
                        outcome: CycleOutcome::Verified(result),
                        evaluations,
                    });
                }
            };
        }

        info!(
            outcome = "no_active_tree_found",
            evaluated = evaluations.len(),
            "cycle finished"
        );
        Ok(CycleReport {
            outcome: CycleOutcome::NoActiveTreeFound,
            evaluations,
        })
    }

    fn evaluate_sleep(&self, tree_id: TreeId, snapshot: TreeSnapshot) -> Step {
        let now_ms = self.effects.now_ms();
        match self
            .store
            .upsert_on_observation(&tree_id, &snapshot.root, now_ms, &self.policy)
        {
            // Another caller put the tree to sleep between the check and the write.
            Observation::Asleep { state } => {
                let until_ms = state.sleep_until_ms.unwrap_or(now_ms);
                Step::Skip(tree_id, TreeAction::SkippedAsleep { until_ms })
            }
            Observation::Applied {
                decision: PolicyDecision::SleepEntered { until_ms },
                ..
            } => Step::Skip(tree_id, TreeAction::SleepEntered { until_ms }),
            Observation::Applied { decision, state } => {
                debug!(
                    tree_id = %tree_id,
                    decision = decision.as_str(),
                    count = state.consecutive_same_count,
                    "observation recorded"
                );
                Step::SampleAndVerify(tree_id, snapshot)
            }
        }
    }

    async fn sample_and_verify(&self, tree_id: TreeId, snapshot: TreeSnapshot) -> Step {
        let sample = match self.selector.select(self.effects.as_ref(), &snapshot.leaves) {
            Ok(sample) => sample.to_string(),
            Err(SampleError::EmptyLeafSet) => return Step::Skip(tree_id, TreeAction::EmptyLeaves),
        };

        match self.pipeline.run(&tree_id, &snapshot, &sample).await {
            Ok(result) => {
                let reconciliation = self
                    .store
                    .reset_on_verified_root(&tree_id, &result.new_root);
                debug!(tree_id = %tree_id, reconciliation = ?reconciliation, "verified root recorded");
                Step::Stop(tree_id, result)
            }
            Err(failure) => Step::Skip(tree_id, TreeAction::PipelineFailed(failure)),
        }
    }
}

fn log_skip(tree_id: &TreeId, action: &TreeAction) {
    match action {
        TreeAction::SkippedAsleep { until_ms } | TreeAction::SleepEntered { until_ms } => {
            info!(tree_id = %tree_id, action = action.as_str(), until_ms, "tree skipped");
        }
        TreeAction::FetchFailed(err) => {
            warn!(tree_id = %tree_id, action = action.as_str(), reason = %err, "tree skipped");
        }
        TreeAction::EmptyLeaves => {
            info!(tree_id = %tree_id, action = action.as_str(), "tree skipped");
        }
        TreeAction::PipelineFailed(failure) => {
            warn!(
                tree_id = %tree_id,
                action = action.as_str(),
                stage = failure.stage().as_str(),
                verified = failure.was_verified(),
                reason = %failure,
                "tree skipped"
            );
        }
        TreeAction::Verified => {}
    }
}
