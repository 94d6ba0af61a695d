//! Per-tree observation state
//!
//! [`TreeStateStore`] is the only owner of [`TreeState`] entries. Entries are
//! created lazily on first sight and never deleted; state is volatile and is
//! forgotten on restart.
//!
//! # Blocking Lock Usage
//!
//! Uses `parking_lot::Mutex` because:
//! 1. Every operation is a single map lookup plus a small update
//! 2. The lock is never held across `.await` points
//! 3. No I/O happens inside the lock scope
//!
//! Callers always receive copies of the state, never references into the map,
//! so concurrent readers (status endpoints, future parallel workers) cannot
//! observe a half-applied update.

use std::collections::HashMap;

use parking_lot::Mutex;

use lightnode_core::{TreeId, TreeState};

use crate::policy::{PolicyDecision, SleepPolicy};

/// Result of recording an observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The tree was asleep; nothing changed
    Asleep {
        /// Unchanged state of the sleeping tree
        state: TreeState,
    },
    /// The policy was applied
    Applied {
        /// Decision taken by the policy
        decision: PolicyDecision,
        /// State after the update
        state: TreeState,
    },
}

/// How a verified root was reconciled with the stored state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The verified root matched the stored root
    Confirmed,
    /// The verified root differed; root recorded and counter reset
    RootReplaced,
    /// No state existed; one was created from the verified root
    Created,
}

/// Concurrency-safe map from tree identifier to observed state
#[derive(Debug, Default)]
pub struct TreeStateStore {
    states: Mutex<HashMap<TreeId, TreeState>>,
}

impl TreeStateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the state for `tree_id`, if the tree was ever observed
    pub fn get(&self, tree_id: &TreeId) -> Option<TreeState> {
        self.states.lock().get(tree_id).cloned()
    }

    /// Whether `tree_id` is inside its sleep window at `now_ms`
    pub fn is_asleep(&self, tree_id: &TreeId, now_ms: u64) -> bool {
        self.states
            .lock()
            .get(tree_id)
            .map(|state| state.is_asleep(now_ms))
            .unwrap_or(false)
    }

    /// Apply `policy` to a freshly observed root as one atomic read-evaluate-write
    pub fn upsert_on_observation(
        &self,
        tree_id: &TreeId,
        observed_root: &str,
        now_ms: u64,
        policy: &SleepPolicy,
    ) -> Observation {
        let mut states = self.states.lock();
        let prior = states.get(tree_id);

        match policy.evaluate(prior, observed_root, now_ms) {
            None => Observation::Asleep {
                // evaluate only declines for an existing sleeping entry
                state: prior.cloned().unwrap_or_else(|| TreeState::first_seen(observed_root)),
            },
            Some(transition) => {
                states.insert(tree_id.clone(), transition.state.clone());
                Observation::Applied {
                    decision: transition.decision,
                    state: transition.state,
                }
            }
        }
    }

    /// Put an already observed tree to sleep until `until_ms`
    ///
    /// Returns `false` when the tree has never been observed.
    pub fn mark_asleep(&self, tree_id: &TreeId, until_ms: u64) -> bool {
        match self.states.lock().get_mut(tree_id) {
            Some(state) => {
                state.sleep_until_ms = Some(until_ms);
                true
            }
            None => false,
        }
    }

    /// Reconcile the stored root with a root confirmed by verification
    ///
    /// This is separate from the raw observation path: a verified root is a
    /// stronger signal than a queried one and overrides it when they differ.
    pub fn reset_on_verified_root(&self, tree_id: &TreeId, new_root: &str) -> Reconciliation {
        let mut states = self.states.lock();
        match states.get_mut(tree_id) {
            Some(state) if state.last_root == new_root => Reconciliation::Confirmed,
            Some(state) => {
                state.last_root = new_root.to_string();
                state.consecutive_same_count = 0;
                Reconciliation::RootReplaced
            }
            None => {
                states.insert(tree_id.clone(), TreeState::first_seen(new_root));
                Reconciliation::Created
            }
        }
    }

    /// Copies of every entry, ordered by tree identifier
    pub fn snapshot(&self) -> Vec<(TreeId, TreeState)> {
        let mut entries: Vec<_> = self
            .states
            .lock()
            .iter()
            .map(|(id, state)| (id.clone(), state.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Number of tracked trees
    pub fn len(&self) -> usize {
        self.states.lock().len()
    }

    /// Whether no tree has been observed yet
    pub fn is_empty(&self) -> bool {
        self.states.lock().is_empty()
    }

    /// Number of trees asleep at `now_ms`
    pub fn sleeping_count(&self, now_ms: u64) -> usize {
        self.states
            .lock()
            .values()
            .filter(|state| state.is_asleep(now_ms))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn tree(id: &str) -> TreeId {
        TreeId::from(id)
    }

    #[test]
    fn test_lazy_creation() {
        let store = TreeStateStore::new();
        let policy = SleepPolicy::default();
        assert!(store.get(&tree("t1")).is_none());

        let obs = store.upsert_on_observation(&tree("t1"), "r0", 0, &policy);
        assert_eq!(
            obs,
            Observation::Applied {
                decision: PolicyDecision::Created,
                state: TreeState::first_seen("r0"),
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_asleep_observation_does_not_mutate() {
        let store = TreeStateStore::new();
        let policy = SleepPolicy::default();
        for now in [0, 1, 2] {
            store.upsert_on_observation(&tree("t1"), "r0", now, &policy);
        }
        let before = store.get(&tree("t1")).unwrap();
        assert!(before.is_asleep(3));

        let obs = store.upsert_on_observation(&tree("t1"), "r9", 3, &policy);
        assert_eq!(obs, Observation::Asleep { state: before.clone() });
        assert_eq!(store.get(&tree("t1")), Some(before));
        assert_eq!(store.sleeping_count(3), 1);
    }

    #[test]
    fn test_mark_asleep_requires_existing_entry() {
        let store = TreeStateStore::new();
        assert!(!store.mark_asleep(&tree("t1"), 100));

        store.upsert_on_observation(&tree("t1"), "r0", 0, &SleepPolicy::default());
        assert!(store.mark_asleep(&tree("t1"), 100));
        assert!(store.is_asleep(&tree("t1"), 99));
        assert!(!store.is_asleep(&tree("t1"), 100));
    }

    #[test]
    fn test_verified_root_reconciliation() {
        let store = TreeStateStore::new();
        let policy = SleepPolicy::default();
        store.upsert_on_observation(&tree("t1"), "r0", 0, &policy);
        store.upsert_on_observation(&tree("t1"), "r0", 1, &policy);

        assert_eq!(
            store.reset_on_verified_root(&tree("t1"), "r0"),
            Reconciliation::Confirmed
        );
        assert_eq!(store.get(&tree("t1")).unwrap().consecutive_same_count, 1);

        assert_eq!(
            store.reset_on_verified_root(&tree("t1"), "r1"),
            Reconciliation::RootReplaced
        );
        assert_eq!(store.get(&tree("t1")), Some(TreeState::first_seen("r1")));

        assert_eq!(
            store.reset_on_verified_root(&tree("t2"), "x"),
            Reconciliation::Created
        );
    }

    #[test]
    fn test_concurrent_observers_count_every_update() {
        let store = Arc::new(TreeStateStore::new());
        let policy = SleepPolicy::new(crate::policy::SleepPolicyConfig {
            unchanged_threshold: u32::MAX,
            ..Default::default()
        });
        store.upsert_on_observation(&tree("t1"), "r0", 0, &policy);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let policy = policy.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.upsert_on_observation(&tree("t1"), "r0", 1, &policy);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get(&tree("t1")).unwrap().consecutive_same_count, 800);
    }

    #[test]
    fn test_snapshot_is_sorted_copy() {
        let store = TreeStateStore::new();
        let policy = SleepPolicy::default();
        store.upsert_on_observation(&tree("b"), "r", 0, &policy);
        store.upsert_on_observation(&tree("a"), "r", 0, &policy);

        let ids: Vec<_> = store.snapshot().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![tree("a"), tree("b")]);
    }
}
