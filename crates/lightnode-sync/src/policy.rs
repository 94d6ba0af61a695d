//! Unchanged-root sleep policy
//!
//! Pure decision logic: given a tree's prior state, a freshly observed root
//! and the current time, decide how the tree's state moves. Trees whose root
//! repeats for `unchanged_threshold` consecutive observations are put to
//! sleep for `cooldown`, on the assumption that a stable root carries no new
//! data worth sampling.
//!
//! The threshold counts observations of the same root including the one that
//! first recorded it: with the default of 3, the first sighting plus two
//! repeats enter sleep. `consecutive_same_count` tracks the repeats only, so
//! it is 0 right after a root is recorded. A threshold of 1 therefore puts a
//! tree to sleep on every newly recorded root.
//!
//! A sleep deadline is advisory. Once it passes the tree is evaluated
//! normally again; the expired deadline is dropped on the next write. Whether
//! the repeat counter survives the wake-up is governed by
//! [`SleepPolicyConfig::reset_count_on_wake`] and defaults to surviving, so a
//! still-unchanged tree goes straight back to sleep after one probe.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use lightnode_core::{SchedulerSettings, TreeState};

// =============================================================================
// Configuration
// =============================================================================

/// Parameters of the sleep policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepPolicyConfig {
    /// Consecutive identical observations that trigger sleep
    pub unchanged_threshold: u32,

    /// Length of the sleep window
    pub cooldown: Duration,

    /// Reset the repeat counter when a tree wakes from sleep
    pub reset_count_on_wake: bool,
}

impl Default for SleepPolicyConfig {
    fn default() -> Self {
        Self {
            unchanged_threshold: 3,
            cooldown: Duration::from_secs(300),
            reset_count_on_wake: false,
        }
    }
}

impl From<&SchedulerSettings> for SleepPolicyConfig {
    fn from(settings: &SchedulerSettings) -> Self {
        Self {
            unchanged_threshold: settings.unchanged_threshold,
            cooldown: settings.cooldown(),
            reset_count_on_wake: settings.reset_count_on_wake,
        }
    }
}

// =============================================================================
// Decisions
// =============================================================================

/// How an observation moved a tree's state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyDecision {
    /// First sighting: root recorded, counter at zero
    Created,
    /// Same root again, below the threshold
    UnchangedTracking,
    /// Threshold reached: the tree sleeps until `until_ms`
    SleepEntered {
        /// Wake-up deadline in milliseconds since the epoch
        until_ms: u64,
    },
    /// A different root was observed: recorded, counter reset
    ChangedReset,
}

impl PolicyDecision {
    /// Short label used in structured logs
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyDecision::Created => "created",
            PolicyDecision::UnchangedTracking => "unchanged_tracking",
            PolicyDecision::SleepEntered { .. } => "sleep_entered",
            PolicyDecision::ChangedReset => "changed_reset",
        }
    }
}

/// A decision together with the state it produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// What happened
    pub decision: PolicyDecision,
    /// The tree's state after the observation
    pub state: TreeState,
}

// =============================================================================
// Policy
// =============================================================================

/// Sleep policy evaluator
#[derive(Debug, Clone, Default)]
pub struct SleepPolicy {
    config: SleepPolicyConfig,
}

impl SleepPolicy {
    /// Create a policy with the given parameters
    pub fn new(config: SleepPolicyConfig) -> Self {
        Self { config }
    }

    /// Policy parameters
    pub fn config(&self) -> &SleepPolicyConfig {
        &self.config
    }

    /// Evaluate one observation
    ///
    /// Returns `None` when `prior` is still asleep at `now_ms`: sleeping trees
    /// are never evaluated and their counters never advance.
    pub fn evaluate(
        &self,
        prior: Option<&TreeState>,
        observed_root: &str,
        now_ms: u64,
    ) -> Option<Transition> {
        let prior = match prior {
            None => {
                let state = TreeState::first_seen(observed_root);
                return Some(self.record_new_root(PolicyDecision::Created, state, now_ms));
            }
            Some(state) if state.is_asleep(now_ms) => return None,
            Some(state) => state,
        };

        let mut next = prior.clone();
        if prior.has_woken(now_ms) {
            next.sleep_until_ms = None;
            if self.config.reset_count_on_wake {
                next.consecutive_same_count = 0;
            }
        }

        if observed_root != prior.last_root {
            next.last_root = observed_root.to_string();
            next.consecutive_same_count = 0;
            return Some(self.record_new_root(PolicyDecision::ChangedReset, next, now_ms));
        }

        next.consecutive_same_count = next.consecutive_same_count.saturating_add(1);
        let observations = next.consecutive_same_count.saturating_add(1);

        let decision = if observations >= self.config.unchanged_threshold {
            let until_ms = now_ms.saturating_add(self.cooldown_ms());
            next.sleep_until_ms = Some(until_ms);
            PolicyDecision::SleepEntered { until_ms }
        } else {
            PolicyDecision::UnchangedTracking
        };

        Some(Transition {
            decision,
            state: next,
        })
    }

    /// A newly recorded root is its own first observation, so a threshold of
    /// one already puts the tree to sleep.
    fn record_new_root(
        &self,
        decision: PolicyDecision,
        mut state: TreeState,
        now_ms: u64,
    ) -> Transition {
        if self.config.unchanged_threshold > 1 {
            return Transition { decision, state };
        }
        let until_ms = now_ms.saturating_add(self.cooldown_ms());
        state.sleep_until_ms = Some(until_ms);
        Transition {
            decision: PolicyDecision::SleepEntered { until_ms },
            state,
        }
    }

    fn cooldown_ms(&self) -> u64 {
        u64::try_from(self.config.cooldown.as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN_MS: u64 = 300_000;

    fn observe(policy: &SleepPolicy, prior: Option<&TreeState>, root: &str, now: u64) -> Transition {
        policy
            .evaluate(prior, root, now)
            .expect("tree should be awake")
    }

    #[test]
    fn test_first_sighting_is_created() {
        let policy = SleepPolicy::default();
        let t = observe(&policy, None, "r0", 0);

        assert_eq!(t.decision, PolicyDecision::Created);
        assert_eq!(t.state, TreeState::first_seen("r0"));
    }

    #[test]
    fn test_third_identical_observation_sleeps() {
        let policy = SleepPolicy::default();
        let t1 = observe(&policy, None, "r0", 0);
        let t2 = observe(&policy, Some(&t1.state), "r0", 10);
        assert_eq!(t2.decision, PolicyDecision::UnchangedTracking);
        assert_eq!(t2.state.consecutive_same_count, 1);

        let t3 = observe(&policy, Some(&t2.state), "r0", 20);
        assert_eq!(
            t3.decision,
            PolicyDecision::SleepEntered {
                until_ms: 20 + COOLDOWN_MS
            }
        );
        assert_eq!(t3.state.sleep_until_ms, Some(20 + COOLDOWN_MS));
        assert_eq!(t3.state.consecutive_same_count, 2);
    }

    #[test]
    fn test_sleeping_tree_is_not_evaluated() {
        let policy = SleepPolicy::default();
        let asleep = TreeState {
            last_root: "r0".to_string(),
            sleep_until_ms: Some(1_000),
            consecutive_same_count: 2,
        };

        assert!(policy.evaluate(Some(&asleep), "r1", 999).is_none());
    }

    #[test]
    fn test_changed_root_after_wake_resets() {
        let policy = SleepPolicy::default();
        let asleep = TreeState {
            last_root: "r0".to_string(),
            sleep_until_ms: Some(1_000),
            consecutive_same_count: 2,
        };

        let t = observe(&policy, Some(&asleep), "r2", 1_000);
        assert_eq!(t.decision, PolicyDecision::ChangedReset);
        assert_eq!(t.state, TreeState::first_seen("r2"));
    }

    #[test]
    fn test_unchanged_root_after_wake_sleeps_again() {
        let policy = SleepPolicy::default();
        let woken = TreeState {
            last_root: "r0".to_string(),
            sleep_until_ms: Some(1_000),
            consecutive_same_count: 2,
        };

        let t = observe(&policy, Some(&woken), "r0", 1_500);
        assert_eq!(
            t.decision,
            PolicyDecision::SleepEntered {
                until_ms: 1_500 + COOLDOWN_MS
            }
        );
        assert_eq!(t.state.consecutive_same_count, 3);
    }

    #[test]
    fn test_reset_on_wake_when_configured() {
        let policy = SleepPolicy::new(SleepPolicyConfig {
            reset_count_on_wake: true,
            ..SleepPolicyConfig::default()
        });
        let woken = TreeState {
            last_root: "r0".to_string(),
            sleep_until_ms: Some(1_000),
            consecutive_same_count: 2,
        };

        let t = observe(&policy, Some(&woken), "r0", 1_500);
        assert_eq!(t.decision, PolicyDecision::UnchangedTracking);
        assert_eq!(t.state.consecutive_same_count, 1);
        assert_eq!(t.state.sleep_until_ms, None);
    }

    #[test]
    fn test_custom_threshold_and_cooldown() {
        let policy = SleepPolicy::new(SleepPolicyConfig {
            unchanged_threshold: 2,
            cooldown: Duration::from_secs(1),
            reset_count_on_wake: false,
        });

        let t1 = observe(&policy, None, "r0", 0);
        let t2 = observe(&policy, Some(&t1.state), "r0", 5);
        assert_eq!(t2.decision, PolicyDecision::SleepEntered { until_ms: 1_005 });
    }

    #[test]
    fn test_threshold_one_sleeps_on_every_new_root() {
        let policy = SleepPolicy::new(SleepPolicyConfig {
            unchanged_threshold: 1,
            cooldown: Duration::from_secs(1),
            reset_count_on_wake: false,
        });

        let t1 = observe(&policy, None, "r0", 0);
        assert_eq!(t1.decision, PolicyDecision::SleepEntered { until_ms: 1_000 });
        assert_eq!(t1.state.consecutive_same_count, 0);
        assert!(policy.evaluate(Some(&t1.state), "r0", 999).is_none());

        let t2 = observe(&policy, Some(&t1.state), "r1", 1_000);
        assert_eq!(t2.decision, PolicyDecision::SleepEntered { until_ms: 2_000 });
        assert_eq!(t2.state.last_root, "r1");
        assert_eq!(t2.state.consecutive_same_count, 0);
    }
}
