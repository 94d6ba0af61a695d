//! Property tests for the unchanged-root counter

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use proptest::prelude::*;

use lightnode_core::{TreeId, TreeState};
use lightnode_sync::{Observation, PolicyDecision, SleepPolicy, SleepPolicyConfig, TreeStateStore};

const COOLDOWN_MS: u64 = 300_000;

fn roots() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec((0u8..3).prop_map(|r| format!("r{r}")), 1..40)
}

proptest! {
    /// The counter equals the number of repeats of the current root and
    /// drops to zero on any different root, until the tree falls asleep.
    #[test]
    fn counter_tracks_consecutive_repeats(observed in roots()) {
        let policy = SleepPolicy::default();
        let mut state: Option<TreeState> = None;
        let mut repeats = 0u32;

        for (i, root) in observed.iter().enumerate() {
            let now = i as u64;
            match policy.evaluate(state.as_ref(), root, now) {
                None => {
                    prop_assert!(state.as_ref().unwrap().is_asleep(now));
                    break;
                }
                Some(transition) => {
                    repeats = match &state {
                        Some(prev) if &prev.last_root == root => repeats + 1,
                        _ => 0,
                    };
                    prop_assert_eq!(transition.state.consecutive_same_count, repeats);

                    let slept = matches!(transition.decision, PolicyDecision::SleepEntered { .. });
                    prop_assert_eq!(slept, repeats + 1 >= 3);
                    if slept {
                        prop_assert_eq!(transition.state.sleep_until_ms, Some(now + COOLDOWN_MS));
                    }
                    state = Some(transition.state);
                }
            }
        }
    }

    /// With threshold `t`, the `t`-th identical observation is the first to sleep.
    #[test]
    fn threshold_sets_sleep_point(threshold in 1u32..10, cooldown_s in 1u64..3_600) {
        let policy = SleepPolicy::new(SleepPolicyConfig {
            unchanged_threshold: threshold,
            cooldown: Duration::from_secs(cooldown_s),
            reset_count_on_wake: false,
        });
        let mut state: Option<TreeState> = None;

        for observation in 1..=threshold {
            let transition = policy.evaluate(state.as_ref(), "r", 0).unwrap();
            let slept = matches!(transition.decision, PolicyDecision::SleepEntered { .. });
            prop_assert_eq!(slept, observation == threshold);
            state = Some(transition.state);
        }
        prop_assert_eq!(state.unwrap().sleep_until_ms, Some(cooldown_s * 1_000));
    }

    /// Observations of a sleeping tree never change its stored state.
    #[test]
    fn sleeping_tree_state_is_frozen(later in roots(), offsets in prop::collection::vec(0u64..COOLDOWN_MS, 1..40)) {
        let store = TreeStateStore::new();
        let policy = SleepPolicy::default();
        let id = TreeId::from("t1");
        for _ in 0..3 {
            store.upsert_on_observation(&id, "r", 0, &policy);
        }
        let asleep = store.get(&id).unwrap();

        for (root, now) in later.iter().zip(offsets) {
            let observation = store.upsert_on_observation(&id, root, now, &policy);
            prop_assert_eq!(observation, Observation::Asleep { state: asleep.clone() });
        }
        prop_assert_eq!(store.get(&id), Some(asleep));
    }
}
