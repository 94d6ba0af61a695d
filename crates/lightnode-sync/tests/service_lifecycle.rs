//! Periodic driver start/stop behaviour

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use lightnode_core::{TreeId, TreeSnapshot};
use lightnode_sync::{CycleScheduler, LightNodeService, ServiceState, SleepPolicy};
use lightnode_testkit::MockEffects;
use tokio::sync::oneshot;

fn service_with_tree() -> LightNodeService<MockEffects> {
    let effects = MockEffects::new();
    effects
        .trees
        .insert("t1", TreeSnapshot::new("r0", vec!["a".into(), "b".into()]));
    let scheduler = CycleScheduler::new(Arc::new(effects), SleepPolicy::default());
    LightNodeService::new(scheduler, Duration::from_millis(10))
}

#[tokio::test]
async fn loop_runs_cycles_until_stopped() {
    let service = service_with_tree();
    service.start().unwrap();
    assert!(service.is_running());

    tokio::time::sleep(Duration::from_millis(60)).await;
    service.stop().await.unwrap();

    let stats = service.statistics();
    assert!(stats.cycles_run >= 1);
    assert_eq!(stats.cycles_failed, 0);
    assert_eq!(stats.last_verified_tree, Some(TreeId::from("t1")));

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(service.statistics().cycles_run, stats.cycles_run);
    assert_eq!(service.state(), ServiceState::Stopped);
}

#[tokio::test]
async fn run_until_stops_on_signal() {
    let service = Arc::new(service_with_tree());
    let (tx, rx) = oneshot::channel::<()>();

    let runner = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .run_until(async {
                    let _ = rx.await;
                })
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(30)).await;
    tx.send(()).unwrap();
    runner.await.unwrap().unwrap();

    assert_eq!(service.state(), ServiceState::Stopped);
    assert!(service.statistics().cycles_run >= 1);
    assert_eq!(service.tree_states().len(), 1);
}

#[tokio::test]
async fn service_can_restart() {
    let service = service_with_tree();
    service.start().unwrap();
    service.stop().await.unwrap();
    service.start().unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    service.stop().await.unwrap();

    assert!(service.statistics().cycles_run >= 1);
}

#[tokio::test]
async fn stop_lets_inflight_cycle_finish() {
    let service = service_with_tree();
    let effects = Arc::clone(service.scheduler().effects());
    effects.trees.set_fetch_delay(Duration::from_millis(150));

    service.start().unwrap();
    // The first tick fires immediately, so the fetch is in flight by now.
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(effects.trees.fetch_calls().len(), 1);
    assert_eq!(service.statistics().cycles_run, 0);

    service.stop().await.unwrap();

    let stats = service.statistics();
    assert_eq!(stats.cycles_run, 1);
    assert_eq!(stats.cycles_verified, 1);
    assert_eq!(stats.last_verified_tree, Some(TreeId::from("t1")));
    assert_eq!(effects.submitter.submissions().len(), 1);
    assert_eq!(effects.trees.fetch_calls().len(), 1);
    assert_eq!(service.state(), ServiceState::Stopped);
}
