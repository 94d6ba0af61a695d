//! Light node service
//!
//! Drives the [`CycleScheduler`] on a fixed interval until asked to stop.
//! Cancellation is cooperative: a stop request lets the in-flight cycle
//! finish and prevents the next one from starting.
//!
//! # Blocking Lock Usage
//!
//! Uses `parking_lot` locks for lifecycle state, statistics and the loop's
//! `JoinHandle` because:
//! 1. Every critical section is a field read or a small struct update
//! 2. No lock is held across `.await` points (the handle is taken out first)
//! 3. No I/O happens inside the lock scope

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use lightnode_core::effects::LightNodeEffects;
use lightnode_core::{TreeId, TreeState};

use crate::scheduler::{CycleError, CycleOutcome, CycleReport, CycleScheduler};

// =============================================================================
// Lifecycle
// =============================================================================

/// Service lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceState {
    /// Not running
    Stopped,
    /// Spawning the cycle loop
    Starting,
    /// Cycle loop active
    Running,
    /// Waiting for the in-flight cycle to finish
    Stopping,
}

/// Health summary for status endpoints and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Running, and the latest cycle reached the data source
    Healthy,
    /// Running, but the latest cycle could not list trees
    Degraded,
    /// Not running
    Unhealthy,
}

/// Lifecycle errors
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// `start` was called while the loop is active
    #[error("service is already running")]
    AlreadyRunning,
    /// `stop` was called while the loop is not active
    #[error("service is not running")]
    NotRunning,
}

/// Counters describing the cycles run so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatistics {
    /// Cycles completed, whatever their outcome
    pub cycles_run: u64,
    /// Cycles that verified a tree
    pub cycles_verified: u64,
    /// Cycles that found nothing to verify
    pub cycles_empty: u64,
    /// Cycles that could not list trees
    pub cycles_failed: u64,
    /// Tree verified by the latest successful cycle
    pub last_verified_tree: Option<TreeId>,
    /// Clock reading when the latest cycle finished
    pub last_cycle_at_ms: Option<u64>,
    /// Whether the latest cycle failed to list trees
    pub last_cycle_failed: bool,
}

impl ServiceStatistics {
    fn record(&mut self, result: &Result<CycleReport, CycleError>, now_ms: u64) {
        self.cycles_run += 1;
        self.last_cycle_at_ms = Some(now_ms);
        self.last_cycle_failed = result.is_err();
        match result {
            Ok(report) => match &report.outcome {
                CycleOutcome::Verified(verified) => {
                    self.cycles_verified += 1;
                    self.last_verified_tree = Some(verified.tree_id.clone());
                }
                CycleOutcome::NoTreesAvailable | CycleOutcome::NoActiveTreeFound => {
                    self.cycles_empty += 1;
                }
            },
            Err(_) => self.cycles_failed += 1,
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Periodic driver around a [`CycleScheduler`]
pub struct LightNodeService<E> {
    scheduler: Arc<CycleScheduler<E>>,
    interval: Duration,
    state: Arc<RwLock<ServiceState>>,
    statistics: Arc<RwLock<ServiceStatistics>>,
    shutdown_tx: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<E: LightNodeEffects + 'static> LightNodeService<E> {
    /// Create a stopped service that runs a cycle every `interval`
    pub fn new(scheduler: CycleScheduler<E>, interval: Duration) -> Self {
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);
        Self {
            scheduler: Arc::new(scheduler),
            interval,
            state: Arc::new(RwLock::new(ServiceState::Stopped)),
            statistics: Arc::new(RwLock::new(ServiceStatistics::default())),
            shutdown_tx,
            handle: Mutex::new(None),
        }
    }

    /// Scheduler driven by this service
    pub fn scheduler(&self) -> &Arc<CycleScheduler<E>> {
        &self.scheduler
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServiceState {
        *self.state.read()
    }

    /// Whether the cycle loop is active
    pub fn is_running(&self) -> bool {
        matches!(self.state(), ServiceState::Running)
    }

    /// Copy of the cycle counters
    pub fn statistics(&self) -> ServiceStatistics {
        self.statistics.read().clone()
    }

    /// Copies of every tracked tree's state
    pub fn tree_states(&self) -> Vec<(TreeId, TreeState)> {
        self.scheduler.store().snapshot()
    }

    /// Health derived from lifecycle state and the latest cycle
    pub fn health(&self) -> HealthStatus {
        match self.state() {
            ServiceState::Running if self.statistics.read().last_cycle_failed => {
                HealthStatus::Degraded
            }
            ServiceState::Running => HealthStatus::Healthy,
            _ => HealthStatus::Unhealthy,
        }
    }

    /// Run a single cycle outside the loop and record it
    pub async fn run_once(&self) -> Result<CycleReport, CycleError> {
        run_and_record(&self.scheduler, &self.statistics).await
    }

    /// Spawn the periodic cycle loop
    pub fn start(&self) -> Result<(), ServiceError> {
        {
            let mut state = self.state.write();
            if *state != ServiceState::Stopped {
                return Err(ServiceError::AlreadyRunning);
            }
            *state = ServiceState::Starting;
        }

        self.shutdown_tx.send_replace(false);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let scheduler = Arc::clone(&self.scheduler);
        let statistics = Arc::clone(&self.statistics);
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {}
                }
                if *shutdown_rx.borrow() {
                    break;
                }
                // The cycle runs outside the select so a stop request cannot
                // cut it short.
                if let Err(err) = run_and_record(&scheduler, &statistics).await {
                    error!(error = %err, "cycle failed");
                }
            }
        });

        *self.handle.lock() = Some(handle);
        *self.state.write() = ServiceState::Running;
        info!(
            interval_ms = saturating_millis(period),
            "light node service started"
        );
        Ok(())
    }

    /// Stop the loop after the in-flight cycle finishes
    pub async fn stop(&self) -> Result<(), ServiceError> {
        {
            let mut state = self.state.write();
            if *state != ServiceState::Running {
                return Err(ServiceError::NotRunning);
            }
            *state = ServiceState::Stopping;
        }

        self.shutdown_tx.send_replace(true);
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(error = %err, "cycle loop ended abnormally");
            }
        }

        *self.state.write() = ServiceState::Stopped;
        info!("light node service stopped");
        Ok(())
    }

    /// Run until `shutdown` resolves, then stop gracefully
    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), ServiceError>
    where
        F: Future<Output = ()>,
    {
        self.start()?;
        shutdown.await;
        info!("shutdown requested");
        self.stop().await
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

async fn run_and_record<E: LightNodeEffects>(
    scheduler: &CycleScheduler<E>,
    statistics: &RwLock<ServiceStatistics>,
) -> Result<CycleReport, CycleError> {
    let result = scheduler.run_cycle().await;
    let now_ms = scheduler.effects().now_ms();
    statistics.write().record(&result, now_ms);
    result
}
