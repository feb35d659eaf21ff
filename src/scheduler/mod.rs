//! Collection scheduler.
//!
//! One background task drives a full probe cycle across the six registry
//! targets on a fixed interval, persists each target's metrics, and rolls the
//! per-role statuses up into one cluster status row per engine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};

use crate::config::TargetRegistry;
use crate::db::{ClusterHealth, ConnectionStatus, DbError, Engine, Role, Store, UptimeSummary};
use crate::probe::probe_target;

/// The scheduler that orchestrates collection cycles.
pub struct Scheduler {
    store: Arc<Store>,
    registry: Arc<TargetRegistry>,
    interval: Duration,
    /// Held for the duration of one cycle; manual and scheduled triggers
    /// contend on it, so cycles never overlap.
    run_lock: Mutex<()>,
    stop: Mutex<Option<broadcast::Sender<()>>>,
}

impl Scheduler {
    pub fn new(store: Arc<Store>, registry: Arc<TargetRegistry>, interval: Duration) -> Self {
        Self {
            store,
            registry,
            interval,
            run_lock: Mutex::new(()),
            stop: Mutex::new(None),
        }
    }

    /// Start the periodic collection task. The first tick fires immediately,
    /// so an initial cycle runs at startup.
    pub fn start(self: Arc<Self>) {
        tokio::spawn(async move {
            let (tx, mut rx) = broadcast::channel(1);
            {
                let mut stop_guard = self.stop.lock().await;
                *stop_guard = Some(tx);
            }

            tracing::info!(
                "Scheduler started, collecting every {}s",
                self.interval.as_secs()
            );

            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = rx.recv() => {
                        tracing::info!("Scheduler stopping");
                        break;
                    }
                    _ = interval.tick() => {
                        // A failed cycle never takes the task down; the next
                        // interval fires regardless.
                        if let Err(e) = self.run_cycle().await {
                            tracing::error!("Scheduled collection failed: {}", e);
                        }
                    }
                }
            }
        });
    }

    /// Stop the periodic task. In-flight cycles finish on their own.
    pub async fn stop(&self) {
        let stop = self.stop.lock().await;
        if let Some(tx) = stop.as_ref() {
            let _ = tx.send(());
        }
    }

    /// Run one full collection cycle: probe all six targets in fixed order,
    /// persist a metrics row per target, then one cluster status row per
    /// engine.
    ///
    /// Each target is an independent unit: a probe failure becomes a `down`
    /// status and a persistence failure is logged without aborting the rest
    /// of the cycle. The first persistence error is reported after the whole
    /// cycle has been attempted. Manual triggers run this same function, so
    /// the persisted shape is identical either way.
    pub async fn run_cycle(&self) -> Result<(), DbError> {
        let _guard = self.run_lock.lock().await;

        tracing::info!("Collecting metrics for {} targets", self.registry.len());
        let mut statuses: HashMap<(Engine, Role), ConnectionStatus> = HashMap::new();
        let mut first_err: Option<DbError> = None;

        for (engine, role, target) in self.registry.iter() {
            let metrics = probe_target(&self.store, engine, role, target).await;
            statuses.insert((engine, role), metrics.connection_status);

            let uptime = match self.store.rolling_uptime(engine, role) {
                Ok(uptime) => uptime,
                Err(e) => {
                    tracing::error!(
                        "Uptime lookup failed for {} {}: {}",
                        engine.as_str(),
                        role.as_str(),
                        e
                    );
                    first_err.get_or_insert(e);
                    UptimeSummary::no_data()
                }
            };

            if let Err(e) = self.store.insert_metrics(&metrics, &uptime) {
                tracing::error!(
                    "Failed to persist metrics for {} {}: {}",
                    engine.as_str(),
                    role.as_str(),
                    e
                );
                first_err.get_or_insert(e);
            }
        }

        for engine in Engine::ALL {
            let status_of = |role: Role| {
                statuses
                    .get(&(engine, role))
                    .copied()
                    .unwrap_or(ConnectionStatus::Down)
            };
            let primary = status_of(Role::Primary);
            let secondary1 = status_of(Role::Secondary1);
            let secondary2 = status_of(Role::Secondary2);
            let health = ClusterHealth::summarize(primary, secondary1, secondary2);

            if let Err(e) = self
                .store
                .insert_cluster_status(engine, health, primary, secondary1, secondary2)
            {
                tracing::error!(
                    "Failed to persist cluster status for {}: {}",
                    engine.as_str(),
                    e
                );
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            None => {
                tracing::info!("Metrics collection complete");
                Ok(())
            }
            Some(e) => Err(e),
        }
    }
}
