//! Tokio runtime and tick driver for the monitor engine.
//!
//! The runtime owns the orchestrator, drives it on a fixed cadence and tears
//! everything down in order: stop scheduling, wait for the in-flight tick,
//! then close every source.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::discovery::Exclusion;
use super::lifecycle::{Engine, Lifecycle, ShutdownReport};
use super::metrics::{Snapshot, SourceId};
use super::orchestrator::{Orchestrator, TickStats};
use super::probes::Platform;
use crate::core::config::MonitorConfig;
use crate::error::{HwError, Result};
use crate::platform::SystemPlatform;

/// Wrapper around the Tokio runtime for metrics collection.
pub struct MonitorRuntime {
    orchestrator: Arc<Orchestrator>,
    excluded: Vec<Exclusion>,

    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,

    driver: Option<JoinHandle<()>>,
    runtime: Option<tokio::runtime::Runtime>,
}

impl MonitorRuntime {
    /// Start monitoring the local machine.
    pub fn start(config: MonitorConfig) -> Result<Self> {
        Self::start_with_platform(Arc::new(SystemPlatform::new()), config)
    }

    /// Discover sources on `platform`, warm them up and start ticking.
    pub fn start_with_platform(platform: Arc<dyn Platform>, config: MonitorConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| HwError::config(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads.max(1))
            .enable_time()
            .thread_name("metrics-worker")
            .build()
            .map_err(|e| HwError::scheduler(format!("Failed to build runtime: {}", e)))?;

        let Engine {
            orchestrator,
            excluded,
        } = Lifecycle::start(platform.as_ref(), &config);
        let orchestrator = Arc::new(orchestrator);

        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let driver = runtime.spawn(tick_driver(
            Arc::clone(&orchestrator),
            config.tick_interval(),
            settle_delay(&config),
            shutdown_tx.subscribe(),
        ));

        log::info!(
            "Monitor started: {} source(s), tick every {} ms",
            orchestrator.active_ids().len(),
            config.tick_interval_ms
        );

        Ok(Self {
            orchestrator,
            excluded,
            shutdown_tx,
            driver: Some(driver),
            runtime: Some(runtime),
        })
    }

    /// Receiver for snapshots; `changed()` fires once per completed tick.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.orchestrator.subscribe()
    }

    pub fn latest(&self) -> Arc<Snapshot> {
        self.orchestrator.latest()
    }

    /// Block the calling thread until `updates` has an unseen snapshot or
    /// `timeout` passes. Returns `Ok(false)` on timeout.
    ///
    /// For synchronous callers only; panics inside an async context.
    pub fn wait_for_update(
        &self,
        updates: &mut watch::Receiver<Arc<Snapshot>>,
        timeout: Duration,
    ) -> Result<bool> {
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| HwError::scheduler("monitor already stopped"))?;

        match runtime.block_on(tokio::time::timeout(timeout, updates.changed())) {
            Ok(Ok(())) => Ok(true),
            Ok(Err(_)) => Err(HwError::scheduler("snapshot channel closed")),
            Err(_) => Ok(false),
        }
    }

    pub fn active_ids(&self) -> &[SourceId] {
        self.orchestrator.active_ids()
    }

    pub fn excluded(&self) -> &[Exclusion] {
        &self.excluded
    }

    pub fn stats(&self) -> TickStats {
        self.orchestrator.stats()
    }

    /// Stop ticking, wait for the in-flight tick, then close every source.
    pub fn shutdown(mut self) -> ShutdownReport {
        self.stop()
    }

    fn stop(&mut self) -> ShutdownReport {
        let _ = self.shutdown_tx.send(());
        // blocking on the driver is impossible from inside another runtime
        let in_async = tokio::runtime::Handle::try_current().is_ok();

        if let (Some(driver), Some(runtime)) = (self.driver.take(), self.runtime.as_ref()) {
            if in_async {
                log::debug!("Monitor stopped inside an async context; waiting on the tick state instead of the driver");
            } else if let Err(e) = runtime.block_on(driver) {
                log::error!("Tick driver ended abnormally: {}", e);
            }
        }

        let report = Lifecycle::shutdown(&self.orchestrator);

        if let Some(runtime) = self.runtime.take() {
            if in_async {
                runtime.shutdown_background();
            } else {
                runtime.shutdown_timeout(Duration::from_secs(1));
            }
        }
        report
    }
}

impl Drop for MonitorRuntime {
    fn drop(&mut self) {
        if self.runtime.is_some() {
            self.stop();
        }
    }
}

/// Warm-up readings need time to age before the first real one.
fn settle_delay(config: &MonitorConfig) -> Duration {
    if config.warm_up {
        sysinfo::MINIMUM_CPU_UPDATE_INTERVAL
    } else {
        Duration::ZERO
    }
}

/// Drive ticks until shutdown, then wait for whatever is still in flight.
async fn tick_driver(
    orchestrator: Arc<Orchestrator>,
    period: Duration,
    settle: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval_at(Instant::now() + settle, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut in_flight: Vec<JoinHandle<()>> = Vec::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                in_flight.retain(|handle| !handle.is_finished());
                // overlapping ticks are rejected inside try_tick
                let orchestrator = Arc::clone(&orchestrator);
                in_flight.push(tokio::spawn(async move {
                    orchestrator.try_tick().await;
                }));
            }
            _ = shutdown.recv() => {
                log::debug!("Tick driver stopping");
                break;
            }
        }
    }

    for handle in in_flight {
        if let Err(e) = handle.await {
            log::error!("Tick task failed: {}", e);
        }
    }
}

/// Run discovery, warm up, take exactly one tick and shut down.
pub fn snapshot_once(
    platform: &dyn Platform,
    config: &MonitorConfig,
) -> Result<(Arc<Snapshot>, ShutdownReport)> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| HwError::scheduler(format!("Failed to build runtime: {}", e)))?;

    let Engine { orchestrator, .. } = Lifecycle::start(platform, config);
    std::thread::sleep(settle_delay(config));

    let snapshot = runtime
        .block_on(orchestrator.try_tick())
        .ok_or_else(|| HwError::scheduler("tick did not run"))?;
    let report = Lifecycle::shutdown(&orchestrator);
    Ok((snapshot, report))
}
