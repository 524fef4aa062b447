//! Engine start-up and tear-down.

use std::time::Duration;

use serde::Serialize;

use super::discovery::{discover, Discovery, Exclusion};
use super::orchestrator::Orchestrator;
use super::probes::Platform;
use crate::core::config::MonitorConfig;

/// Result of closing every source at shutdown.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShutdownReport {
    pub closed: usize,
    pub failures: Vec<(String, String)>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A ready-to-tick engine and the sources discovery left out.
pub struct Engine {
    pub orchestrator: Orchestrator,
    pub excluded: Vec<Exclusion>,
}

/// Longest shutdown waits for an in-flight tick before closing anyway.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Lifecycle;

impl Lifecycle {
    /// Discover sources, open them and optionally warm them up.
    pub fn start(platform: &dyn Platform, config: &MonitorConfig) -> Engine {
        let Discovery { sources, excluded } = discover(platform, config);
        let orchestrator = Orchestrator::new(sources, config.history_capacity);

        if config.warm_up {
            orchestrator.warm_up();
        }

        Engine {
            orchestrator,
            excluded,
        }
    }

    /// Close every source exactly once, whatever its availability.
    ///
    /// Waits for an in-flight tick first. A failing close is logged and does
    /// not stop the others.
    pub fn shutdown(orchestrator: &Orchestrator) -> ShutdownReport {
        if !orchestrator.stop() {
            log::debug!("Waiting for the in-flight tick before closing sources");
            if !orchestrator.wait_stopped(DRAIN_TIMEOUT) {
                log::warn!(
                    "Tick still running after {:?}; closing sources anyway",
                    DRAIN_TIMEOUT
                );
            }
        }

        let mut report = ShutdownReport::default();
        for slot in orchestrator.slots() {
            let mut slot = slot.lock();
            let id = slot.id().to_string();
            match slot.close() {
                Ok(()) => report.closed += 1,
                Err(e) => {
                    log::error!("{}: close failed: {}", id, e);
                    report.failures.push((id, e.to_string()));
                }
            }
        }

        log::info!(
            "Monitor shut down: {} source(s) closed, {} failure(s)",
            report.closed,
            report.failures.len()
        );
        report
    }
}
