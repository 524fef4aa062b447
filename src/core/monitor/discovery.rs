//! One-time startup probing of the available metric sources.
//!
//! Processor and memory are always present. GPU and network are kept only
//! when their probe succeeds. Disks are enumerated and get one source per
//! real instance. The result is fixed for the lifetime of the engine: devices
//! that appear or disappear later are not picked up.

use std::panic::{self, AssertUnwindSafe};

use super::metrics::MetricSourceKind;
use super::probes::Platform;
use super::source::MetricSource;
use super::sources::{
    is_aggregate_instance, DiskSource, GpuSource, MemorySource, NetworkSource, ProcessorSource,
};
use crate::core::config::MonitorConfig;

/// A source left out of the session, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Exclusion {
    pub kind: MetricSourceKind,
    pub instance: Option<String>,
    pub reason: String,
}

/// Active sources in discovery order, plus what was left out and why.
pub struct Discovery {
    pub sources: Vec<Box<dyn MetricSource>>,
    pub excluded: Vec<Exclusion>,
}

impl Discovery {
    fn new() -> Self {
        Self {
            sources: Vec::new(),
            excluded: Vec::new(),
        }
    }

    fn exclude<S: Into<String>>(
        &mut self,
        kind: MetricSourceKind,
        instance: Option<String>,
        reason: S,
    ) {
        let reason = reason.into();
        log::info!(
            "{}{} unavailable: {}",
            kind,
            instance
                .as_deref()
                .map(|i| format!(":{}", i))
                .unwrap_or_default(),
            reason
        );
        self.excluded.push(Exclusion {
            kind,
            instance,
            reason,
        });
    }

    /// Probe `source` and keep it, or close and exclude it.
    fn admit(&mut self, mut source: Box<dyn MetricSource>, kind: MetricSourceKind) {
        if guarded_probe(source.as_mut()) {
            self.sources.push(source);
        } else {
            let instance = source.id().instance;
            if let Err(e) = source.close() {
                log::warn!("{}: close after failed probe: {}", kind, e);
            }
            self.exclude(kind, instance, "probe failed");
        }
    }

    pub fn kinds(&self) -> Vec<MetricSourceKind> {
        self.sources.iter().map(|s| s.id().kind).collect()
    }
}

/// Build the list of active sources.
pub fn discover(platform: &dyn Platform, config: &MonitorConfig) -> Discovery {
    let mut discovery = Discovery::new();

    match platform.processor() {
        Ok(probe) => discovery.admit(
            Box::new(ProcessorSource::new(probe, config.per_core)),
            MetricSourceKind::Processor,
        ),
        Err(e) => discovery.exclude(MetricSourceKind::Processor, None, e.to_string()),
    }

    match platform.memory() {
        Ok(probe) => discovery.admit(
            Box::new(MemorySource::new(probe)),
            MetricSourceKind::Memory,
        ),
        Err(e) => discovery.exclude(MetricSourceKind::Memory, None, e.to_string()),
    }

    if config.enable_gpu {
        match platform.gpu() {
            Ok(provider) => discovery.admit(
                Box::new(GpuSource::new(provider)),
                MetricSourceKind::GraphicsProcessor,
            ),
            Err(e) => discovery.exclude(MetricSourceKind::GraphicsProcessor, None, e.to_string()),
        }
    } else {
        discovery.exclude(MetricSourceKind::GraphicsProcessor, None, "disabled by config");
    }

    if config.enable_network {
        match platform.network() {
            Ok(probe) => discovery.admit(
                Box::new(NetworkSource::new(probe, config.preferred_interface.clone())),
                MetricSourceKind::NetworkInterface,
            ),
            Err(e) => discovery.exclude(MetricSourceKind::NetworkInterface, None, e.to_string()),
        }
    } else {
        discovery.exclude(MetricSourceKind::NetworkInterface, None, "disabled by config");
    }

    if config.enable_disks {
        discover_disks(platform, &mut discovery);
    } else {
        discovery.exclude(MetricSourceKind::Disk, None, "disabled by config");
    }

    log::info!(
        "Discovered {} metric source(s), {} excluded",
        discovery.sources.len(),
        discovery.excluded.len()
    );
    discovery
}

fn discover_disks(platform: &dyn Platform, discovery: &mut Discovery) {
    let mut probe = match platform.disks() {
        Ok(probe) => probe,
        Err(e) => {
            discovery.exclude(MetricSourceKind::Disk, None, e.to_string());
            return;
        }
    };

    let instances = match probe.instances() {
        Ok(instances) => instances,
        Err(e) => {
            discovery.exclude(MetricSourceKind::Disk, None, e.to_string());
            return;
        }
    };

    for instance in instances
        .into_iter()
        .filter(|name| !is_aggregate_instance(name))
    {
        // one bad disk never takes the others down
        match probe.open(&instance) {
            Ok(reader) => discovery.admit(
                Box::new(DiskSource::new(instance, reader)),
                MetricSourceKind::Disk,
            ),
            Err(e) => discovery.exclude(MetricSourceKind::Disk, Some(instance), e.to_string()),
        }
    }
}

fn guarded_probe(source: &mut dyn MetricSource) -> bool {
    panic::catch_unwind(AssertUnwindSafe(|| source.probe())).unwrap_or_else(|_| {
        log::warn!("{}: probe panicked", source.id());
        false
    })
}
