//! Network interface throughput source.

use crate::core::monitor::metrics::{readings, MetricSourceKind, Sample, SourceId, Tick};
use crate::core::monitor::probes::{InterfaceKind, InterfaceStats, NetworkProbe};
use crate::core::monitor::rate::{bytes_to_kbps, CounterState};
use crate::core::monitor::source::MetricSource;
use crate::error::{HwError, Result};

/// Pick the interface to chart.
///
/// Order of preference:
/// 1. the configured interface, if it is up
/// 2. the up, physical (wired or wireless) interface with the most received bytes
/// 3. any up interface, non-loopback first, then by received bytes
pub fn select_interface(interfaces: &[InterfaceStats], preferred: Option<&str>) -> Option<String> {
    if let Some(wanted) = preferred {
        if let Some(iface) = interfaces.iter().find(|i| i.is_up && i.name == wanted) {
            return Some(iface.name.clone());
        }
        log::warn!("Preferred interface '{}' is not up, selecting automatically", wanted);
    }

    let physical = interfaces
        .iter()
        .filter(|i| i.is_up && i.kind.is_physical())
        .max_by_key(|i| i.bytes_received);
    if let Some(iface) = physical {
        return Some(iface.name.clone());
    }

    interfaces
        .iter()
        .filter(|i| i.is_up)
        .max_by_key(|i| (i.kind != InterfaceKind::Loopback, i.bytes_received))
        .map(|i| i.name.clone())
}

/// Send/receive throughput of one selected interface, in kbps.
pub struct NetworkSource {
    probe: Box<dyn NetworkProbe>,
    preferred: Option<String>,
    interface: Option<String>,
    sent: CounterState,
    received: CounterState,
}

impl NetworkSource {
    pub fn new(probe: Box<dyn NetworkProbe>, preferred: Option<String>) -> Self {
        Self {
            probe,
            preferred,
            interface: None,
            sent: CounterState::new(),
            received: CounterState::new(),
        }
    }

    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }
}

impl MetricSource for NetworkSource {
    fn id(&self) -> SourceId {
        match &self.interface {
            Some(name) => SourceId::instance(MetricSourceKind::NetworkInterface, name.clone()),
            None => SourceId::singleton(MetricSourceKind::NetworkInterface),
        }
    }

    fn label(&self) -> String {
        self.interface
            .clone()
            .unwrap_or_else(|| "Network".to_string())
    }

    fn probe(&mut self) -> bool {
        let interfaces = match self.probe.interfaces() {
            Ok(interfaces) => interfaces,
            Err(e) => {
                log::warn!("Network interface enumeration failed: {}", e);
                return false;
            }
        };
        self.interface = select_interface(&interfaces, self.preferred.as_deref());
        match &self.interface {
            Some(name) => {
                log::info!("Monitoring network interface {}", name);
                true
            }
            None => {
                log::info!("No network interface is up");
                false
            }
        }
    }

    fn sample(&mut self, tick: &Tick) -> Result<Sample> {
        let name = self
            .interface
            .as_deref()
            .ok_or_else(|| HwError::fatal_resource("no interface selected"))?;
        let stats = self
            .probe
            .interfaces()?
            .into_iter()
            .find(|i| i.name == name)
            .ok_or_else(|| HwError::transient(format!("interface {} not reported", name)))?;

        let send = self.sent.advance(stats.bytes_sent, tick.at);
        let receive = self.received.advance(stats.bytes_received, tick.at);

        Ok(Sample::new(tick.wall)
            .with(readings::NET_SEND, bytes_to_kbps(send))
            .with(readings::NET_RECEIVE, bytes_to_kbps(receive)))
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn reading_names(&self) -> Vec<String> {
        vec![
            readings::NET_SEND.to_string(),
            readings::NET_RECEIVE.to_string(),
        ]
    }

    fn needs_warm_up(&self) -> bool {
        true
    }
}
