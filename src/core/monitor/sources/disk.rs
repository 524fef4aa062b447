//! Per physical disk throughput and busy time.

use crate::core::monitor::metrics::{readings, MetricSourceKind, Sample, SourceId, Tick};
use crate::core::monitor::probes::DiskCounterReader;
use crate::core::monitor::rate::CounterState;
use crate::core::monitor::source::MetricSource;
use crate::error::{HwError, Result};

/// Whether an instance name is the "all disks combined" pseudo-instance.
pub fn is_aggregate_instance(name: &str) -> bool {
    let name = name.trim();
    name.eq_ignore_ascii_case("_total") || name.eq_ignore_ascii_case("total")
}

pub struct DiskSource {
    instance: String,
    reader: Option<Box<dyn DiskCounterReader>>,
    read: CounterState,
    written: CounterState,
    busy: CounterState,
}

impl DiskSource {
    pub fn new<S: Into<String>>(instance: S, reader: Box<dyn DiskCounterReader>) -> Self {
        Self {
            instance: instance.into(),
            reader: Some(reader),
            read: CounterState::new(),
            written: CounterState::new(),
            busy: CounterState::new(),
        }
    }
}

impl MetricSource for DiskSource {
    fn id(&self) -> SourceId {
        SourceId::instance(MetricSourceKind::Disk, self.instance.clone())
    }

    fn label(&self) -> String {
        self.instance.clone()
    }

    fn probe(&mut self) -> bool {
        match self.reader.as_mut().map(|r| r.read()) {
            Some(Ok(_)) => true,
            Some(Err(e)) => {
                log::warn!("Disk {} counters unreadable: {}", self.instance, e);
                false
            }
            None => false,
        }
    }

    fn sample(&mut self, tick: &Tick) -> Result<Sample> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| HwError::fatal_resource(format!("disk {} is closed", self.instance)))?;
        let counters = reader.read()?;

        let read = self.read.advance(counters.read_bytes, tick.at);
        let written = self.written.advance(counters.written_bytes, tick.at);
        // busy milliseconds per second -> percent
        let busy = counters
            .busy_ms
            .map(|ms| (self.busy.advance(ms, tick.at) / 10.0).clamp(0.0, 100.0))
            .unwrap_or(0.0);

        Ok(Sample::new(tick.wall)
            .with(readings::DISK_READ, read)
            .with(readings::DISK_WRITE, written)
            .with(readings::DISK_BUSY, busy))
    }

    fn close(&mut self) -> Result<()> {
        match self.reader.take() {
            Some(mut reader) => reader.close(),
            None => Ok(()),
        }
    }

    fn reading_names(&self) -> Vec<String> {
        [readings::DISK_READ, readings::DISK_WRITE, readings::DISK_BUSY]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn needs_warm_up(&self) -> bool {
        true
    }
}
