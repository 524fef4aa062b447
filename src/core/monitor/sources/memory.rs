//! Memory usage source.

use crate::core::monitor::metrics::{readings, MetricSourceKind, Sample, SourceId, Tick};
use crate::core::monitor::probes::MemoryProbe;
use crate::core::monitor::source::MetricSource;
use crate::error::Result;

pub struct MemorySource {
    probe: Box<dyn MemoryProbe>,
}

impl MemorySource {
    pub fn new(probe: Box<dyn MemoryProbe>) -> Self {
        Self { probe }
    }
}

impl MetricSource for MemorySource {
    fn id(&self) -> SourceId {
        SourceId::singleton(MetricSourceKind::Memory)
    }

    fn label(&self) -> String {
        "Memory".to_string()
    }

    fn probe(&mut self) -> bool {
        true
    }

    fn sample(&mut self, tick: &Tick) -> Result<Sample> {
        let reading = self.probe.read()?;

        Ok(Sample::new(tick.wall)
            .with(readings::MEM_USED_PERCENT, reading.used_percent())
            .with(readings::MEM_USED_BYTES, reading.used_bytes() as f64)
            .with(readings::MEM_TOTAL_BYTES, reading.total_bytes as f64)
            .with(readings::MEM_AVAILABLE_BYTES, reading.available_bytes as f64))
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn reading_names(&self) -> Vec<String> {
        [
            readings::MEM_USED_PERCENT,
            readings::MEM_USED_BYTES,
            readings::MEM_TOTAL_BYTES,
            readings::MEM_AVAILABLE_BYTES,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn needs_warm_up(&self) -> bool {
        true
    }
}
