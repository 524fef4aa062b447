//! Processor utilization source.

use crate::core::monitor::metrics::{readings, MetricSourceKind, Sample, SourceId, Tick};
use crate::core::monitor::probes::CpuProbe;
use crate::core::monitor::source::MetricSource;
use crate::error::Result;

/// Overall and per-core CPU utilization.
///
/// Utilization is measured between two refreshes, so the first refresh after
/// opening the probe is meaningless and gets discarded during warm-up.
pub struct ProcessorSource {
    probe: Box<dyn CpuProbe>,
    per_core: bool,
    core_count: usize,
}

impl ProcessorSource {
    pub fn new(probe: Box<dyn CpuProbe>, per_core: bool) -> Self {
        Self {
            probe,
            per_core,
            core_count: 0,
        }
    }
}

impl MetricSource for ProcessorSource {
    fn id(&self) -> SourceId {
        SourceId::singleton(MetricSourceKind::Processor)
    }

    fn label(&self) -> String {
        "Processor".to_string()
    }

    fn probe(&mut self) -> bool {
        // always present; the refresh only learns the core count
        if let Ok(reading) = self.probe.refresh() {
            self.core_count = reading.per_core_usage.len();
        }
        true
    }

    fn sample(&mut self, tick: &Tick) -> Result<Sample> {
        let reading = self.probe.refresh()?;

        let mut sample =
            Sample::new(tick.wall).with(readings::CPU_USAGE, f64::from(reading.global_usage));
        if self.per_core {
            for (index, usage) in reading.per_core_usage.iter().enumerate() {
                sample = sample.with(readings::cpu_core(index), f64::from(*usage));
            }
        }
        Ok(sample)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn reading_names(&self) -> Vec<String> {
        let mut names = vec![readings::CPU_USAGE.to_string()];
        if self.per_core {
            names.extend((0..self.core_count).map(readings::cpu_core));
        }
        names
    }

    fn needs_warm_up(&self) -> bool {
        true
    }
}
