//! Graphics processor source.

use crate::core::monitor::metrics::{readings, MetricSourceKind, Sample, SourceId, Tick};
use crate::core::monitor::probes::GpuProvider;
use crate::core::monitor::source::MetricSource;
use crate::error::{HwError, Result};

/// GPU load, temperature and memory pressure.
///
/// Only kept when the probe finds load/temperature sensors and a device name.
/// A failed probe is final for the session.
pub struct GpuSource {
    provider: Option<Box<dyn GpuProvider>>,
    name: Option<String>,
}

impl GpuSource {
    pub fn new(provider: Box<dyn GpuProvider>) -> Self {
        Self {
            provider: Some(provider),
            name: None,
        }
    }
}

impl MetricSource for GpuSource {
    fn id(&self) -> SourceId {
        SourceId::singleton(MetricSourceKind::GraphicsProcessor)
    }

    fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| "GPU".to_string())
    }

    fn probe(&mut self) -> bool {
        let Some(provider) = self.provider.as_ref() else {
            return false;
        };
        if !provider.has_load_sensors() {
            log::info!("{:?} GPU exposes no load/temperature sensors", provider.vendor());
            return false;
        }
        match provider.name().map(|n| n.trim().to_string()) {
            Some(name) if !name.is_empty() => {
                self.name = Some(name);
                true
            }
            _ => {
                log::info!("GPU name could not be resolved");
                false
            }
        }
    }

    fn sample(&mut self, tick: &Tick) -> Result<Sample> {
        let provider = self
            .provider
            .as_mut()
            .ok_or_else(|| HwError::fatal_resource("GPU provider already closed"))?;
        let reading = provider.collect_metrics()?;

        Ok(Sample::new(tick.wall)
            .with(readings::GPU_LOAD, f64::from(reading.load_percent))
            .with(
                readings::GPU_TEMPERATURE,
                reading.temperature_celsius.map(f64::from).unwrap_or(0.0),
            )
            .with(readings::GPU_MEMORY, reading.memory_percent()))
    }

    fn close(&mut self) -> Result<()> {
        // dropping the provider releases the driver handle
        self.provider = None;
        Ok(())
    }

    fn reading_names(&self) -> Vec<String> {
        [
            readings::GPU_LOAD,
            readings::GPU_TEMPERATURE,
            readings::GPU_MEMORY,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}
