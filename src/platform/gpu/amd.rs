use crate::core::monitor::GpuVendor;
use crate::core::monitor::probes::{GpuProvider, GpuReading};
use crate::error::{HwError, Result};

#[cfg(all(unix, feature = "rocm"))]
use rocm_smi_lib::{DeviceHandle, RocmSmi, TemperatureMetric};

/// AMD GPU provider using ROCm SMI
pub struct AmdGpuProvider {
    #[cfg(all(unix, feature = "rocm"))]
    rocm: RocmSmi,
    #[allow(dead_code)]
    device_index: u32,
}

impl AmdGpuProvider {
    /// Initializes ROCm SMI and selects the first GPU.
    pub fn new() -> Result<Self> {
        Self::with_device_index(0)
    }

    pub fn with_device_index(index: u32) -> Result<Self> {
        #[cfg(all(unix, feature = "rocm"))]
        {
            let rocm = RocmSmi::init().map_err(|e| {
                HwError::source_unavailable(format!("Failed to init ROCm SMI: {:?}", e))
            })?;

            let device_count = rocm.get_device_count().map_err(|e| {
                HwError::source_unavailable(format!("Failed to get device count: {:?}", e))
            })?;

            if index >= device_count as u32 {
                return Err(HwError::source_unavailable(format!(
                    "GPU {} not found (only {} devices available)",
                    index, device_count
                )));
            }

            Ok(Self {
                rocm,
                device_index: index,
            })
        }
        #[cfg(not(all(unix, feature = "rocm")))]
        {
            let _ = index;
            Err(HwError::source_unavailable(
                "AMD GPU support not enabled or not on Unix",
            ))
        }
    }

    #[cfg(all(unix, feature = "rocm"))]
    fn get_device(&self) -> Result<DeviceHandle> {
        self.rocm.get_device_handle(self.device_index).map_err(|e| {
            HwError::fatal_resource(format!("GPU {} lost: {:?}", self.device_index, e))
        })
    }
}

impl GpuProvider for AmdGpuProvider {
    fn vendor(&self) -> GpuVendor {
        GpuVendor::Amd
    }

    fn name(&self) -> Option<String> {
        #[cfg(all(unix, feature = "rocm"))]
        {
            let device = self.get_device().ok()?;
            self.rocm.get_device_name(&device).ok()
        }
        #[cfg(not(all(unix, feature = "rocm")))]
        {
            None
        }
    }

    fn has_load_sensors(&self) -> bool {
        #[cfg(all(unix, feature = "rocm"))]
        {
            self.get_device().is_ok_and(|device| {
                self.rocm.get_busy_percent(&device).is_ok()
                    && self
                        .rocm
                        .get_temperature(&device, TemperatureMetric::Edge)
                        .is_ok()
            })
        }
        #[cfg(not(all(unix, feature = "rocm")))]
        {
            false
        }
    }

    fn collect_metrics(&mut self) -> Result<GpuReading> {
        #[cfg(all(unix, feature = "rocm"))]
        {
            let device = self.get_device()?;

            let load = self.rocm.get_busy_percent(&device).map_err(|e| {
                HwError::transient(format!("Failed to read GPU busy percent: {:?}", e))
            })?;

            let temperature = self
                .rocm
                .get_temperature(&device, TemperatureMetric::Edge)
                .ok()
                .map(|t| t as f32);

            Ok(GpuReading {
                load_percent: load as f32,
                temperature_celsius: temperature,
                memory_used_bytes: self.rocm.get_memory_used(&device).unwrap_or(0),
                memory_total_bytes: self.rocm.get_memory_total(&device).unwrap_or(0),
            })
        }
        #[cfg(not(all(unix, feature = "rocm")))]
        {
            Err(HwError::fatal_resource(
                "AMD GPU support not enabled or not on Unix",
            ))
        }
    }
}
