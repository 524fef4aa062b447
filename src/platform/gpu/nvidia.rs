#[cfg(feature = "nvml")]
use nvml_wrapper::{enum_wrappers::device::TemperatureSensor, error::NvmlError, Device, Nvml};

use crate::core::monitor::GpuVendor;
use crate::core::monitor::probes::{GpuProvider, GpuReading};
use crate::error::{HwError, Result};

/// NVIDIA GPU provider using NVML
pub struct NvidiaGpuProvider {
    #[cfg(feature = "nvml")]
    nvml: Nvml,
    #[cfg_attr(not(feature = "nvml"), allow(dead_code))]
    device_index: u32,
}

impl NvidiaGpuProvider {
    /// Initializes NVML and selects the first GPU.
    pub fn new() -> Result<Self> {
        Self::with_device_index(0)
    }

    pub fn with_device_index(index: u32) -> Result<Self> {
        #[cfg(feature = "nvml")]
        {
            let nvml = Nvml::init().map_err(|e| {
                HwError::source_unavailable(format!("Failed to init NVML: {}", e))
            })?;

            // Verify device exists
            nvml.device_by_index(index).map_err(|e| {
                HwError::source_unavailable(format!("GPU {} not found: {}", index, e))
            })?;

            Ok(Self {
                nvml,
                device_index: index,
            })
        }
        #[cfg(not(feature = "nvml"))]
        {
            let _ = index;
            Err(HwError::source_unavailable(
                "NVIDIA GPU support not enabled",
            ))
        }
    }

    #[cfg(feature = "nvml")]
    fn get_device(&self) -> Result<Device<'_>> {
        self.nvml.device_by_index(self.device_index).map_err(|e| match e {
            NvmlError::GpuLost | NvmlError::NotFound | NvmlError::Uninitialized => {
                HwError::fatal_resource(format!("GPU {} lost: {}", self.device_index, e))
            }
            other => HwError::transient(format!("Failed to get GPU device: {}", other)),
        })
    }
}

impl GpuProvider for NvidiaGpuProvider {
    fn vendor(&self) -> GpuVendor {
        GpuVendor::Nvidia
    }

    fn name(&self) -> Option<String> {
        #[cfg(feature = "nvml")]
        {
            self.get_device().ok()?.name().ok()
        }
        #[cfg(not(feature = "nvml"))]
        {
            None
        }
    }

    fn has_load_sensors(&self) -> bool {
        #[cfg(feature = "nvml")]
        {
            self.get_device().is_ok_and(|device| {
                device.utilization_rates().is_ok()
                    && device.temperature(TemperatureSensor::Gpu).is_ok()
            })
        }
        #[cfg(not(feature = "nvml"))]
        {
            false
        }
    }

    fn collect_metrics(&mut self) -> Result<GpuReading> {
        #[cfg(feature = "nvml")]
        {
            let device = self.get_device()?;

            let utilization = device.utilization_rates().map_err(|e| {
                HwError::transient(format!("Failed to read GPU utilization: {}", e))
            })?;

            let memory = device.memory_info().ok();
            let temperature = device.temperature(TemperatureSensor::Gpu).ok();

            Ok(GpuReading {
                load_percent: utilization.gpu as f32,
                temperature_celsius: temperature.map(|t| t as f32),
                memory_used_bytes: memory.as_ref().map(|m| m.used).unwrap_or(0),
                memory_total_bytes: memory.as_ref().map(|m| m.total).unwrap_or(0),
            })
        }
        #[cfg(not(feature = "nvml"))]
        {
            Err(HwError::fatal_resource(
                "NVIDIA GPU support not enabled",
            ))
        }
    }
}
