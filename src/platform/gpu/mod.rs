//! GPU-specific platform code.
//!
//! Supports NVIDIA (via NVML) and AMD (via ROCm SMI).

mod amd;
mod nvidia;

pub use amd::AmdGpuProvider;
pub use nvidia::NvidiaGpuProvider;

use crate::core::monitor::probes::GpuProvider;
use crate::error::{HwError, Result};

/// Attempt to get an available GPU provider
///
/// Tries each supported vendor in order of preference:
/// 1. NVIDIA (via NVML)
/// 2. AMD (via ROCm SMI)
pub fn get_gpu_provider() -> Result<Box<dyn GpuProvider>> {
    match NvidiaGpuProvider::new() {
        Ok(provider) => return Ok(Box::new(provider)),
        Err(e) => log::debug!("NVIDIA provider unavailable: {}", e),
    }

    match AmdGpuProvider::new() {
        Ok(provider) => return Ok(Box::new(provider)),
        Err(e) => log::debug!("AMD provider unavailable: {}", e),
    }

    Err(HwError::source_unavailable("No supported GPU found"))
}
