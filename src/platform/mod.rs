// Platform-specific code module

pub mod gpu;
pub mod system;

use crate::core::monitor::probes::{
    CpuProbe, DiskProbe, GpuProvider, MemoryProbe, NetworkProbe, Platform,
};
use crate::error::Result;

pub use gpu::get_gpu_provider;
pub use system::{SysinfoCpu, SysinfoMemory, SysinfoNetwork, SystemDisks};

/// Capabilities of the machine we are running on.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPlatform;

impl SystemPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Platform for SystemPlatform {
    fn processor(&self) -> Result<Box<dyn CpuProbe>> {
        Ok(Box::new(SysinfoCpu::new()))
    }

    fn memory(&self) -> Result<Box<dyn MemoryProbe>> {
        Ok(Box::new(SysinfoMemory::new()))
    }

    fn gpu(&self) -> Result<Box<dyn GpuProvider>> {
        get_gpu_provider()
    }

    fn network(&self) -> Result<Box<dyn NetworkProbe>> {
        Ok(Box::new(SysinfoNetwork::new()))
    }

    fn disks(&self) -> Result<Box<dyn DiskProbe>> {
        Ok(Box::new(SystemDisks::new()?))
    }
}
