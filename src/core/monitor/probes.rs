//! Platform capabilities the engine consumes.
//!
//! Each trait is the narrow query a metric source needs. Implementations live
//! in the platform layer; tests plug in fakes through [`Platform`].

use super::metrics::GpuVendor;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuReading {
    pub global_usage: f32,
    pub per_core_usage: Vec<f32>,
}

/// Processor utilization query.
pub trait CpuProbe: Send {
    /// Refresh counters and return utilization since the previous refresh.
    fn refresh(&mut self) -> Result<CpuReading>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemoryReading {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl MemoryReading {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.available_bytes)
    }

    pub fn used_percent(&self) -> f64 {
        if self.total_bytes > 0 {
            self.used_bytes() as f64 / self.total_bytes as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Memory usage query.
pub trait MemoryProbe: Send {
    fn read(&mut self) -> Result<MemoryReading>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuReading {
    pub load_percent: f32,
    pub temperature_celsius: Option<f32>,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
}

impl GpuReading {
    pub fn memory_percent(&self) -> f64 {
        if self.memory_total_bytes > 0 {
            self.memory_used_bytes as f64 / self.memory_total_bytes as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Trait for GPU sensor providers
///
/// This trait abstracts GPU monitoring across different vendors (NVIDIA, AMD).
/// Implementations are provided in the platform layer.
pub trait GpuProvider: Send {
    /// Get the vendor of the GPU
    fn vendor(&self) -> GpuVendor;

    /// Human-readable device name, if the driver reports one
    fn name(&self) -> Option<String>;

    /// Whether the device exposes load and temperature sensors
    fn has_load_sensors(&self) -> bool;

    /// Collect current GPU sensor values
    fn collect_metrics(&mut self) -> Result<GpuReading>;
}

/// Link type of a network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    Wired,
    Wireless,
    Loopback,
    Virtual,
    Unknown,
}

impl InterfaceKind {
    pub fn is_physical(&self) -> bool {
        matches!(self, InterfaceKind::Wired | InterfaceKind::Wireless)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceStats {
    pub name: String,
    pub kind: InterfaceKind,
    pub is_up: bool,
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

/// Network interface statistics query.
pub trait NetworkProbe: Send {
    fn interfaces(&mut self) -> Result<Vec<InterfaceStats>>;
}

/// Cumulative counters of one physical disk.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiskCounters {
    pub read_bytes: u64,
    pub written_bytes: u64,
    /// Milliseconds spent doing I/O, when the platform tracks it.
    pub busy_ms: Option<u64>,
}

/// Open handle on one disk's performance counters.
pub trait DiskCounterReader: Send {
    fn read(&mut self) -> Result<DiskCounters>;

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Disk instance enumeration plus per-instance counter access.
pub trait DiskProbe: Send {
    /// Every performance instance, including any aggregate pseudo-instance.
    fn instances(&mut self) -> Result<Vec<String>>;

    fn open(&mut self, instance: &str) -> Result<Box<dyn DiskCounterReader>>;
}

/// Factory for every capability. Discovery opens each one once.
pub trait Platform: Send + Sync {
    fn processor(&self) -> Result<Box<dyn CpuProbe>>;
    fn memory(&self) -> Result<Box<dyn MemoryProbe>>;
    fn gpu(&self) -> Result<Box<dyn GpuProvider>>;
    fn network(&self) -> Result<Box<dyn NetworkProbe>>;
    fn disks(&self) -> Result<Box<dyn DiskProbe>>;
}
