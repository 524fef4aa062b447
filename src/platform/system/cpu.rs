use sysinfo::{CpuRefreshKind, RefreshKind, System};

use crate::core::monitor::probes::{CpuProbe, CpuReading};
use crate::error::{HwError, Result};

/// Processor utilization through a dedicated `sysinfo::System`.
pub struct SysinfoCpu {
    system: System,
}

impl SysinfoCpu {
    pub fn new() -> Self {
        let refresh_kind =
            RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing().with_cpu_usage());
        Self {
            system: System::new_with_specifics(refresh_kind),
        }
    }
}

impl Default for SysinfoCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuProbe for SysinfoCpu {
    fn refresh(&mut self) -> Result<CpuReading> {
        self.system.refresh_cpu_usage();

        let cpus = self.system.cpus();
        if cpus.is_empty() {
            return Err(HwError::transient("no processors reported"));
        }

        Ok(CpuReading {
            global_usage: self.system.global_cpu_usage(),
            per_core_usage: cpus.iter().map(|cpu| cpu.cpu_usage()).collect(),
        })
    }
}
