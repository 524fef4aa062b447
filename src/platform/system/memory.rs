use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use crate::core::monitor::probes::{MemoryProbe, MemoryReading};
use crate::error::{HwError, Result};

pub struct SysinfoMemory {
    system: System,
}

impl SysinfoMemory {
    pub fn new() -> Self {
        let refresh_kind =
            RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram());
        Self {
            system: System::new_with_specifics(refresh_kind),
        }
    }
}

impl Default for SysinfoMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SysinfoMemory {
    fn read(&mut self) -> Result<MemoryReading> {
        self.system
            .refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram());

        let total_bytes = self.system.total_memory();
        if total_bytes == 0 {
            return Err(HwError::transient("total memory reported as zero"));
        }

        // used is derived from available, not sysinfo's used_memory(), so
        // reclaimable cache does not count as pressure
        Ok(MemoryReading {
            total_bytes,
            available_bytes: self.system.available_memory(),
        })
    }
}
