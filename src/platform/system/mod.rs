//! CPU, memory, network and disk probes backed by sysinfo and procfs.

mod cpu;
mod disk;
mod memory;
mod network;

pub use cpu::SysinfoCpu;
pub use disk::SystemDisks;
pub use memory::SysinfoMemory;
pub use network::SysinfoNetwork;

#[cfg(target_os = "linux")]
pub use disk::{parse_diskstats, DiskStatLine};
pub use network::classify_by_name;
