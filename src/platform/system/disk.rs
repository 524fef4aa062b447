//! Physical disk enumeration and cumulative I/O counters.
//!
//! Linux reads `/proc/diskstats`, which also tracks time spent doing I/O.
//! Other platforms use `sysinfo::Disks`, which has no busy time.

use crate::core::monitor::probes::{DiskCounterReader, DiskCounters, DiskProbe};
use crate::error::{HwError, Result};

/// Pseudo-instance summing every physical disk.
pub const TOTAL_INSTANCE: &str = "_Total";

#[cfg(target_os = "linux")]
pub use linux::{parse_diskstats, DiskStatLine, SystemDisks};
#[cfg(not(target_os = "linux"))]
pub use fallback::SystemDisks;

fn sum_counters<I: IntoIterator<Item = DiskCounters>>(counters: I) -> DiskCounters {
    counters
        .into_iter()
        .fold(DiskCounters::default(), |acc, c| DiskCounters {
            read_bytes: acc.read_bytes.saturating_add(c.read_bytes),
            written_bytes: acc.written_bytes.saturating_add(c.written_bytes),
            busy_ms: match (acc.busy_ms, c.busy_ms) {
                (None, None) => None,
                (a, b) => Some(a.unwrap_or(0).saturating_add(b.unwrap_or(0))),
            },
        })
}

#[cfg(target_os = "linux")]
mod linux {
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::*;

    const DISKSTATS: &str = "/proc/diskstats";
    /// diskstats always counts 512-byte sectors, whatever the device uses
    const SECTOR_SIZE: u64 = 512;

    /// One whole-device row of `/proc/diskstats`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DiskStatLine {
        pub name: String,
        pub sectors_read: u64,
        pub sectors_written: u64,
        pub io_ms: u64,
    }

    impl DiskStatLine {
        fn counters(&self) -> DiskCounters {
            DiskCounters {
                read_bytes: self.sectors_read.saturating_mul(SECTOR_SIZE),
                written_bytes: self.sectors_written.saturating_mul(SECTOR_SIZE),
                busy_ms: Some(self.io_ms),
            }
        }
    }

    /// Parse whole physical devices; partitions and virtual block devices are skipped.
    pub fn parse_diskstats(content: &str) -> Vec<DiskStatLine> {
        content
            .lines()
            .filter_map(|line| {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < 14 {
                    return None;
                }
                let name = parts[2];
                if !is_whole_disk(name) {
                    return None;
                }
                Some(DiskStatLine {
                    name: name.to_string(),
                    sectors_read: parts[5].parse().ok()?,
                    sectors_written: parts[9].parse().ok()?,
                    io_ms: parts[12].parse().ok()?,
                })
            })
            .collect()
    }

    fn is_whole_disk(name: &str) -> bool {
        const VIRTUAL: &[&str] = &["loop", "ram", "dm-", "md", "zram", "sr", "fd", "nbd"];
        if VIRTUAL.iter().any(|p| name.starts_with(p)) {
            return false;
        }
        if name.starts_with("nvme") || name.starts_with("mmcblk") {
            // nvme0n1p2, mmcblk0p1
            return !name.contains('p');
        }
        !name.chars().last().is_some_and(|c| c.is_ascii_digit())
    }

    fn read_table(path: &Path) -> Result<Vec<DiskStatLine>> {
        let content = fs::read_to_string(path)?;
        Ok(parse_diskstats(&content))
    }

    pub struct SystemDisks {
        path: PathBuf,
    }

    impl SystemDisks {
        pub fn new() -> Result<Self> {
            Self::with_path(DISKSTATS)
        }

        pub fn with_path<P: Into<PathBuf>>(path: P) -> Result<Self> {
            let path = path.into();
            if !path.exists() {
                return Err(HwError::source_unavailable(format!(
                    "{} not found",
                    path.display()
                )));
            }
            Ok(Self { path })
        }
    }

    impl DiskProbe for SystemDisks {
        fn instances(&mut self) -> Result<Vec<String>> {
            let mut names: Vec<String> = read_table(&self.path)?
                .into_iter()
                .map(|line| line.name)
                .collect();
            names.push(TOTAL_INSTANCE.to_string());
            Ok(names)
        }

        fn open(&mut self, instance: &str) -> Result<Box<dyn DiskCounterReader>> {
            let known = instance == TOTAL_INSTANCE
                || read_table(&self.path)?.iter().any(|l| l.name == instance);
            if !known {
                return Err(HwError::source_unavailable(format!(
                    "disk {} not listed",
                    instance
                )));
            }

            Ok(Box::new(ProcDiskReader {
                path: self.path.clone(),
                instance: instance.to_string(),
            }))
        }
    }

    struct ProcDiskReader {
        path: PathBuf,
        instance: String,
    }

    impl DiskCounterReader for ProcDiskReader {
        fn read(&mut self) -> Result<DiskCounters> {
            let table = read_table(&self.path)?;

            if self.instance == TOTAL_INSTANCE {
                return Ok(sum_counters(table.iter().map(DiskStatLine::counters)));
            }

            table
                .iter()
                .find(|line| line.name == self.instance)
                .map(DiskStatLine::counters)
                .ok_or_else(|| {
                    HwError::fatal_resource(format!("disk {} disappeared", self.instance))
                })
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod fallback {
    use std::path::{Path, PathBuf};

    use sysinfo::{Disk, Disks};

    use super::*;

    fn instance_name(index: usize, disk: &Disk) -> String {
        let mount = disk.mount_point().to_string_lossy();
        let trimmed = mount.trim_end_matches(['\\', '/']);
        format!(
            "{} {}",
            index,
            if trimmed.is_empty() { &*mount } else { trimmed }
        )
    }

    fn disk_counters(disk: &Disk) -> DiskCounters {
        let usage = disk.usage();
        DiskCounters {
            read_bytes: usage.total_read_bytes,
            written_bytes: usage.total_written_bytes,
            busy_ms: None,
        }
    }

    pub struct SystemDisks {
        disks: Disks,
    }

    impl SystemDisks {
        pub fn new() -> Result<Self> {
            Ok(Self {
                disks: Disks::new_with_refreshed_list(),
            })
        }
    }

    impl DiskProbe for SystemDisks {
        fn instances(&mut self) -> Result<Vec<String>> {
            self.disks.refresh(true);
            let mut names: Vec<String> = self
                .disks
                .iter()
                .enumerate()
                .map(|(i, disk)| instance_name(i, disk))
                .collect();
            names.push(TOTAL_INSTANCE.to_string());
            Ok(names)
        }

        fn open(&mut self, instance: &str) -> Result<Box<dyn DiskCounterReader>> {
            let mount_point = if instance == TOTAL_INSTANCE {
                None
            } else {
                let disk = self
                    .disks
                    .iter()
                    .enumerate()
                    .find(|(i, disk)| instance_name(*i, disk) == instance)
                    .map(|(_, disk)| disk)
                    .ok_or_else(|| {
                        HwError::source_unavailable(format!("disk {} not listed", instance))
                    })?;
                Some(disk.mount_point().to_path_buf())
            };

            Ok(Box::new(SysinfoDiskReader {
                disks: Disks::new_with_refreshed_list(),
                instance: instance.to_string(),
                mount_point,
            }))
        }
    }

    struct SysinfoDiskReader {
        disks: Disks,
        instance: String,
        /// `None` for the total pseudo-instance
        mount_point: Option<PathBuf>,
    }

    impl SysinfoDiskReader {
        fn find(&self, mount_point: &Path) -> Option<&Disk> {
            self.disks.iter().find(|d| d.mount_point() == mount_point)
        }
    }

    impl DiskCounterReader for SysinfoDiskReader {
        fn read(&mut self) -> Result<DiskCounters> {
            self.disks.refresh(true);

            match &self.mount_point {
                None => Ok(sum_counters(self.disks.iter().map(disk_counters))),
                Some(mount_point) => self.find(mount_point).map(disk_counters).ok_or_else(|| {
                    HwError::fatal_resource(format!("disk {} disappeared", self.instance))
                }),
            }
        }
    }
}
