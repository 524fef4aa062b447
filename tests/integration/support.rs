//! Fake platform shared by the integration tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use hwscope::core::monitor::{
    CpuProbe, CpuReading, DiskCounterReader, DiskCounters, DiskProbe, GpuProvider, GpuReading,
    GpuVendor, InterfaceKind, InterfaceStats, MemoryProbe, MemoryReading, NetworkProbe, Platform,
};
use hwscope::error::{HwError, Result};
use hwscope::MonitorConfig;

/// Names of every resource closed, in order.
#[derive(Clone, Default)]
pub struct CloseLog(Arc<Mutex<Vec<String>>>);

impl CloseLog {
    pub fn record(&self, name: &str) {
        self.0.lock().unwrap().push(name.to_string());
    }

    pub fn count(&self, name: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|n| *n == name).count()
    }
}

/// Slows every disk read down and records how reads and closes interleave.
#[derive(Clone)]
pub struct ReadTracker {
    delay: Duration,
    reading: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    reads: Arc<AtomicUsize>,
    closed_during_read: Arc<AtomicUsize>,
    read_after_close: Arc<AtomicUsize>,
}

impl ReadTracker {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            reading: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
            reads: Arc::new(AtomicUsize::new(0)),
            closed_during_read: Arc::new(AtomicUsize::new(0)),
            read_after_close: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn is_reading(&self) -> bool {
        self.reading.load(Ordering::SeqCst)
    }

    /// Spin until a read is in progress.
    pub fn wait_for_read(&self) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !self.is_reading() {
            assert!(Instant::now() < deadline, "no disk read started");
            thread::sleep(Duration::from_millis(2));
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn closed_during_read(&self) -> usize {
        self.closed_during_read.load(Ordering::SeqCst)
    }

    pub fn read_after_close(&self) -> usize {
        self.read_after_close.load(Ordering::SeqCst)
    }

    fn read(&self) {
        if self.closed.load(Ordering::SeqCst) {
            self.read_after_close.fetch_add(1, Ordering::SeqCst);
        }
        self.reading.store(true, Ordering::SeqCst);
        self.reads.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        self.reading.store(false, Ordering::SeqCst);
    }

    fn close(&self) {
        if self.is_reading() {
            self.closed_during_read.fetch_add(1, Ordering::SeqCst);
        }
        self.closed.store(true, Ordering::SeqCst);
    }
}

pub struct FakePlatform {
    pub cores: usize,
    pub gpu_name: Option<String>,
    pub gpu_has_sensors: bool,
    pub interfaces: Vec<(String, InterfaceKind, bool)>,
    pub disks: Vec<String>,
    pub unopenable_disks: Vec<String>,
    pub failing_close_disks: Vec<String>,
    pub read_tracker: Option<ReadTracker>,
    pub closes: CloseLog,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            cores: 4,
            gpu_name: Some("Fake GPU 9000".to_string()),
            gpu_has_sensors: true,
            interfaces: vec![
                ("lo".to_string(), InterfaceKind::Loopback, true),
                ("eth0".to_string(), InterfaceKind::Wired, true),
            ],
            disks: vec!["0 C:".to_string(), "1 D:".to_string(), "_Total".to_string()],
            unopenable_disks: Vec::new(),
            failing_close_disks: Vec::new(),
            read_tracker: None,
            closes: CloseLog::default(),
        }
    }
}

/// Fast, deterministic settings for tests.
pub fn test_config() -> MonitorConfig {
    MonitorConfig {
        tick_interval_ms: 20,
        history_capacity: 10,
        warm_up: false,
        ..Default::default()
    }
}

struct FakeCpu {
    cores: usize,
}

impl CpuProbe for FakeCpu {
    fn refresh(&mut self) -> Result<CpuReading> {
        Ok(CpuReading {
            global_usage: 25.0,
            per_core_usage: vec![25.0; self.cores],
        })
    }
}

struct FakeMemory;

impl MemoryProbe for FakeMemory {
    fn read(&mut self) -> Result<MemoryReading> {
        Ok(MemoryReading {
            total_bytes: 16 << 30,
            available_bytes: 4 << 30,
        })
    }
}

struct FakeGpu {
    name: Option<String>,
    sensors: bool,
    closes: CloseLog,
}

impl GpuProvider for FakeGpu {
    fn vendor(&self) -> GpuVendor {
        GpuVendor::Nvidia
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn has_load_sensors(&self) -> bool {
        self.sensors
    }

    fn collect_metrics(&mut self) -> Result<GpuReading> {
        Ok(GpuReading {
            load_percent: 40.0,
            temperature_celsius: Some(60.0),
            memory_used_bytes: 2 << 30,
            memory_total_bytes: 8 << 30,
        })
    }
}

impl Drop for FakeGpu {
    fn drop(&mut self) {
        self.closes.record("gpu");
    }
}

struct FakeNetwork {
    interfaces: Vec<(String, InterfaceKind, bool)>,
    bytes: u64,
}

impl NetworkProbe for FakeNetwork {
    fn interfaces(&mut self) -> Result<Vec<InterfaceStats>> {
        self.bytes += 10_000;
        Ok(self
            .interfaces
            .iter()
            .map(|(name, kind, is_up)| InterfaceStats {
                name: name.clone(),
                kind: *kind,
                is_up: *is_up,
                bytes_received: self.bytes,
                bytes_sent: self.bytes / 2,
            })
            .collect())
    }
}

struct FakeDisks {
    instances: Vec<String>,
    unopenable: Vec<String>,
    failing_close: Vec<String>,
    tracker: Option<ReadTracker>,
    closes: CloseLog,
}

impl DiskProbe for FakeDisks {
    fn instances(&mut self) -> Result<Vec<String>> {
        Ok(self.instances.clone())
    }

    fn open(&mut self, instance: &str) -> Result<Box<dyn DiskCounterReader>> {
        if self.unopenable.iter().any(|d| d == instance) {
            return Err(HwError::source_unavailable(format!(
                "access denied to {}",
                instance
            )));
        }
        Ok(Box::new(FakeDiskReader {
            name: instance.to_string(),
            bytes: 0,
            fail_close: self.failing_close.iter().any(|d| d == instance),
            tracker: self.tracker.clone(),
            closes: self.closes.clone(),
        }))
    }
}

struct FakeDiskReader {
    name: String,
    bytes: u64,
    fail_close: bool,
    tracker: Option<ReadTracker>,
    closes: CloseLog,
}

impl DiskCounterReader for FakeDiskReader {
    fn read(&mut self) -> Result<DiskCounters> {
        if let Some(tracker) = &self.tracker {
            tracker.read();
        }
        self.bytes += 4096;
        Ok(DiskCounters {
            read_bytes: self.bytes,
            written_bytes: self.bytes / 2,
            busy_ms: Some(self.bytes / 4096),
        })
    }

    fn close(&mut self) -> Result<()> {
        if let Some(tracker) = &self.tracker {
            tracker.close();
        }
        self.closes.record(&self.name);
        if self.fail_close {
            Err(HwError::other(format!("{} refused to close", self.name)))
        } else {
            Ok(())
        }
    }
}

impl Platform for FakePlatform {
    fn processor(&self) -> Result<Box<dyn CpuProbe>> {
        Ok(Box::new(FakeCpu { cores: self.cores }))
    }

    fn memory(&self) -> Result<Box<dyn MemoryProbe>> {
        Ok(Box::new(FakeMemory))
    }

    fn gpu(&self) -> Result<Box<dyn GpuProvider>> {
        Ok(Box::new(FakeGpu {
            name: self.gpu_name.clone(),
            sensors: self.gpu_has_sensors,
            closes: self.closes.clone(),
        }))
    }

    fn network(&self) -> Result<Box<dyn NetworkProbe>> {
        Ok(Box::new(FakeNetwork {
            interfaces: self.interfaces.clone(),
            bytes: 0,
        }))
    }

    fn disks(&self) -> Result<Box<dyn DiskProbe>> {
        Ok(Box::new(FakeDisks {
            instances: self.disks.clone(),
            unopenable: self.unopenable_disks.clone(),
            failing_close: self.failing_close_disks.clone(),
            tracker: self.read_tracker.clone(),
            closes: self.closes.clone(),
        }))
    }
}
