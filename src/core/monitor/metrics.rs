use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::history::MetricHistory;

/// Hardware domain a source samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSourceKind {
    Processor,
    Memory,
    GraphicsProcessor,
    NetworkInterface,
    Disk,
}

impl MetricSourceKind {
    pub fn short_name(&self) -> &'static str {
        match self {
            MetricSourceKind::Processor => "cpu",
            MetricSourceKind::Memory => "memory",
            MetricSourceKind::GraphicsProcessor => "gpu",
            MetricSourceKind::NetworkInterface => "network",
            MetricSourceKind::Disk => "disk",
        }
    }
}

impl fmt::Display for MetricSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Identity of a metric source: its kind plus an instance for multi-instance kinds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId {
    pub kind: MetricSourceKind,
    pub instance: Option<String>,
}

impl SourceId {
    pub fn singleton(kind: MetricSourceKind) -> Self {
        Self {
            kind,
            instance: None,
        }
    }

    pub fn instance<S: Into<String>>(kind: MetricSourceKind, instance: S) -> Self {
        Self {
            kind,
            instance: Some(instance.into()),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.instance {
            Some(instance) => write!(f, "{}:{}", self.kind, instance),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl Serialize for SourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Active,
    Unavailable,
}

/// Reading names published by each kind of source.
pub mod readings {
    pub const CPU_USAGE: &str = "usage_percent";

    pub const MEM_USED_PERCENT: &str = "used_percent";
    pub const MEM_USED_BYTES: &str = "used_bytes";
    pub const MEM_TOTAL_BYTES: &str = "total_bytes";
    pub const MEM_AVAILABLE_BYTES: &str = "available_bytes";

    pub const GPU_LOAD: &str = "load_percent";
    pub const GPU_TEMPERATURE: &str = "temperature_celsius";
    pub const GPU_MEMORY: &str = "memory_used_percent";

    pub const NET_SEND: &str = "send_kbps";
    pub const NET_RECEIVE: &str = "receive_kbps";

    pub const DISK_READ: &str = "read_bytes_per_sec";
    pub const DISK_WRITE: &str = "write_bytes_per_sec";
    pub const DISK_BUSY: &str = "busy_percent";

    /// Per-core processor reading name.
    pub fn cpu_core(index: usize) -> String {
        format!("core{}_percent", index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub name: String,
    pub value: f64,
}

/// One sampling result: named scalar readings at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub readings: Vec<Reading>,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            readings: Vec::new(),
        }
    }

    /// Builder-style append.
    pub fn with<S: Into<String>>(mut self, name: S, value: f64) -> Self {
        self.readings.push(Reading {
            name: name.into(),
            value,
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.readings
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.value)
    }

    /// All-zero sample with the given reading names, used before a source's first tick.
    pub fn zeroed<'a, I>(timestamp: DateTime<Utc>, names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .fold(Self::new(timestamp), |sample, name| sample.with(name, 0.0))
    }
}

/// One scheduled sampling cycle. Every source sampled in a tick sees the same instant.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    pub seq: u64,
    pub at: Instant,
    pub wall: DateTime<Utc>,
}

impl Tick {
    pub fn now(seq: u64) -> Self {
        Self {
            seq,
            at: Instant::now(),
            wall: Utc::now(),
        }
    }
}

/// Presentation view of a single source within a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SourceView {
    pub id: SourceId,
    pub label: String,
    pub availability: Availability,
    pub latest: Sample,
    pub history: Arc<MetricHistory>,
}

/// Complete set of latest samples and windows, built once per tick.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub seq: u64,
    pub taken_at: DateTime<Utc>,
    pub sources: Vec<SourceView>,
}

impl Snapshot {
    pub fn get(&self, id: &SourceId) -> Option<&SourceView> {
        self.sources.iter().find(|view| &view.id == id)
    }

    pub fn of_kind(&self, kind: MetricSourceKind) -> impl Iterator<Item = &SourceView> + '_ {
        self.sources.iter().filter(move |view| view.id.kind == kind)
    }

    pub fn ids(&self) -> Vec<SourceId> {
        self.sources.iter().map(|view| view.id.clone()).collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GpuVendor {
    Nvidia,
    Amd,
}
