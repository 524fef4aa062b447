//! Live hardware monitoring engine.
//!
//! Sources are discovered once at startup, sampled together on a shared tick
//! and published as immutable snapshots. Rolling windows and counter rates
//! are the two primitives everything else builds on.

mod discovery;
mod history;
mod lifecycle;
mod metrics;
mod orchestrator;
pub mod probes;
mod rate;
mod runtime;
mod source;
pub mod sources;

pub use discovery::{discover, Discovery, Exclusion};
pub use history::{MetricHistory, RollingWindow, DEFAULT_HISTORY_SIZE};
pub use lifecycle::{Engine, Lifecycle, ShutdownReport};
pub use metrics::{
    readings, Availability, GpuVendor, MetricSourceKind, Reading, Sample, Snapshot, SourceId,
    SourceView, Tick,
};
pub use orchestrator::{Orchestrator, TickState, TickStats};
pub use probes::{
    CpuProbe, CpuReading, DiskCounterReader, DiskCounters, DiskProbe, GpuProvider, GpuReading,
    InterfaceKind, InterfaceStats, MemoryProbe, MemoryReading, NetworkProbe, Platform,
};
pub use rate::{bytes_to_kbps, CounterState, MIN_ELAPSED};
pub use runtime::{snapshot_once, MonitorRuntime};
pub use source::{MetricSource, SampleOutcome, SourceSlot};
