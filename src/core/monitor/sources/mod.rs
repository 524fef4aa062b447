//! Metric sources, one per hardware domain.

mod disk;
mod gpu;
mod memory;
mod network;
mod processor;

pub use disk::{is_aggregate_instance, DiskSource};
pub use gpu::GpuSource;
pub use memory::MemorySource;
pub use network::{select_interface, NetworkSource};
pub use processor::ProcessorSource;
