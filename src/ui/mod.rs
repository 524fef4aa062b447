// UI and formatting module

pub mod formatters;
pub mod monitor_view;

// Re-export commonly used items for cleaner imports
pub use formatters::{format_bytes, format_reading, sparkline, usage_bar};
pub use monitor_view::{print_snapshot, print_sources, print_summary};
