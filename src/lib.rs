// hwscope Library - Public API

// Re-export error types
pub mod error;
pub use error::{HwError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use crate::core::config::MonitorConfig;
pub use crate::core::monitor::{MonitorRuntime, Snapshot, SourceId};
pub use platform::SystemPlatform;

// Initialize logging
pub fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // a second init (tests, embedding) keeps the first logger
    let _ = builder.try_init();
}
