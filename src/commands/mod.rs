// Command handlers module
pub mod config;
pub mod monitor;
pub mod snapshot;
pub mod sources;
pub mod version;

use std::path::Path;

use anyhow::Result;
use clap::ArgMatches;

use crate::core::MonitorConfig;

// Re-exports for cleaner imports
pub use monitor::execute as monitor;
pub use snapshot::execute as snapshot;
pub use sources::execute as sources;
pub use version::execute as version;

/// Effective config: `--config` file or the default location, then flag overrides.
pub(crate) fn resolve_config(matches: &ArgMatches) -> Result<MonitorConfig> {
    let mut config = match matches
        .try_get_one::<String>("config")
        .ok()
        .flatten()
    {
        Some(path) => MonitorConfig::load_from(Path::new(path))?,
        None => MonitorConfig::load()?,
    };

    if let Ok(Some(interval)) = matches.try_get_one::<u64>("interval") {
        config.tick_interval_ms = *interval;
    }
    if let Ok(Some(interface)) = matches.try_get_one::<String>("interface") {
        config.preferred_interface = Some(interface.clone());
    }
    if matches.try_get_one::<bool>("no-gpu").ok().flatten() == Some(&true) {
        config.enable_gpu = false;
    }

    config.validate()?;
    Ok(config)
}
