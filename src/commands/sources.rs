//! `hwscope sources`: run discovery and list what was found.

use anyhow::Result;
use clap::ArgMatches;

use super::resolve_config;
use crate::core::monitor::Lifecycle;
use crate::platform::SystemPlatform;
use crate::ui::print_sources;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let mut config = resolve_config(matches)?;
    // listing needs no cold-start reading
    config.warm_up = false;

    let platform = SystemPlatform::new();
    let engine = Lifecycle::start(&platform, &config);

    print_sources(engine.orchestrator.active_ids(), &engine.excluded);

    let report = Lifecycle::shutdown(&engine.orchestrator);
    log::debug!("Shutdown report: {:?}", report);
    Ok(())
}
