//! `hwscope snapshot`: warm up, take a single tick and print it.

use anyhow::{Context, Result};
use clap::ArgMatches;

use super::resolve_config;
use crate::core::monitor::snapshot_once;
use crate::platform::SystemPlatform;
use crate::ui::print_snapshot;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = resolve_config(matches)?;
    let json_output = matches.get_flag("json");

    let (snapshot, report) =
        snapshot_once(&SystemPlatform::new(), &config).context("Failed to take snapshot")?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }

    log::debug!("Shutdown report: {:?}", report);
    Ok(())
}
