//! Live monitor command handler.
//!
//! Prints one block (or one JSON line) per snapshot until the tick budget is
//! spent or Ctrl+C is pressed, then shuts the engine down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use super::resolve_config;
use crate::core::monitor::MonitorRuntime;
use crate::ui::{print_snapshot, print_summary};

/// Longest the foreground loop waits for a snapshot before rechecking Ctrl+C.
const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(250);

/// Execute the monitor command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = resolve_config(matches)?;
    let max_ticks = matches.get_one::<u64>("ticks").copied();
    let json_output = matches.get_flag("json");

    let cancel_flag = Arc::new(AtomicBool::new(false));
    let cancel_flag_clone = cancel_flag.clone();

    // Setup Ctrl+C handler
    ctrlc::set_handler(move || {
        cancel_flag_clone.store(true, Ordering::Relaxed);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let runtime = MonitorRuntime::start(config).context("Failed to start monitor")?;

    if !json_output {
        println!(
            "{}",
            format!(
                "Monitoring {} source(s). Press Ctrl+C to stop.",
                runtime.active_ids().len()
            )
            .dimmed()
        );
    }

    let mut updates = runtime.subscribe();
    let mut printed = 0u64;

    while !cancel_flag.load(Ordering::Relaxed) {
        if max_ticks.is_some_and(|max| printed >= max) {
            break;
        }

        match runtime.wait_for_update(&mut updates, CANCEL_CHECK_INTERVAL) {
            Ok(true) => {
                let snapshot = updates.borrow_and_update().clone();
                if json_output {
                    println!("{}", serde_json::to_string(&*snapshot)?);
                } else {
                    print_snapshot(&snapshot);
                }
                printed += 1;
            }
            Ok(false) => {}
            Err(e) => {
                log::warn!("{}", e);
                break;
            }
        }
    }

    let stats = runtime.stats();
    let report = runtime.shutdown();
    log::debug!("Shutdown report: {:?}", report);

    if !json_output {
        print_summary(&stats, &report);
    }
    Ok(())
}
