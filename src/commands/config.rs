use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use crate::core::MonitorConfig;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => show(),
        Some(("path", _)) => path(),
        Some(("init", sub_matches)) => init(sub_matches.get_flag("force")),
        _ => {
            println!("Use 'hwscope config --help' for more information.");
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let config = MonitorConfig::load()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&config).context("Failed to serialize config")?
    );
    Ok(())
}

fn path() -> Result<()> {
    let path = MonitorConfig::get_config_path()?;
    println!("{}", path.display());
    Ok(())
}

fn init(force: bool) -> Result<()> {
    let path = MonitorConfig::get_config_path()?;

    if path.exists() && !force {
        println!(
            "{}",
            format!("Config already exists at {}", path.display()).yellow()
        );
        println!("{}", "Use --force to overwrite it with defaults.".dimmed());
        return Ok(());
    }

    MonitorConfig::default().save_to(&path)?;
    println!("{} {}", "✓ Default config written to:".green(), path.display());
    Ok(())
}
