//! Text rendering of snapshots for the terminal.

use chrono::Local;
use colored::Colorize;

use super::formatters::{colorize_load, format_reading, sparkline, usage_bar};
use crate::core::monitor::{
    readings, Availability, Exclusion, MetricSourceKind, ShutdownReport, Snapshot, SourceId,
    SourceView, TickStats,
};

const BAR_WIDTH: usize = 20;

/// Reading charted for each kind, and whether it is a 0..100 percentage.
fn primary_reading(kind: MetricSourceKind) -> (&'static str, bool) {
    match kind {
        MetricSourceKind::Processor => (readings::CPU_USAGE, true),
        MetricSourceKind::Memory => (readings::MEM_USED_PERCENT, true),
        MetricSourceKind::GraphicsProcessor => (readings::GPU_LOAD, true),
        MetricSourceKind::NetworkInterface => (readings::NET_RECEIVE, false),
        MetricSourceKind::Disk => (readings::DISK_BUSY, true),
    }
}

fn is_core_reading(name: &str) -> bool {
    name.starts_with("core") && name.ends_with("_percent")
}

pub fn print_snapshot(snapshot: &Snapshot) {
    let local = snapshot.taken_at.with_timezone(&Local);
    println!(
        "{}",
        format!("── tick {} · {} ──", snapshot.seq, local.format("%H:%M:%S")).bold()
    );

    for view in &snapshot.sources {
        print_view(view);
    }
    println!();
}

fn print_view(view: &SourceView) {
    let (primary, is_percent) = primary_reading(view.id.kind);
    let value = view.latest.get(primary).unwrap_or(0.0);

    let mut header = format!("{:<10} {}", view.id.kind.to_string().cyan().bold(), view.label);
    if view.availability == Availability::Unavailable {
        header.push_str(&format!(" {}", "(unavailable)".red()));
    }
    println!("{}", header);

    let window = view
        .history
        .window(primary)
        .map(|w| w.values())
        .unwrap_or_default();
    let spark = sparkline(&window, is_percent.then_some(100.0));

    if is_percent {
        println!(
            "  {} {} {}",
            usage_bar(value, BAR_WIDTH),
            colorize_load(&format_reading(primary, value), value),
            spark.dimmed()
        );
    } else {
        println!("  {} {}", format_reading(primary, value), spark.dimmed());
    }

    let details: Vec<String> = view
        .latest
        .readings
        .iter()
        .filter(|r| r.name != primary && !is_core_reading(&r.name))
        .map(|r| format!("{} {}", r.name.dimmed(), format_reading(&r.name, r.value)))
        .collect();
    if !details.is_empty() {
        println!("  {}", details.join("  "));
    }

    let cores: Vec<String> = view
        .latest
        .readings
        .iter()
        .filter(|r| is_core_reading(&r.name))
        .map(|r| format!("{:>5.1}", r.value))
        .collect();
    if !cores.is_empty() {
        println!("  {} {}", "cores".dimmed(), cores.join(" "));
    }
}

/// Active sources followed by what discovery left out.
pub fn print_sources(active: &[SourceId], excluded: &[Exclusion]) {
    println!("{}", "Active sources".bold().green());
    for id in active {
        println!("  {} {}", "✓".green(), id);
    }

    if !excluded.is_empty() {
        println!();
        println!("{}", "Excluded".bold().yellow());
        for exclusion in excluded {
            let id = match &exclusion.instance {
                Some(instance) => SourceId::instance(exclusion.kind, instance.clone()),
                None => SourceId::singleton(exclusion.kind),
            };
            println!("  {} {} {}", "✗".yellow(), id, exclusion.reason.dimmed());
        }
    }
}

pub fn print_summary(stats: &TickStats, report: &ShutdownReport) {
    println!(
        "{}",
        format!(
            "{} tick(s), {} skipped, {} transient failure(s), {} source(s) closed",
            stats.completed, stats.skipped, stats.transient_failures, report.closed
        )
        .dimmed()
    );
    for (id, reason) in &report.failures {
        println!("  {} {}: {}", "!".red(), id, reason);
    }
}
