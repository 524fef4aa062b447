use colored::{ColoredString, Colorize};
use humansize::{format_size, BINARY, DECIMAL};

use crate::core::monitor::readings;

const SPARK_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Format a byte count in human-readable form (KiB, MiB, GiB)
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, BINARY)
}

/// Format a throughput in bytes per second
pub fn format_bytes_per_sec(bytes_per_sec: f64) -> String {
    format!("{}/s", format_size(bytes_per_sec.max(0.0) as u64, DECIMAL))
}

/// Format a network rate given in kilobits per second
pub fn format_kbps(kbps: f64) -> String {
    if kbps >= 1000.0 {
        format!("{:.1} Mbps", kbps / 1000.0)
    } else {
        format!("{:.1} kbps", kbps)
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Render one reading according to its unit, inferred from the name.
pub fn format_reading(name: &str, value: f64) -> String {
    match name {
        readings::MEM_USED_BYTES | readings::MEM_TOTAL_BYTES | readings::MEM_AVAILABLE_BYTES => {
            format_bytes(value.max(0.0) as u64)
        }
        readings::NET_SEND | readings::NET_RECEIVE => format_kbps(value),
        readings::DISK_READ | readings::DISK_WRITE => format_bytes_per_sec(value),
        readings::GPU_TEMPERATURE => format!("{:.0}°C", value),
        _ if name.ends_with("_percent") => format_percent(value),
        _ => format!("{:.2}", value),
    }
}

/// Unicode sparkline of a rolling window, oldest value first.
///
/// With `max == None` the series is scaled to its own peak.
pub fn sparkline(values: &[f64], max: Option<f64>) -> String {
    let peak = max.unwrap_or_else(|| values.iter().copied().fold(0.0, f64::max));
    let top = SPARK_CHARS.len() - 1;

    values
        .iter()
        .map(|&v| {
            if peak <= 0.0 || !v.is_finite() {
                return SPARK_CHARS[0];
            }
            let level = ((v / peak).clamp(0.0, 1.0) * top as f64).round() as usize;
            SPARK_CHARS[level.min(top)]
        })
        .collect()
}

/// Color a percentage by load: green, then yellow at 70%, red from 85%.
pub fn colorize_load(text: &str, percent: f64) -> ColoredString {
    if percent >= 85.0 {
        text.red()
    } else if percent >= 70.0 {
        text.yellow()
    } else {
        text.green()
    }
}

/// Create a usage bar with block characters
pub fn usage_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64) as usize;
    let empty = width.saturating_sub(filled);
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(empty));
    format!("[{}]", colorize_load(&bar, percent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_kbps_switches_units() {
        assert_eq!(format_kbps(80.0), "80.0 kbps");
        assert_eq!(format_kbps(2500.0), "2.5 Mbps");
    }

    #[test]
    fn test_format_reading_by_name() {
        assert_eq!(format_reading(readings::CPU_USAGE, 42.0), "42.0%");
        assert_eq!(format_reading("core3_percent", 10.0), "10.0%");
        assert_eq!(format_reading(readings::GPU_TEMPERATURE, 64.4), "64°C");
        assert_eq!(format_reading(readings::NET_SEND, 80.0), "80.0 kbps");
        assert!(format_reading(readings::MEM_TOTAL_BYTES, 2048.0).contains("KiB"));
    }

    #[test]
    fn test_sparkline_scales_to_peak() {
        let line = sparkline(&[0.0, 50.0, 100.0], Some(100.0));
        assert_eq!(line.chars().count(), 3);
        assert_eq!(line.chars().next(), Some('▁'));
        assert_eq!(line.chars().last(), Some('█'));

        // auto-scaled, all zero
        assert_eq!(sparkline(&[0.0, 0.0], None), "▁▁");
    }

    #[test]
    fn test_usage_bar_width() {
        colored::control::set_override(false);
        assert_eq!(usage_bar(50.0, 4), "[██░░]");
        assert_eq!(usage_bar(150.0, 2), "[██]");
    }
}
