//! Interface enumeration and classification.
//!
//! Counters come from `sysinfo::Networks`. On Linux the link type and state
//! are read from `/sys/class/net`; elsewhere the interface name is the only
//! hint available.

use std::path::Path;

use sysinfo::Networks;

use crate::core::monitor::probes::{InterfaceKind, InterfaceStats, NetworkProbe};
use crate::error::{HwError, Result};

#[cfg(target_os = "linux")]
const SYSFS_NET: &str = "/sys/class/net";

/// ARPHRD_LOOPBACK from if_arp.h
const ARPHRD_LOOPBACK: u32 = 772;
/// ARPHRD_ETHER
const ARPHRD_ETHER: u32 = 1;
const IFF_UP: u32 = 0x1;

pub struct SysinfoNetwork {
    networks: Networks,
}

impl SysinfoNetwork {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkProbe for SysinfoNetwork {
    fn interfaces(&mut self) -> Result<Vec<InterfaceStats>> {
        self.networks.refresh(true);

        if self.networks.is_empty() {
            return Err(HwError::transient("no network interfaces reported"));
        }

        Ok(self
            .networks
            .iter()
            .map(|(name, data)| {
                let (kind, is_up) = interface_state(name);
                InterfaceStats {
                    name: name.to_string(),
                    kind,
                    is_up,
                    bytes_received: data.total_received(),
                    bytes_sent: data.total_transmitted(),
                }
            })
            .collect())
    }
}

#[cfg(target_os = "linux")]
fn interface_state(name: &str) -> (InterfaceKind, bool) {
    read_sysfs_state(Path::new(SYSFS_NET), name).unwrap_or_else(|| (classify_by_name(name), true))
}

#[cfg(not(target_os = "linux"))]
fn interface_state(name: &str) -> (InterfaceKind, bool) {
    // sysinfo only lists interfaces the OS reports as present
    (classify_by_name(name), true)
}

/// Link type and up state from a sysfs `class/net` tree.
///
/// Returns `None` when the interface directory is missing.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(crate) fn read_sysfs_state(root: &Path, name: &str) -> Option<(InterfaceKind, bool)> {
    let dir = root.join(name);
    if !dir.is_dir() {
        return None;
    }

    let read = |file: &str| {
        std::fs::read_to_string(dir.join(file))
            .ok()
            .map(|s| s.trim().to_string())
    };

    let link_type = read("type").and_then(|t| t.parse::<u32>().ok());
    let kind = if link_type == Some(ARPHRD_LOOPBACK) {
        InterfaceKind::Loopback
    } else if dir.join("wireless").exists() || dir.join("phy80211").exists() {
        InterfaceKind::Wireless
    } else if !dir.join("device").exists() {
        // bridges, veth pairs, tunnels: no backing device
        InterfaceKind::Virtual
    } else if link_type == Some(ARPHRD_ETHER) {
        InterfaceKind::Wired
    } else {
        InterfaceKind::Unknown
    };

    let is_up = match read("operstate").as_deref() {
        Some("up") => true,
        // loopback and many tunnels never report a real operstate
        Some("unknown") => read("flags")
            .and_then(|f| u32::from_str_radix(f.trim_start_matches("0x"), 16).ok())
            .is_some_and(|flags| flags & IFF_UP != 0),
        _ => false,
    };

    Some((kind, is_up))
}

/// Best-effort link type from the interface name alone.
pub fn classify_by_name(name: &str) -> InterfaceKind {
    let lower = name.to_ascii_lowercase();

    if lower == "lo" || lower.starts_with("lo0") || lower.contains("loopback") {
        return InterfaceKind::Loopback;
    }

    const VIRTUAL_PREFIXES: &[&str] = &[
        "docker", "veth", "br-", "virbr", "vethernet", "vmnet", "vboxnet", "tun", "tap", "utun",
        "awdl", "llw", "bridge", "zt", "tailscale", "wg",
    ];
    if VIRTUAL_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return InterfaceKind::Virtual;
    }

    if lower.starts_with("wl") || lower.contains("wi-fi") || lower.contains("wireless") {
        return InterfaceKind::Wireless;
    }

    if lower.starts_with("en") || lower.starts_with("eth") || lower.contains("ethernet") {
        return InterfaceKind::Wired;
    }

    InterfaceKind::Unknown
}
