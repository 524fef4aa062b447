use hwscope::core::monitor::{discover, InterfaceKind, MetricSourceKind, Orchestrator, SourceId};
use hwscope::MonitorConfig;

use super::support::{test_config, FakePlatform};

fn ids(platform: &FakePlatform, config: &MonitorConfig) -> Vec<SourceId> {
    let discovery = discover(platform, config);
    discovery.sources.iter().map(|s| s.id()).collect()
}

#[test]
fn test_discovery_order_and_aggregate_disk_filtered() {
    let platform = FakePlatform::default();
    let ids = ids(&platform, &test_config());

    assert_eq!(
        ids,
        vec![
            SourceId::singleton(MetricSourceKind::Processor),
            SourceId::singleton(MetricSourceKind::Memory),
            SourceId::singleton(MetricSourceKind::GraphicsProcessor),
            SourceId::instance(MetricSourceKind::NetworkInterface, "eth0"),
            SourceId::instance(MetricSourceKind::Disk, "0 C:"),
            SourceId::instance(MetricSourceKind::Disk, "1 D:"),
        ]
    );
}

#[test]
fn test_only_total_disk_yields_no_disk_sources() {
    let platform = FakePlatform {
        disks: vec!["_Total".to_string()],
        ..Default::default()
    };
    let discovery = discover(&platform, &test_config());
    assert!(!discovery.kinds().contains(&MetricSourceKind::Disk));
}

#[test]
fn test_gpu_without_sensors_is_excluded_and_released() {
    let platform = FakePlatform {
        gpu_has_sensors: false,
        ..Default::default()
    };
    let discovery = discover(&platform, &test_config());

    assert!(!discovery
        .kinds()
        .contains(&MetricSourceKind::GraphicsProcessor));
    assert!(discovery
        .excluded
        .iter()
        .any(|e| e.kind == MetricSourceKind::GraphicsProcessor));
    assert_eq!(platform.closes.count("gpu"), 1);
}

#[test]
fn test_gpu_with_blank_name_is_excluded() {
    let platform = FakePlatform {
        gpu_name: Some("   ".to_string()),
        ..Default::default()
    };
    let discovery = discover(&platform, &test_config());
    assert!(!discovery
        .kinds()
        .contains(&MetricSourceKind::GraphicsProcessor));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_excluded_gpu_never_appears_in_snapshots() {
    let platform = FakePlatform {
        gpu_has_sensors: false,
        ..Default::default()
    };
    let config = test_config();
    let discovery = discover(&platform, &config);
    let orchestrator = Orchestrator::new(discovery.sources, config.history_capacity);

    for _ in 0..3 {
        let snapshot = orchestrator.try_tick().await.expect("tick should run");
        assert_eq!(
            snapshot
                .of_kind(MetricSourceKind::GraphicsProcessor)
                .count(),
            0
        );
        assert_eq!(snapshot.ids(), orchestrator.active_ids());
    }
}

#[test]
fn test_unopenable_disk_does_not_affect_others() {
    let platform = FakePlatform {
        unopenable_disks: vec!["1 D:".to_string()],
        ..Default::default()
    };
    let discovery = discover(&platform, &test_config());
    let disks: Vec<SourceId> = discovery
        .sources
        .iter()
        .map(|s| s.id())
        .filter(|id| id.kind == MetricSourceKind::Disk)
        .collect();

    assert_eq!(disks, vec![SourceId::instance(MetricSourceKind::Disk, "0 C:")]);

    let exclusion = discovery
        .excluded
        .iter()
        .find(|e| e.kind == MetricSourceKind::Disk)
        .expect("disk exclusion recorded");
    assert_eq!(exclusion.instance.as_deref(), Some("1 D:"));
    assert!(exclusion.reason.contains("access denied"));
}

#[test]
fn test_no_interface_up_excludes_network() {
    let platform = FakePlatform {
        interfaces: vec![("eth0".to_string(), InterfaceKind::Wired, false)],
        ..Default::default()
    };
    let discovery = discover(&platform, &test_config());
    assert!(!discovery
        .kinds()
        .contains(&MetricSourceKind::NetworkInterface));
}

#[test]
fn test_preferred_interface_wins() {
    let platform = FakePlatform {
        interfaces: vec![
            ("eth0".to_string(), InterfaceKind::Wired, true),
            ("wlan0".to_string(), InterfaceKind::Wireless, true),
        ],
        ..Default::default()
    };
    let config = MonitorConfig {
        preferred_interface: Some("wlan0".to_string()),
        ..test_config()
    };

    assert!(ids(&platform, &config)
        .contains(&SourceId::instance(MetricSourceKind::NetworkInterface, "wlan0")));
}

#[test]
fn test_disabled_kinds_are_reported() {
    let platform = FakePlatform::default();
    let config = MonitorConfig {
        enable_gpu: false,
        enable_network: false,
        enable_disks: false,
        ..test_config()
    };
    let discovery = discover(&platform, &config);

    assert_eq!(
        discovery.kinds(),
        vec![MetricSourceKind::Processor, MetricSourceKind::Memory]
    );
    assert_eq!(discovery.excluded.len(), 3);
    assert!(discovery
        .excluded
        .iter()
        .all(|e| e.reason == "disabled by config"));
}
