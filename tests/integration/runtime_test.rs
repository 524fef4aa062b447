use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use hwscope::core::monitor::{
    readings, snapshot_once, Lifecycle, MetricSourceKind, MonitorRuntime, SourceId,
};
use hwscope::error::HwError;
use hwscope::MonitorConfig;

use super::support::{test_config, FakePlatform, ReadTracker};

fn wait_for_seq(runtime: &MonitorRuntime, seq: u64) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while runtime.latest().seq < seq {
        assert!(Instant::now() < deadline, "timed out waiting for tick {}", seq);
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn test_runtime_ticks_and_closes_every_source_once() {
    let platform = Arc::new(FakePlatform::default());
    let closes = platform.closes.clone();

    let runtime = MonitorRuntime::start_with_platform(platform, test_config()).unwrap();
    assert_eq!(runtime.active_ids().len(), 6);

    wait_for_seq(&runtime, 3);

    let snapshot = runtime.latest();
    assert_eq!(snapshot.ids(), runtime.active_ids());
    for view in &snapshot.sources {
        assert_eq!(view.history.capacity(), 10);
        for reading in &view.latest.readings {
            assert!(reading.value >= 0.0, "{} {} negative", view.id, reading.name);
        }
    }

    let report = runtime.shutdown();
    assert!(report.is_clean());
    assert_eq!(report.closed, 6);
    assert_eq!(closes.count("0 C:"), 1);
    assert_eq!(closes.count("1 D:"), 1);
    assert_eq!(closes.count("gpu"), 1);
    assert_eq!(closes.count("_Total"), 0);
}

fn slow_disk_platform(tracker: &ReadTracker) -> Arc<FakePlatform> {
    Arc::new(FakePlatform {
        disks: vec!["0 C:".to_string(), "_Total".to_string()],
        read_tracker: Some(tracker.clone()),
        ..Default::default()
    })
}

#[test]
fn test_shutdown_waits_for_in_flight_read() {
    let tracker = ReadTracker::new(Duration::from_millis(300));
    let platform = slow_disk_platform(&tracker);
    let closes = platform.closes.clone();

    let runtime = MonitorRuntime::start_with_platform(platform, test_config()).unwrap();
    tracker.wait_for_read();
    let report = runtime.shutdown();

    assert!(report.is_clean());
    assert!(!tracker.is_reading());
    assert_eq!(tracker.closed_during_read(), 0);
    assert_eq!(tracker.read_after_close(), 0);
    assert_eq!(closes.count("0 C:"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_inside_async_context_waits_for_in_flight_read() {
    let tracker = ReadTracker::new(Duration::from_millis(300));
    let platform = slow_disk_platform(&tracker);
    let closes = platform.closes.clone();

    let runtime = MonitorRuntime::start_with_platform(platform, test_config()).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while !tracker.is_reading() {
        assert!(Instant::now() < deadline, "no disk read started");
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    let report = runtime.shutdown();

    assert!(report.is_clean());
    assert_eq!(tracker.closed_during_read(), 0);
    assert_eq!(closes.count("0 C:"), 1);

    // the background runtime must not read the closed disk again
    let reads = tracker.reads();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(tracker.reads(), reads);
    assert_eq!(tracker.read_after_close(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dropping_runtime_inside_async_context_closes_after_read() {
    let tracker = ReadTracker::new(Duration::from_millis(200));
    let platform = slow_disk_platform(&tracker);
    let closes = platform.closes.clone();

    let runtime = MonitorRuntime::start_with_platform(platform, test_config()).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while !tracker.is_reading() {
        assert!(Instant::now() < deadline, "no disk read started");
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    drop(runtime);

    assert_eq!(tracker.closed_during_read(), 0);
    assert_eq!(tracker.read_after_close(), 0);
    assert_eq!(closes.count("0 C:"), 1);
}

#[test]
fn test_failing_close_does_not_stop_the_others() {
    let platform = Arc::new(FakePlatform {
        failing_close_disks: vec!["0 C:".to_string()],
        ..Default::default()
    });
    let closes = platform.closes.clone();

    let runtime = MonitorRuntime::start_with_platform(platform, test_config()).unwrap();
    wait_for_seq(&runtime, 1);
    let report = runtime.shutdown();

    assert!(!report.is_clean());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "disk:0 C:");
    assert_eq!(report.closed, 5);
    assert_eq!(closes.count("1 D:"), 1);
    assert_eq!(closes.count("gpu"), 1);
}

#[test]
fn test_lifecycle_shutdown_twice_closes_once() {
    let platform = FakePlatform::default();
    let engine = Lifecycle::start(&platform, &test_config());

    Lifecycle::shutdown(&engine.orchestrator);
    Lifecycle::shutdown(&engine.orchestrator);

    assert_eq!(platform.closes.count("0 C:"), 1);
    assert_eq!(platform.closes.count("gpu"), 1);
}

#[test]
fn test_dropping_runtime_shuts_down() {
    let platform = Arc::new(FakePlatform::default());
    let closes = platform.closes.clone();

    {
        let runtime = MonitorRuntime::start_with_platform(platform, test_config()).unwrap();
        wait_for_seq(&runtime, 1);
    }

    assert_eq!(closes.count("0 C:"), 1);
    assert_eq!(closes.count("1 D:"), 1);
}

#[test]
fn test_subscribers_see_each_snapshot() {
    let platform = Arc::new(FakePlatform::default());
    let runtime = MonitorRuntime::start_with_platform(platform, test_config()).unwrap();
    let mut updates = runtime.subscribe();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !updates.has_changed().unwrap() {
        assert!(Instant::now() < deadline, "no snapshot published");
        thread::sleep(Duration::from_millis(5));
    }
    let snapshot = updates.borrow_and_update().clone();
    assert!(snapshot.seq >= 1);

    runtime.shutdown();
}

#[test]
fn test_invalid_config_is_rejected() {
    let platform = Arc::new(FakePlatform::default());
    let config = MonitorConfig {
        tick_interval_ms: 0,
        ..test_config()
    };

    match MonitorRuntime::start_with_platform(platform, config) {
        Err(HwError::Config(_)) => {}
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("zero interval accepted"),
    }
}

#[test]
fn test_snapshot_once_with_warm_up() {
    let platform = FakePlatform {
        cores: 2,
        ..Default::default()
    };
    let config = MonitorConfig {
        warm_up: true,
        ..test_config()
    };

    let (snapshot, report) = snapshot_once(&platform, &config).unwrap();
    assert_eq!(snapshot.seq, 1);
    assert!(report.is_clean());

    let cpu = snapshot
        .get(&SourceId::singleton(MetricSourceKind::Processor))
        .unwrap();
    assert_eq!(cpu.latest.get(readings::CPU_USAGE), Some(25.0));
    assert_eq!(cpu.latest.get(&readings::cpu_core(1)), Some(25.0));

    // warm-up seeded the counters, so the first real tick already has a rate
    let disk = snapshot
        .get(&SourceId::instance(MetricSourceKind::Disk, "0 C:"))
        .unwrap();
    assert!(disk.latest.get(readings::DISK_READ).unwrap() > 0.0);

    let memory = snapshot
        .get(&SourceId::singleton(MetricSourceKind::Memory))
        .unwrap();
    assert_eq!(memory.latest.get(readings::MEM_USED_PERCENT), Some(75.0));
}

#[test]
fn test_wait_for_update_returns_each_new_snapshot() {
    let platform = Arc::new(FakePlatform::default());
    let runtime = MonitorRuntime::start_with_platform(platform, test_config()).unwrap();
    let mut updates = runtime.subscribe();

    assert!(runtime
        .wait_for_update(&mut updates, Duration::from_secs(5))
        .unwrap());
    let first = updates.borrow_and_update().seq;
    assert!(first >= 1);

    assert!(runtime
        .wait_for_update(&mut updates, Duration::from_secs(5))
        .unwrap());
    assert!(updates.borrow_and_update().seq > first);

    runtime.shutdown();
}

#[test]
fn test_wait_for_update_times_out_between_ticks() {
    let platform = Arc::new(FakePlatform::default());
    let config = MonitorConfig {
        tick_interval_ms: 60_000,
        ..test_config()
    };
    let runtime = MonitorRuntime::start_with_platform(platform, config).unwrap();
    let mut updates = runtime.subscribe();

    // the first tick fires right away, the next one is a minute out
    assert!(runtime
        .wait_for_update(&mut updates, Duration::from_secs(5))
        .unwrap());
    updates.borrow_and_update();

    let started = Instant::now();
    assert!(!runtime
        .wait_for_update(&mut updates, Duration::from_millis(50))
        .unwrap());
    assert!(started.elapsed() >= Duration::from_millis(50));

    runtime.shutdown();
}
