use hwscope::MonitorConfig;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = MonitorConfig::default();
    assert_eq!(config.tick_interval_ms, 500);
    assert_eq!(config.history_capacity, 60);
    assert!(config.warm_up);
    assert!(config.preferred_interface.is_none());
}

#[test]
fn test_config_save_and_load_from() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("monitor.json");

    let config = MonitorConfig {
        tick_interval_ms: 250,
        history_capacity: 120,
        enable_gpu: false,
        preferred_interface: Some("eth1".to_string()),
        ..Default::default()
    };
    config.save_to(&path).unwrap();

    let loaded = MonitorConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_config_load_from_missing_file_errors() {
    let temp_dir = TempDir::new().unwrap();
    assert!(MonitorConfig::load_from(&temp_dir.path().join("missing.json")).is_err());
}

#[test]
fn test_config_load_from_rejects_invalid_values() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("monitor.json");
    fs::write(&path, r#"{ "history_capacity": 0 }"#).unwrap();

    let err = MonitorConfig::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("history_capacity"));
}

#[test]
fn test_config_load_from_rejects_garbage() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("monitor.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(MonitorConfig::load_from(&path).is_err());
}
