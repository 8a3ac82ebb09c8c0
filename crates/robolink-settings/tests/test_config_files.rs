use robolink_core::{ConnectionParameter, DeviceKind, ParameterValue, Pose};
use robolink_settings::{Config, DeviceSettings, SettingsError, TransportKind};
use std::path::PathBuf;

fn sample_config() -> Config {
    let mut arm = DeviceSettings::new("Arm1", DeviceKind::Robot);
    arm.transport = TransportKind::Channel;
    arm.origin = Pose::new(1000.0, 0.0, 0.0, 0.0, 0.0, 90.0);
    arm.connection_parameters = vec![
        ConnectionParameter::new("address", ParameterValue::String("10.0.0.5".to_string())),
        ConnectionParameter::new("port", ParameterValue::Int(30002)),
        ConnectionParameter::new("speed_scale", ParameterValue::Float(0.25)),
    ];

    let mut gripper = DeviceSettings::new("Gripper", DeviceKind::Tool);
    gripper.transport = TransportKind::Subprocess;
    gripper.package_root = Some(PathBuf::from("/opt/modules/gripper"));
    gripper.update_model = false;

    Config {
        devices: vec![arm, gripper],
    }
}

#[test]
fn test_toml_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let config = sample_config();

    config.save_to_file(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let config = sample_config();

    config.save_to_file(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();

    assert_eq!(loaded.device("Gripper").unwrap().package_root, config.devices[1].package_root);
    assert_eq!(loaded, config);
}

#[test]
fn test_minimal_toml_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[[devices]]
name = "Portal"
"#,
    )
    .unwrap();

    let config = Config::load_from_file(&path).unwrap();
    let device = config.device("Portal").unwrap();
    assert_eq!(device.kind, DeviceKind::Robot);
    assert_eq!(device.transport, TransportKind::Simulated);
    assert_eq!(device.telemetry_poll_ms, 1000);
    assert_eq!(device.motion_poll_ms, 50);
    assert!(device.update_model);
}

#[test]
fn test_unsupported_extension() {
    let config = sample_config();
    let result = config.save_to_file(&PathBuf::from("config.yaml"));
    assert!(matches!(result, Err(SettingsError::UnsupportedFormat(_))));
}

#[test]
fn test_load_or_default_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert!(config.devices.is_empty());
}

#[test]
fn test_unknown_device() {
    let config = sample_config();
    assert!(matches!(
        config.device("Arm2"),
        Err(SettingsError::UnknownDevice(_))
    ));
}

#[test]
fn test_upsert_device_replaces() {
    let mut config = sample_config();
    let mut arm = DeviceSettings::new("Arm1", DeviceKind::Robot);
    arm.telemetry_poll_ms = 250;
    config.upsert_device(arm);

    assert_eq!(config.devices.len(), 2);
    assert_eq!(config.device("Arm1").unwrap().telemetry_poll_ms, 250);
}
