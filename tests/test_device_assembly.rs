#![cfg(unix)]

use robolink::{
    Config, Device, DeviceKind, MoveResult, MoveType, OperationOutcome, PerformingState, Pose,
    PositionPoint, RemoteMotionOutcome, TransportKind,
};
use robolink_settings::DeviceSettings;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixListener;

// Robot module that finishes every motion at once
fn serve_robot(path: &Path) -> tokio::task::JoinHandle<Vec<String>> {
    let listener = UnixListener::bind(path).unwrap();
    tokio::spawn(async move {
        let mut commands = Vec::new();
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut frame = String::new();
            stream.read_to_string(&mut frame).await.unwrap();
            let command = frame.split_whitespace().next().unwrap_or_default().to_string();
            let reply = match command.as_str() {
                "connect" => "<done: Connected>",
                "move_to" => "<done: Moving>",
                "performing_state" => "completed",
                "sync_pointer" => "10 20 30 0 0 0",
                "sync_model" => "x_axis 10 0 0 0 0 0\ny_axis 10 20 0 0 0 0",
                "disconnect" => "<done: Bye>",
                _ => "<failed: unknown command>",
            };
            stream.write_all(reply.as_bytes()).await.unwrap();
            commands.push(command.clone());
            if command == "disconnect" {
                break;
            }
        }
        commands
    })
}

#[tokio::test]
async fn test_channel_device_moves_remotely() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("arm1.sock");
    let server = serve_robot(&socket);

    let mut settings = DeviceSettings::new("Arm1", DeviceKind::Robot);
    settings.transport = TransportKind::Channel;
    settings.socket_path = Some(socket);
    settings.motion_poll_ms = 5;

    let config_path = dir.path().join("config.toml");
    Config {
        devices: vec![settings],
    }
    .save_to_file(&config_path)
    .unwrap();
    let config = Config::load_from_file(&config_path).unwrap();

    let device = Device::from_settings(config.device("Arm1").unwrap()).unwrap();
    assert_eq!(
        device.connector().connect().wait().await,
        OperationOutcome::Completed(true)
    );
    assert!(device.controller().is_remote());

    let target = Pose::new(10.0, 20.0, 30.0, 0.0, 0.0, 0.0);
    let point = PositionPoint::new(target, MoveType::Linear, 50.0);
    let result = device.controller().move_to(point).await.wait().await;
    assert_eq!(
        result,
        Some(MoveResult::Remote(RemoteMotionOutcome::Finished(
            PerformingState::Completed
        )))
    );
    assert_eq!(device.controller().pointer(), target);
    assert_eq!(device.scene().node_pose("y_axis").unwrap().y, 20.0);

    assert_eq!(
        device.connector().disconnect().wait().await,
        OperationOutcome::Completed(true)
    );
    let commands = server.await.unwrap();
    assert_eq!(commands.first().map(String::as_str), Some("connect"));
    assert_eq!(commands.last().map(String::as_str), Some("disconnect"));
    assert!(commands.iter().any(|c| c == "move_to"));

    let output = device.output().text();
    assert!(output.contains("Connected"));
    assert!(output.contains("Moving"));
}

#[tokio::test]
async fn test_missing_socket_fails_connect() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = DeviceSettings::new("Gripper", DeviceKind::Tool);
    settings.transport = TransportKind::Channel;
    settings.socket_path = Some(dir.path().join("absent.sock"));

    let device = Device::from_settings(&settings).unwrap();
    assert_eq!(
        device.connector().connect().wait().await,
        OperationOutcome::Completed(false)
    );
    assert!(device.connector().has_failure());
    assert!(!device.connector().is_connected());
}
