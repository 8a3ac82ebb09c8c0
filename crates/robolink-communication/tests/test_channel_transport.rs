#![cfg(unix)]

use robolink_communication::{
    ChannelTransport, DeviceConnector, DeviceProtocol, DeviceProtocolClient, DeviceTransport,
    OperationOutcome, TelemetryMonitor,
};
use robolink_core::{ConnectionError, DeviceKind, OutputBuffer};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixListener;

// Minimal module endpoint: one frame per connection, reply chosen by command word
fn serve(path: &Path, reply: fn(&str) -> String) -> tokio::task::JoinHandle<Vec<String>> {
    let listener = UnixListener::bind(path).unwrap();
    tokio::spawn(async move {
        let mut frames = Vec::new();
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut frame = String::new();
            stream.read_to_string(&mut frame).await.unwrap();
            let command = frame.split_whitespace().next().unwrap_or_default().to_string();
            frames.push(frame);
            stream.write_all(reply(&command).as_bytes()).await.unwrap();
            if command == "disconnect" {
                break;
            }
        }
        frames
    })
}

fn module_reply(command: &str) -> String {
    match command {
        "connect" => "<done: Connected>".to_string(),
        "disconnect" => "<done>".to_string(),
        "initial_states_data" => r#"[{"name":"Mode","value":"Auto"}]"#.to_string(),
        "initial_charts_data" => "[]".to_string(),
        _ => String::new(),
    }
}

#[tokio::test]
async fn test_frame_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("arm1_robot_connector_socket");
    let server = serve(&path, module_reply);

    let transport = ChannelTransport::new(&path);
    let reply = transport
        .request(&["connect".to_string(), "10.0.0.5".to_string()])
        .await
        .unwrap();
    assert_eq!(reply, "<done: Connected>");

    transport.request(&["disconnect".to_string()]).await.unwrap();
    let frames = server.await.unwrap();
    assert_eq!(frames, vec!["connect 10.0.0.5\n", "disconnect\n"]);
}

#[tokio::test]
async fn test_empty_reply_is_no_response() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("socket");
    let _server = serve(&path, module_reply);

    let transport = ChannelTransport::new(&path);
    let result = transport.request(&["sync_pointer".to_string()]).await;
    assert!(matches!(result, Err(ConnectionError::NoResponse { .. })));
}

#[tokio::test]
async fn test_connector_over_channel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("socket");
    let _server = serve(&path, module_reply);

    let client = DeviceProtocolClient::new(
        DeviceKind::Robot,
        Arc::new(ChannelTransport::new(&path)),
        OutputBuffer::new("Arm1"),
    );
    let protocol: Arc<dyn DeviceProtocol> = Arc::new(client);
    let connector = DeviceConnector::new("Arm1", protocol.clone());

    assert_eq!(connector.connect().wait().await, OperationOutcome::Completed(true));
    assert_eq!(connector.output().text(), "Connected");

    let telemetry = TelemetryMonitor::new("Arm1", protocol);
    assert!(telemetry.fetch_initial().await);
    assert_eq!(telemetry.states().unwrap()[0].value, "Auto");
    assert_eq!(telemetry.charts(), Some(vec![]));

    telemetry.start(Duration::from_millis(10));
    assert!(telemetry.is_polling());
    telemetry.stop_and_wait().await;
    assert!(!telemetry.is_polling());
}
