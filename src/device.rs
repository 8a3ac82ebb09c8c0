//! Device assembly
//!
//! Wires one configured device together: output buffer and event bus, the
//! transport named by its settings, the protocol client, connector,
//! telemetry monitor and model controller.

use anyhow::Context;
use robolink_communication::{
    DeviceConnector, DeviceProtocol, DeviceProtocolClient, DeviceTransport, NoOpTransport,
    SubprocessTransport, TelemetryMonitor,
};
use robolink_core::{DeviceEventBus, DeviceKind, EndpointRole, OutputBuffer};
use robolink_model::{
    InMemoryNodeGraph, Kinematics, ModelController, ModelStateSynchronizer, PortalKinematics,
    SceneNodes,
};
use robolink_settings::{DeviceSettings, TransportKind};
use std::sync::Arc;

/// Nodes of the built-in tool model
const TOOL_NODES: [&str; 1] = ["tool"];

/// A fully assembled device
pub struct Device {
    settings: DeviceSettings,
    events: DeviceEventBus,
    output: OutputBuffer,
    scene: Arc<InMemoryNodeGraph>,
    connector: Arc<DeviceConnector>,
    telemetry: TelemetryMonitor,
    controller: ModelController,
}

impl Device {
    /// Assemble a device from its settings
    ///
    /// Must be called inside a tokio runtime.
    pub fn from_settings(settings: &DeviceSettings) -> anyhow::Result<Self> {
        let events = DeviceEventBus::new();
        let output = OutputBuffer::new(settings.name.clone()).with_events(events.clone());

        let transport = build_transport(settings)?;
        tracing::debug!(
            "{}: {} transport at {}",
            settings.name,
            settings.transport,
            transport.endpoint()
        );
        let protocol: Arc<dyn DeviceProtocol> = Arc::new(DeviceProtocolClient::new(
            settings.kind,
            transport,
            output.clone(),
        ));

        let connector = Arc::new(
            DeviceConnector::new(settings.name.clone(), protocol.clone())
                .with_events(events.clone())
                .with_parameters(settings.connection_parameters.clone()),
        );
        let telemetry =
            TelemetryMonitor::new(settings.name.clone(), protocol).with_events(events.clone());

        let kinematics = match settings.kind {
            DeviceKind::Robot => Some(Arc::new(PortalKinematics::new())),
            DeviceKind::Tool => None,
        };
        let scene = Arc::new(match &kinematics {
            Some(kinematics) => InMemoryNodeGraph::new(kinematics.node_names()),
            None => InMemoryNodeGraph::new(TOOL_NODES),
        });
        let scene_nodes: Arc<dyn SceneNodes> = scene.clone();

        let mut synchronizer =
            ModelStateSynchronizer::new(settings.name.clone(), settings.kind, scene_nodes)
                .with_origin(settings.origin)
                .with_poll_interval(settings.motion_poll_interval())
                .with_events(events.clone());
        if let Some(kinematics) = kinematics {
            synchronizer = synchronizer.with_kinematics(kinematics);
        }

        let controller = ModelController::new(settings.name.clone(), Arc::new(synchronizer))
            .with_connector(connector.clone())
            .with_home(settings.home);
        controller.set_update_model(settings.update_model);
        controller.synchronizer().apply_local_pose(&settings.home);

        Ok(Self {
            settings: settings.clone(),
            events,
            output,
            scene,
            connector,
            telemetry,
            controller,
        })
    }

    /// Device name
    pub fn name(&self) -> &str {
        &self.settings.name
    }

    /// Settings this device was assembled from
    pub fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    /// Event bus shared by every part of this device
    pub fn events(&self) -> &DeviceEventBus {
        &self.events
    }

    /// Output buffer written by the client, connector and telemetry
    pub fn output(&self) -> &OutputBuffer {
        &self.output
    }

    /// Model nodes driven by the synchronizer
    pub fn scene(&self) -> &Arc<InMemoryNodeGraph> {
        &self.scene
    }

    /// Connection lifecycle manager
    pub fn connector(&self) -> &Arc<DeviceConnector> {
        &self.connector
    }

    /// Telemetry store and poller
    pub fn telemetry(&self) -> &TelemetryMonitor {
        &self.telemetry
    }

    /// Motion front end of the model
    pub fn controller(&self) -> &ModelController {
        &self.controller
    }

    /// Stop motion and telemetry polling
    pub async fn shutdown(&self) {
        self.controller.stop_and_wait().await;
        self.telemetry.stop_and_wait().await;
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.settings.name)
            .field("kind", &self.settings.kind)
            .field("transport", &self.settings.transport)
            .field("status", &self.connector.status())
            .finish()
    }
}

fn build_transport(settings: &DeviceSettings) -> anyhow::Result<Arc<dyn DeviceTransport>> {
    let transport: Arc<dyn DeviceTransport> = match settings.transport {
        TransportKind::Simulated => Arc::new(NoOpTransport::new()),
        TransportKind::Subprocess => {
            let executable = settings
                .executable(EndpointRole::Connector)
                .with_context(|| {
                    format!("{}: subprocess transport needs a package root", settings.name)
                })?;
            Arc::new(SubprocessTransport::new(executable))
        }
        #[cfg(unix)]
        TransportKind::Channel => Arc::new(robolink_communication::ChannelTransport::new(
            settings.channel_path(EndpointRole::Connector),
        )),
        #[cfg(not(unix))]
        TransportKind::Channel => {
            anyhow::bail!("{}: channel transport requires a Unix platform", settings.name)
        }
    };
    Ok(transport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use robolink_communication::OperationOutcome;
    use robolink_core::{MoveType, Pose, PositionPoint};
    use robolink_model::MoveResult;

    #[tokio::test]
    async fn test_simulated_device_never_connects() {
        let settings = DeviceSettings::new("Arm1", DeviceKind::Robot);
        let device = Device::from_settings(&settings).unwrap();

        let outcome = device.connector().connect().wait().await;
        assert_eq!(outcome, OperationOutcome::Completed(false));
        assert!(device.connector().has_failure());
        assert!(!device.controller().is_remote());
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_device_moves_locally() {
        let mut settings = DeviceSettings::new("Arm1", DeviceKind::Robot);
        settings.origin = Pose::new(100.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let device = Device::from_settings(&settings).unwrap();

        let point = PositionPoint::new(
            Pose::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0),
            MoveType::Linear,
            100.0,
        );
        let result = device.controller().move_to(point).await.wait().await.unwrap();

        assert!(matches!(result, MoveResult::Local(_)));
        assert!(result.is_complete());
        let pointer = device.scene().node_pose("pointer").unwrap();
        assert!((pointer.x - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_subprocess_without_root_is_rejected() {
        let mut settings = DeviceSettings::new("Gripper", DeviceKind::Tool);
        settings.transport = TransportKind::Subprocess;
        assert!(build_transport(&settings).is_err());
    }
}
