//! Device protocol client
//!
//! [`DeviceProtocol`] is the capability set a connector or model controller
//! needs from a device endpoint. Implementors only provide
//! [`DeviceProtocol::send_command`]; the typed operations are built on top of
//! it and decode the response with [`ResponseParser`].
//!
//! Failures are absorbed here: transport and decode errors are logged,
//! appended to the device output and turned into `None` / `false`.

use super::command::DeviceCommand;
use super::parser::{ResponseParser, ResponseStatus};
use crate::transport::{DeviceTransport, NoOpTransport};
use async_trait::async_trait;
use robolink_core::{
    Chart, ConnectionError, ConnectionParameter, DeviceKind, NodeUpdate, OutputBuffer,
    PerformingState, Pose, PositionPoint, ProtocolError, StateItem,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Operations available on a device endpoint
#[async_trait]
pub trait DeviceProtocol: Send + Sync {
    /// Kind of device behind this endpoint
    fn kind(&self) -> DeviceKind;

    /// Output buffer failures and status messages are reported to
    fn output(&self) -> &OutputBuffer;

    /// Send one command and return the raw response
    ///
    /// `None` means the endpoint produced nothing usable; the cause has
    /// already been reported.
    async fn send_command(&self, command: &DeviceCommand) -> Option<String>;

    /// Open the connection
    async fn connect(&self, parameters: &[ConnectionParameter]) -> bool {
        let command = DeviceCommand::Connect(ConnectionParameter::to_wire(parameters));
        let response = self.send_command(&command).await;
        report_status(self.output(), "connect", response)
    }

    /// Close the connection
    async fn disconnect(&self) -> bool {
        let response = self.send_command(&DeviceCommand::Disconnect).await;
        report_status(self.output(), "disconnect", response)
    }

    /// Query node positions (robot) or node actions (tool)
    async fn sync_model(&self) -> Option<Vec<NodeUpdate>> {
        let response = self.send_command(&DeviceCommand::SyncModel).await?;
        ResponseParser::parse_line_batch(&response, self.kind())
    }

    /// Start a motion on the device
    async fn move_to(&self, point: &PositionPoint, origin: &Pose) -> bool {
        let command = match DeviceCommand::move_to(point, origin) {
            Ok(command) => command,
            Err(e) => {
                report_failure(self.output(), "move_to", &e);
                return false;
            }
        };
        let response = self.send_command(&command).await;
        report_status(self.output(), "move_to", response)
    }

    /// Query execution progress
    async fn performing_state(&self) -> Option<PerformingState> {
        let response = self.send_command(&DeviceCommand::PerformingState).await?;
        match ResponseParser::parse_performing_state(&response) {
            Ok(state) => Some(state),
            Err(e) => {
                report_failure(self.output(), "performing_state", &e);
                None
            }
        }
    }

    /// Query the pointer pose
    ///
    /// Tools have no pointer and always yield `None`.
    async fn sync_pointer(&self) -> Option<Pose> {
        if self.kind() == DeviceKind::Tool {
            return None;
        }
        let response = self.send_command(&DeviceCommand::SyncPointer).await?;
        match ResponseParser::parse_pose(&response) {
            Ok(pose) => Some(pose),
            Err(e) => {
                report_failure(self.output(), "sync_pointer", &e);
                None
            }
        }
    }

    /// Return the device to its initial state
    async fn reset_device(&self) -> bool {
        let response = self.send_command(&DeviceCommand::ResetDevice).await;
        report_status(self.output(), "reset_device", response)
    }

    /// Fetch charts, either the full set or only changes
    async fn charts(&self, initial: bool) -> Option<Vec<Chart>> {
        let command = if initial {
            DeviceCommand::InitialChartsData
        } else {
            DeviceCommand::UpdatedChartsData
        };
        let response = self.send_command(&command).await?;
        decode_payload(self.output(), command.name(), &response)
    }

    /// Fetch states, either the full set or only changes
    async fn states(&self, initial: bool) -> Option<Vec<StateItem>> {
        let command = if initial {
            DeviceCommand::InitialStatesData
        } else {
            DeviceCommand::UpdatedStatesData
        };
        let response = self.send_command(&command).await?;
        decode_payload(self.output(), command.name(), &response)
    }
}

/// Turn a status response into a success flag, reporting the message
fn report_status(output: &OutputBuffer, operation: &str, response: Option<String>) -> bool {
    let Some(response) = response else {
        return false;
    };

    match ResponseParser::parse_status(&response) {
        Ok(ResponseStatus::Done(message)) => {
            tracing::debug!("{}: {} done: {}", output.device(), operation, message);
            output.append_line(message);
            true
        }
        Ok(ResponseStatus::Failed(message)) => {
            let error = ProtocolError::Failed { message };
            tracing::warn!("{}: {} failed: {}", output.device(), operation, error);
            output.append_line(error.to_string());
            false
        }
        Err(e) => {
            report_failure(output, operation, &e);
            false
        }
    }
}

fn decode_payload<T: DeserializeOwned>(
    output: &OutputBuffer,
    operation: &str,
    response: &str,
) -> Option<Vec<T>> {
    match ResponseParser::parse_payload(response, operation) {
        Ok(items) => items,
        Err(e) => {
            report_failure(output, operation, &e);
            None
        }
    }
}

fn report_failure(output: &OutputBuffer, operation: &str, error: &dyn std::fmt::Display) {
    tracing::warn!("{}: {} failed: {}", output.device(), operation, error);
    output.append_line(format!("{}: {}", operation, error));
}

/// Protocol client over a [`DeviceTransport`]
///
/// Holds no device state. Requests are serialized: a second caller waits
/// until the first response has been received.
pub struct DeviceProtocolClient {
    kind: DeviceKind,
    transport: Arc<dyn DeviceTransport>,
    output: OutputBuffer,
    request_lock: Mutex<()>,
}

impl DeviceProtocolClient {
    /// Create a new client
    pub fn new(kind: DeviceKind, transport: Arc<dyn DeviceTransport>, output: OutputBuffer) -> Self {
        Self {
            kind,
            transport,
            output,
            request_lock: Mutex::new(()),
        }
    }

    /// Client for a simulated device that never answers
    pub fn simulated(kind: DeviceKind, output: OutputBuffer) -> Self {
        Self::new(kind, Arc::new(NoOpTransport::new()), output)
    }

    /// Endpoint description of the underlying transport
    pub fn endpoint(&self) -> String {
        self.transport.endpoint()
    }
}

#[async_trait]
impl DeviceProtocol for DeviceProtocolClient {
    fn kind(&self) -> DeviceKind {
        self.kind
    }

    fn output(&self) -> &OutputBuffer {
        &self.output
    }

    async fn send_command(&self, command: &DeviceCommand) -> Option<String> {
        let _guard = self.request_lock.lock().await;
        let args = command.to_args();

        tracing::debug!("{} -> {}", self.transport.endpoint(), command);
        match self.transport.request(&args).await {
            Ok(response) => {
                tracing::debug!("{} <- {:?}", self.transport.endpoint(), response);
                Some(response)
            }
            Err(ConnectionError::Simulated) => None,
            Err(e) => {
                report_failure(&self.output, command.name(), &e);
                None
            }
        }
    }
}

impl std::fmt::Debug for DeviceProtocolClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceProtocolClient")
            .field("kind", &self.kind)
            .field("endpoint", &self.transport.endpoint())
            .finish()
    }
}
