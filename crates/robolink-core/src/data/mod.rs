//! Device data model
//!
//! Plain value types exchanged between the connector, the protocol client
//! and the model layer. Everything here is `serde`-serializable so it can be
//! stored in configuration files and sent over the device protocol.

mod parameters;
mod pose;
mod telemetry;

pub use parameters::{ConnectionParameter, ParameterType, ParameterValue};
pub use pose::{MoveType, Pose, PositionPoint};
pub use telemetry::{Chart, ChartDatum, ChartStyle, StateItem, TelemetrySnapshot};

use serde::{Deserialize, Serialize};

/// Kind of device driven by a connector / model controller pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Robot arm with a pointer pose
    #[default]
    Robot,
    /// Tool driven by node actions
    Tool,
}

impl DeviceKind {
    /// Name used in endpoint paths
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Robot => "robot",
            Self::Tool => "tool",
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which side of a device module an endpoint belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointRole {
    /// Real-device communication and connection lifecycle
    #[default]
    Connector,
    /// Simulated model control
    Controller,
}

impl EndpointRole {
    /// Name used in channel paths
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connector => "connector",
            Self::Controller => "controller",
        }
    }

    /// File name of the executable inside `<package-root>/Code/`
    pub fn executable_name(&self) -> &'static str {
        match self {
            Self::Connector => "Connector",
            Self::Controller => "Controller",
        }
    }
}

impl std::fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Connection lifecycle state
///
/// `Connecting` is always transient: it is entered while a connect or a
/// disconnect is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No connection to the external device
    #[default]
    Disconnected,
    /// A connect or disconnect operation is in flight
    Connecting,
    /// Connected to the external device
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}

/// Connection flags as read by the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Whether the device is connected
    pub connected: bool,
    /// Whether a lifecycle operation is in flight
    pub connecting: bool,
    /// Whether the last connect attempt failed
    pub failure: bool,
}

impl ConnectionStatus {
    /// Collapse the flags into a lifecycle state
    pub fn state(&self) -> ConnectionState {
        if self.connecting {
            ConnectionState::Connecting
        } else if self.connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }
}

/// Execution progress reported by the remote device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformingState {
    /// The device is still executing
    Processing,
    /// Execution finished successfully
    Completed,
    /// Execution stopped with an error
    Error,
}

impl PerformingState {
    /// Whether polling should stop
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

impl std::fmt::Display for PerformingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One entry of a `sync_model` line batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeUpdate {
    /// Absolute node pose reported for a robot
    Position {
        /// Scene node name
        node: String,
        /// Reported pose
        pose: Pose,
    },
    /// Action descriptor reported for a tool node
    Action {
        /// Scene node name
        node: String,
        /// Opaque action descriptor
        action: String,
    },
}

impl NodeUpdate {
    /// Name of the node this update targets
    pub fn node(&self) -> &str {
        match self {
            Self::Position { node, .. } | Self::Action { node, .. } => node,
        }
    }
}
