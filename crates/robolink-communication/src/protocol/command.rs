//! Device command vocabulary
//!
//! Every request is a command word followed by zero or more argument tokens.
//! The same vocabulary is used by all transports.

use robolink_core::{Pose, PositionPoint, Result};

/// A request understood by device connector and controller endpoints
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// Open the connection, with parameter values in declaration order
    Connect(Vec<String>),
    /// Close the connection
    Disconnect,
    /// Start a motion towards a point, relative to the cell origin
    MoveTo {
        /// Compact JSON of the target point
        point_json: String,
        /// Cell origin pose
        origin: Pose,
    },
    /// Query execution progress
    PerformingState,
    /// Query the pointer pose
    SyncPointer,
    /// Query node positions (robot) or node actions (tool)
    SyncModel,
    /// Return the device to its initial state
    ResetDevice,
    /// Fetch charts changed since the last fetch
    UpdatedChartsData,
    /// Fetch states changed since the last fetch
    UpdatedStatesData,
    /// Fetch the full chart set
    InitialChartsData,
    /// Fetch the full state set
    InitialStatesData,
}

impl DeviceCommand {
    /// Build a `move_to` command
    pub fn move_to(point: &PositionPoint, origin: &Pose) -> Result<Self> {
        Ok(Self::MoveTo {
            point_json: point.to_json()?,
            origin: *origin,
        })
    }

    /// Command word as sent on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect(_) => "connect",
            Self::Disconnect => "disconnect",
            Self::MoveTo { .. } => "move_to",
            Self::PerformingState => "performing_state",
            Self::SyncPointer => "sync_pointer",
            Self::SyncModel => "sync_model",
            Self::ResetDevice => "reset_device",
            Self::UpdatedChartsData => "updated_charts_data",
            Self::UpdatedStatesData => "updated_states_data",
            Self::InitialChartsData => "initial_charts_data",
            Self::InitialStatesData => "initial_states_data",
        }
    }

    /// Full argument list: command word followed by its parameters
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![self.name().to_string()];
        match self {
            Self::Connect(params) => args.extend(params.iter().cloned()),
            Self::MoveTo { point_json, origin } => {
                args.push(point_json.clone());
                args.extend(origin.to_tokens());
            }
            _ => {}
        }
        args
    }
}

impl std::fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_args().join(" "))
    }
}
