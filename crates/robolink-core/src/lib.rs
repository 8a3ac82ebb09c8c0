//! # Robolink Core
//!
//! Core types and utilities shared by the Robolink crates.
//! Provides the device data model (poses, position points, connection
//! parameters, telemetry), the error taxonomy, the per-device output buffer
//! and the device event channel.

pub mod data;
pub mod error;
pub mod events;
pub mod output;

pub use data::{
    Chart, ChartDatum, ChartStyle, ConnectionParameter, ConnectionState, ConnectionStatus, DeviceKind,
    EndpointRole, MoveType, NodeUpdate, ParameterType, ParameterValue, PerformingState, Pose,
    PositionPoint, StateItem, TelemetrySnapshot,
};

pub use error::{ConnectionError, DecodeError, Error, MotionError, ProtocolError, Result};

pub use events::{DeviceEvent, DeviceEventBus, EventBusError};

pub use output::{OutputBuffer, OutputLine};
