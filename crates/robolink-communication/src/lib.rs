//! # Robolink Communication
//!
//! Device protocol and connection handling for Robolink.
//! Provides the text protocol spoken with external device modules, the
//! transports that carry it (subprocess, Unix socket channel, simulated),
//! the connection lifecycle manager and the telemetry poller.

pub mod connector;
pub mod protocol;
pub mod telemetry;
pub mod transport;

pub use connector::{DeviceConnector, OperationHandle, OperationOutcome};
pub use protocol::{
    DeviceCommand, DeviceProtocol, DeviceProtocolClient, ResponseParser, ResponseStatus,
};
pub use telemetry::TelemetryMonitor;
#[cfg(unix)]
pub use transport::ChannelTransport;
pub use transport::{DeviceTransport, NoOpTransport, SubprocessTransport};
