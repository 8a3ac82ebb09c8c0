//! # Robolink
//!
//! Connector and model synchronization runtime for simulated robots and
//! tools driven by external device modules.
//!
//! ## Architecture
//!
//! Robolink is organized as a workspace with multiple crates:
//!
//! 1. **robolink-core** - Data model, errors, output buffer, device events
//! 2. **robolink-communication** - Device protocol, transports, connector, telemetry
//! 3. **robolink-model** - Motion interpolation, model synchronization, kinematics
//! 4. **robolink-settings** - Device configuration files
//! 5. **robolink** - Main binary that assembles devices from a configuration

pub mod device;

pub use device::Device;

pub use robolink_core::{
    Chart, ConnectionError, ConnectionParameter, ConnectionStatus, DeviceEvent, DeviceEventBus,
    DeviceKind, Error, MoveType, OutputBuffer, PerformingState, Pose, PositionPoint, Result,
    StateItem, TelemetrySnapshot,
};

pub use robolink_communication::{
    DeviceConnector, DeviceProtocol, DeviceProtocolClient, OperationHandle, OperationOutcome,
    ResponseParser, TelemetryMonitor,
};

pub use robolink_model::{
    ModelController, ModelStateSynchronizer, MotionInterpolator, MotionOutcome, MoveResult,
    RemoteMotionOutcome,
};

pub use robolink_settings::{Config, DeviceSettings, TransportKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr
/// - RUST_LOG environment variable support, `info` by default
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
