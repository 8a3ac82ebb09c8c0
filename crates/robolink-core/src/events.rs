//! Device event channel
//!
//! Lets an observer (typically a UI) follow connection state, output and pose
//! changes without polling the device objects. Events are fanned out over a
//! `tokio::sync::broadcast` channel; publishing never blocks and a slow
//! receiver only loses the oldest events.

use crate::data::{ConnectionStatus, Pose};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted by device objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceEvent {
    /// Connection flags changed
    StateChanged {
        /// Device name
        device: String,
        /// New flags
        status: ConnectionStatus,
    },
    /// A line was appended to the device output
    OutputAppended {
        /// Device name
        device: String,
        /// Appended text
        line: String,
    },
    /// The simulated pointer pose changed
    PoseUpdated {
        /// Device name
        device: String,
        /// New pointer pose
        pose: Pose,
    },
    /// New telemetry was stored
    TelemetryRefreshed {
        /// Device name
        device: String,
    },
}

impl DeviceEvent {
    /// Name of the device that emitted the event
    pub fn device(&self) -> &str {
        match self {
            Self::StateChanged { device, .. }
            | Self::OutputAppended { device, .. }
            | Self::PoseUpdated { device, .. }
            | Self::TelemetryRefreshed { device } => device,
        }
    }

    /// Short description for logging
    pub fn description(&self) -> String {
        match self {
            Self::StateChanged { device, status } => {
                format!("{}: {}", device, status.state())
            }
            Self::OutputAppended { device, line } => format!("{}: output {:?}", device, line),
            Self::PoseUpdated { device, pose } => format!("{}: pose {}", device, pose),
            Self::TelemetryRefreshed { device } => format!("{}: telemetry refreshed", device),
        }
    }
}

/// Error types for event bus operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventBusError {
    /// No subscribers are listening
    #[error("No active subscribers")]
    NoSubscribers,
}

/// Broadcast channel for [`DeviceEvent`]s
///
/// Cheap to clone; all clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct DeviceEventBus {
    sender: broadcast::Sender<DeviceEvent>,
}

impl DeviceEventBus {
    /// Default channel capacity
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Create a new event bus with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event bus with a custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of receivers, or an error if nobody listens.
    pub fn publish(&self, event: DeviceEvent) -> Result<usize, EventBusError> {
        tracing::trace!("Device event: {}", event.description());
        self.sender
            .send(event)
            .map_err(|_| EventBusError::NoSubscribers)
    }

    /// Publish an event, ignoring the absence of subscribers
    pub fn emit(&self, event: DeviceEvent) {
        let _ = self.publish(event);
    }

    /// Get a receiver for async event polling
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for DeviceEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = DeviceEventBus::new();
        let event = DeviceEvent::TelemetryRefreshed {
            device: "arm".to_string(),
        };
        assert_eq!(bus.publish(event), Err(EventBusError::NoSubscribers));
    }

    #[tokio::test]
    async fn test_subscriber_receives_events() {
        let bus = DeviceEventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(DeviceEvent::PoseUpdated {
            device: "arm".to_string(),
            pose: Pose::new(1.0, 2.0, 3.0, 0.0, 0.0, 0.0),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.device(), "arm");
        assert!(event.description().contains("1 2 3 0 0 0"));
    }
}
