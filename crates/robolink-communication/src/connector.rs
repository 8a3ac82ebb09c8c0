//! Connection lifecycle
//!
//! [`DeviceConnector`] owns the connection flags of one device object and
//! runs connect / disconnect as background tasks. The two operations cancel
//! each other: whichever was issued last decides the final state. A
//! superseded operation still lets its in-flight request finish, but its
//! completion no longer touches the flags.

use crate::protocol::DeviceProtocol;
use parking_lot::{Mutex, RwLock};
use robolink_core::{
    ConnectionParameter, ConnectionStatus, DeviceEvent, DeviceEventBus, OutputBuffer,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Final result of a lifecycle operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationOutcome {
    /// The operation ran; carries the endpoint's success flag
    Completed(bool),
    /// Nothing to do (already connected, already pending, or not connected)
    Skipped,
    /// Cancelled or overtaken by a later operation
    Superseded,
}

/// Handle to a running lifecycle operation
///
/// Cloneable; every clone observes the same outcome.
#[derive(Debug, Clone)]
pub struct OperationHandle {
    token: CancellationToken,
    outcome: watch::Receiver<Option<OperationOutcome>>,
}

impl OperationHandle {
    fn finished(outcome: OperationOutcome) -> Self {
        let (_tx, rx) = watch::channel(Some(outcome));
        Self {
            token: CancellationToken::new(),
            outcome: rx,
        }
    }

    /// Request cancellation
    ///
    /// The operation's request, if already sent, still completes; its result
    /// is then discarded.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Outcome if the operation has finished
    pub fn outcome(&self) -> Option<OperationOutcome> {
        *self.outcome.borrow()
    }

    /// Whether the operation has finished
    pub fn is_finished(&self) -> bool {
        self.outcome().is_some()
    }

    /// Wait for the operation to finish
    pub async fn wait(&self) -> OperationOutcome {
        let mut rx = self.outcome.clone();
        loop {
            if let Some(outcome) = *rx.borrow_and_update() {
                return outcome;
            }
            if rx.changed().await.is_err() {
                // Task dropped without reporting
                return (*rx.borrow()).unwrap_or(OperationOutcome::Superseded);
            }
        }
    }
}

/// Flags plus bookkeeping of in-flight operations
///
/// `generation` advances whenever an operation starts or is cancelled; a
/// task only applies its result while the generation is still its own.
#[derive(Default)]
struct LifecycleState {
    status: ConnectionStatus,
    generation: u64,
    pending_connect: Option<CancellationToken>,
    pending_disconnect: Option<CancellationToken>,
}

impl LifecycleState {
    fn cancel_connect(&mut self) -> bool {
        self.pending_connect
            .take()
            .map(|token| token.cancel())
            .is_some()
    }

    fn cancel_disconnect(&mut self) -> bool {
        self.pending_disconnect
            .take()
            .map(|token| token.cancel())
            .is_some()
    }

    fn begin(&mut self) -> (u64, CancellationToken) {
        self.generation += 1;
        (self.generation, CancellationToken::new())
    }
}

/// Connection lifecycle manager of one device object
pub struct DeviceConnector {
    name: String,
    protocol: Arc<dyn DeviceProtocol>,
    parameters: RwLock<Vec<ConnectionParameter>>,
    state: Arc<Mutex<LifecycleState>>,
    events: Option<DeviceEventBus>,
}

impl DeviceConnector {
    /// Create a connector for the named device
    pub fn new(name: impl Into<String>, protocol: Arc<dyn DeviceProtocol>) -> Self {
        Self {
            name: name.into(),
            protocol,
            parameters: RwLock::new(Vec::new()),
            state: Arc::new(Mutex::new(LifecycleState::default())),
            events: None,
        }
    }

    /// Publish [`DeviceEvent::StateChanged`] on every flag change
    pub fn with_events(mut self, events: DeviceEventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Set the connection parameters sent with `connect`
    pub fn with_parameters(self, parameters: Vec<ConnectionParameter>) -> Self {
        *self.parameters.write() = parameters;
        self
    }

    /// Device name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Protocol used for all requests
    pub fn protocol(&self) -> &Arc<dyn DeviceProtocol> {
        &self.protocol
    }

    /// Device output buffer
    pub fn output(&self) -> &OutputBuffer {
        self.protocol.output()
    }

    /// Current connection parameters
    pub fn parameters(&self) -> Vec<ConnectionParameter> {
        self.parameters.read().clone()
    }

    /// Replace the connection parameters used by the next `connect`
    pub fn set_parameters(&self, parameters: Vec<ConnectionParameter>) {
        *self.parameters.write() = parameters;
    }

    /// Snapshot of the connection flags
    pub fn status(&self) -> ConnectionStatus {
        self.state.lock().status
    }

    /// Whether the device is connected
    pub fn is_connected(&self) -> bool {
        self.status().connected
    }

    /// Whether a lifecycle operation is in flight
    pub fn is_connecting(&self) -> bool {
        self.status().connecting
    }

    /// Whether the last connect attempt failed
    pub fn has_failure(&self) -> bool {
        self.status().failure
    }

    /// Connect to the external device
    ///
    /// Does nothing when already connected or when a connect is already in
    /// flight. Otherwise cancels a pending disconnect and starts a new
    /// connect; `connected` and `failure` are set from its result.
    pub fn connect(&self) -> OperationHandle {
        let (generation, token, status) = {
            let mut state = self.state.lock();
            if state.status.connected || state.pending_connect.is_some() {
                tracing::debug!("{}: connect skipped", self.name);
                return OperationHandle::finished(OperationOutcome::Skipped);
            }

            state.cancel_disconnect();
            let (generation, token) = state.begin();
            state.status.failure = false;
            state.status.connecting = true;
            state.pending_connect = Some(token.clone());
            (generation, token, state.status)
        };
        self.publish(status);
        tracing::info!("{}: connecting", self.name);

        let (tx, rx) = watch::channel(None);
        let protocol = self.protocol.clone();
        let parameters = self.parameters();
        let state = self.state.clone();
        let events = self.events.clone();
        let name = self.name.clone();
        let task_token = token.clone();

        tokio::spawn(async move {
            let connected = protocol.connect(&parameters).await;

            let (outcome, status) = {
                let mut state = state.lock();
                if state.generation != generation {
                    (OperationOutcome::Superseded, None)
                } else {
                    state.pending_connect = None;
                    state.status.connecting = false;
                    if task_token.is_cancelled() {
                        (OperationOutcome::Superseded, Some(state.status))
                    } else {
                        state.status.connected = connected;
                        state.status.failure = !connected;
                        (OperationOutcome::Completed(connected), Some(state.status))
                    }
                }
            };

            if let (Some(status), Some(events)) = (status, &events) {
                events.emit(DeviceEvent::StateChanged {
                    device: name.clone(),
                    status,
                });
            }
            match outcome {
                OperationOutcome::Completed(true) => tracing::info!("{}: connected", name),
                OperationOutcome::Completed(false) => {
                    tracing::warn!("{}: connection failed", name)
                }
                _ => tracing::debug!("{}: connect superseded", name),
            }
            let _ = tx.send(Some(outcome));
        });

        OperationHandle { token, outcome: rx }
    }

    /// Disconnect from the external device
    ///
    /// Cancels a pending connect first. When connected, the flags drop to
    /// disconnected immediately while the remote disconnect request runs in
    /// the background; `connecting` stays set until it returns.
    pub fn disconnect(&self) -> OperationHandle {
        let (generation, token, status) = {
            let mut state = self.state.lock();
            let cancelled = state.cancel_connect();
            if cancelled {
                state.generation += 1;
                state.status.connecting = false;
                tracing::info!("{}: pending connect cancelled", self.name);
            }

            if !state.status.connected {
                let status = state.status;
                drop(state);
                if cancelled {
                    self.publish(status);
                }
                return OperationHandle::finished(OperationOutcome::Skipped);
            }

            state.cancel_disconnect();
            let (generation, token) = state.begin();
            state.status.connecting = true;
            state.status.connected = false;
            state.status.failure = false;
            state.pending_disconnect = Some(token.clone());
            (generation, token, state.status)
        };
        self.publish(status);
        tracing::info!("{}: disconnecting", self.name);

        let (tx, rx) = watch::channel(None);
        let protocol = self.protocol.clone();
        let state = self.state.clone();
        let events = self.events.clone();
        let name = self.name.clone();
        let task_token = token.clone();

        tokio::spawn(async move {
            let acknowledged = protocol.disconnect().await;
            if !acknowledged {
                tracing::warn!("{}: device did not acknowledge disconnect", name);
            }

            let (outcome, status) = {
                let mut state = state.lock();
                if state.generation != generation {
                    (OperationOutcome::Superseded, None)
                } else {
                    state.pending_disconnect = None;
                    state.status.connecting = false;
                    if task_token.is_cancelled() {
                        (OperationOutcome::Superseded, Some(state.status))
                    } else {
                        (OperationOutcome::Completed(acknowledged), Some(state.status))
                    }
                }
            };

            if let (Some(status), Some(events)) = (status, &events) {
                events.emit(DeviceEvent::StateChanged {
                    device: name.clone(),
                    status,
                });
            }
            let _ = tx.send(Some(outcome));
        });

        OperationHandle { token, outcome: rx }
    }

    /// Ask the device to return to its initial state
    ///
    /// The device's status message is appended to the output.
    pub async fn reset_device(&self) -> bool {
        tracing::info!("{}: resetting device", self.name);
        self.protocol.reset_device().await
    }

    fn publish(&self, status: ConnectionStatus) {
        if let Some(events) = &self.events {
            events.emit(DeviceEvent::StateChanged {
                device: self.name.clone(),
                status,
            });
        }
    }
}

impl std::fmt::Debug for DeviceConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceConnector")
            .field("name", &self.name)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_finished_handle_reports_outcome() {
        let handle = OperationHandle::finished(OperationOutcome::Skipped);
        assert!(handle.is_finished());
        assert_eq!(handle.wait().await, OperationOutcome::Skipped);
        assert_eq!(handle.clone().wait().await, OperationOutcome::Skipped);
    }

    #[test]
    fn test_lifecycle_generation_advances() {
        let mut state = LifecycleState::default();
        let (first, _) = state.begin();
        let (second, _) = state.begin();
        assert!(second > first);
        assert!(!state.cancel_connect());
    }
}
