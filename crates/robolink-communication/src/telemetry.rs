//! Telemetry polling
//!
//! Fetches charts and states from a connected device and keeps the latest
//! snapshot. Each successful fetch replaces the stored list as a whole; a
//! failed fetch leaves the previous list in place.

use crate::protocol::DeviceProtocol;
use parking_lot::{Mutex, RwLock};
use robolink_core::{Chart, DeviceEvent, DeviceEventBus, StateItem, TelemetrySnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct PollTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Telemetry store and poller of one device
pub struct TelemetryMonitor {
    name: String,
    protocol: Arc<dyn DeviceProtocol>,
    snapshot: Arc<RwLock<TelemetrySnapshot>>,
    poll: Mutex<Option<PollTask>>,
    events: Option<DeviceEventBus>,
}

impl TelemetryMonitor {
    /// Create a monitor for the named device
    pub fn new(name: impl Into<String>, protocol: Arc<dyn DeviceProtocol>) -> Self {
        Self {
            name: name.into(),
            protocol,
            snapshot: Arc::new(RwLock::new(TelemetrySnapshot::default())),
            poll: Mutex::new(None),
            events: None,
        }
    }

    /// Publish [`DeviceEvent::TelemetryRefreshed`] after each stored fetch
    pub fn with_events(mut self, events: DeviceEventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Latest telemetry
    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.snapshot.read().clone()
    }

    /// Latest charts
    pub fn charts(&self) -> Option<Vec<Chart>> {
        self.snapshot.read().charts.clone()
    }

    /// Latest states
    pub fn states(&self) -> Option<Vec<StateItem>> {
        self.snapshot.read().states.clone()
    }

    /// Drop all stored telemetry
    pub fn clear(&self) {
        *self.snapshot.write() = TelemetrySnapshot::default();
    }

    /// Fetch the full chart and state sets
    pub async fn fetch_initial(&self) -> bool {
        fetch(&self.name, self.protocol.as_ref(), &self.snapshot, &self.events, true).await
    }

    /// Fetch charts and states changed since the last fetch
    pub async fn refresh(&self) -> bool {
        fetch(&self.name, self.protocol.as_ref(), &self.snapshot, &self.events, false).await
    }

    /// Start polling: one initial fetch, then an update every `interval`
    ///
    /// Replaces a running poll loop.
    pub fn start(&self, interval: Duration) {
        self.stop();

        let token = CancellationToken::new();
        let name = self.name.clone();
        let protocol = self.protocol.clone();
        let snapshot = self.snapshot.clone();
        let events = self.events.clone();
        let loop_token = token.clone();

        let handle = tokio::spawn(async move {
            tracing::debug!("{}: telemetry polling every {:?}", name, interval);
            fetch(&name, protocol.as_ref(), &snapshot, &events, true).await;

            loop {
                tokio::select! {
                    _ = loop_token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
                fetch(&name, protocol.as_ref(), &snapshot, &events, false).await;
            }
            tracing::debug!("{}: telemetry polling stopped", name);
        });

        *self.poll.lock() = Some(PollTask { token, handle });
    }

    /// Whether a poll loop is running
    pub fn is_polling(&self) -> bool {
        self.poll
            .lock()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Stop the poll loop without waiting for it
    pub fn stop(&self) {
        if let Some(task) = self.poll.lock().take() {
            task.token.cancel();
        }
    }

    /// Stop the poll loop and wait until it has exited
    pub async fn stop_and_wait(&self) {
        let task = self.poll.lock().take();
        if let Some(task) = task {
            task.token.cancel();
            let _ = task.handle.await;
        }
    }
}

impl Drop for TelemetryMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn fetch(
    name: &str,
    protocol: &dyn DeviceProtocol,
    snapshot: &RwLock<TelemetrySnapshot>,
    events: &Option<DeviceEventBus>,
    initial: bool,
) -> bool {
    let charts = protocol.charts(initial).await;
    let states = protocol.states(initial).await;
    let updated = charts.is_some() || states.is_some();

    {
        let mut snapshot = snapshot.write();
        if let Some(charts) = charts {
            snapshot.charts = Some(charts);
        }
        if let Some(states) = states {
            snapshot.states = Some(states);
        }
    }

    if updated {
        tracing::trace!("{}: telemetry updated", name);
        if let Some(events) = events {
            events.emit(DeviceEvent::TelemetryRefreshed {
                device: name.to_string(),
            });
        }
    }
    updated
}
