//! Model controller
//!
//! Per-device entry point for motion. Owns the synchronizer and a single
//! motion slot: starting a motion cancels the previous one and waits for it
//! to exit, so at most one interpolation or remote poll loop runs per device.
//!
//! A motion goes to the remote device when the device is connected and
//! model updates from it are enabled; otherwise it is interpolated locally.

use crate::motion::{MotionInterpolator, MotionOutcome};
use crate::synchronizer::{ModelStateSynchronizer, RemoteMotionOutcome, TickOutcome};
use parking_lot::Mutex as SyncMutex;
use robolink_communication::DeviceConnector;
use robolink_core::{Pose, PositionPoint};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Result of a `move_to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// Interpolated locally
    Local(MotionOutcome),
    /// Executed by the remote device
    Remote(RemoteMotionOutcome),
}

impl MoveResult {
    /// Whether the motion ran to its end without cancellation or refusal
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Local(outcome) => outcome.reached_target(),
            Self::Remote(outcome) => matches!(outcome, RemoteMotionOutcome::Finished(_)),
        }
    }
}

/// Handle to a running motion
#[derive(Debug, Clone)]
pub struct MotionHandle {
    token: CancellationToken,
    result: watch::Receiver<Option<MoveResult>>,
}

impl MotionHandle {
    /// Request cancellation
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Result if the motion has ended
    pub fn result(&self) -> Option<MoveResult> {
        *self.result.borrow()
    }

    /// Wait for the motion to end
    ///
    /// Returns `None` if the motion task was aborted.
    pub async fn wait(&self) -> Option<MoveResult> {
        let mut rx = self.result.clone();
        loop {
            if let Some(result) = *rx.borrow_and_update() {
                return Some(result);
            }
            if rx.changed().await.is_err() {
                return *rx.borrow();
            }
        }
    }
}

struct MotionTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Motion and synchronization front end of one device
pub struct ModelController {
    name: String,
    synchronizer: Arc<ModelStateSynchronizer>,
    connector: Option<Arc<DeviceConnector>>,
    interpolator: MotionInterpolator,
    update_model: AtomicBool,
    home: Pose,
    motion: Mutex<Option<MotionTask>>,
    active: SyncMutex<Option<CancellationToken>>,
}

impl ModelController {
    /// Create a controller for a purely simulated device
    pub fn new(name: impl Into<String>, synchronizer: Arc<ModelStateSynchronizer>) -> Self {
        let home = synchronizer.pointer();
        Self {
            name: name.into(),
            synchronizer,
            connector: None,
            interpolator: MotionInterpolator::new(),
            update_model: AtomicBool::new(true),
            home,
            motion: Mutex::new(None),
            active: SyncMutex::new(None),
        }
    }

    /// Route motions to `connector` while it is connected
    pub fn with_connector(mut self, connector: Arc<DeviceConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Use a custom interpolator
    pub fn with_interpolator(mut self, interpolator: MotionInterpolator) -> Self {
        self.interpolator = interpolator;
        self
    }

    /// Pose restored by [`ModelController::reset_pose`]
    pub fn with_home(mut self, home: Pose) -> Self {
        self.home = home;
        self
    }

    /// Device name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Synchronizer owning the live pose
    pub fn synchronizer(&self) -> &Arc<ModelStateSynchronizer> {
        &self.synchronizer
    }

    /// Current pointer pose
    pub fn pointer(&self) -> Pose {
        self.synchronizer.pointer()
    }

    /// Whether the model follows the remote device while connected
    pub fn update_model(&self) -> bool {
        self.update_model.load(Ordering::Relaxed)
    }

    /// Enable or disable following the remote device
    pub fn set_update_model(&self, enabled: bool) {
        self.update_model.store(enabled, Ordering::Relaxed);
    }

    /// Whether motions currently go to the remote device
    pub fn is_remote(&self) -> bool {
        self.update_model()
            && self
                .connector
                .as_ref()
                .is_some_and(|connector| connector.is_connected())
    }

    /// Start a motion towards `point`
    ///
    /// Cancels the running motion and waits for it to exit first.
    pub async fn move_to(&self, point: PositionPoint) -> MotionHandle {
        let mut slot = self.motion.lock().await;
        if let Some(previous) = slot.take() {
            previous.token.cancel();
            let _ = previous.handle.await;
        }

        let token = CancellationToken::new();
        let (tx, rx) = watch::channel(None);
        let synchronizer = self.synchronizer.clone();
        let task_token = token.clone();

        let handle = match self.connector.as_ref().filter(|_| self.is_remote()) {
            Some(connector) => {
                let connector = connector.clone();
                tracing::info!("{}: remote move to {}", self.name, point.pose());
                tokio::spawn(async move {
                    let protocol = connector.protocol().clone();
                    let outcome = synchronizer
                        .run_remote_motion(protocol.as_ref(), &point, &task_token)
                        .await;
                    let _ = tx.send(Some(MoveResult::Remote(outcome)));
                })
            }
            None => {
                let interpolator = self.interpolator;
                tracing::info!("{}: local move to {}", self.name, point.pose());
                tokio::spawn(async move {
                    let from = synchronizer.pointer();
                    let outcome = interpolator
                        .interpolate(from, &point, &task_token, |pose| {
                            synchronizer.apply_local_pose(pose)
                        })
                        .await;
                    let _ = tx.send(Some(MoveResult::Local(outcome)));
                })
            }
        };

        *slot = Some(MotionTask {
            token: token.clone(),
            handle,
        });
        *self.active.lock() = Some(token.clone());

        MotionHandle { token, result: rx }
    }

    /// Cancel the running motion without waiting
    pub fn stop(&self) {
        if let Some(token) = self.active.lock().take() {
            tracing::debug!("{}: stopping motion", self.name);
            token.cancel();
        }
    }

    /// Cancel the running motion and wait until it has exited
    pub async fn stop_and_wait(&self) {
        self.stop();
        let task = self.motion.lock().await.take();
        if let Some(task) = task {
            task.token.cancel();
            let _ = task.handle.await;
        }
    }

    /// Stop any motion and put the model back at its home pose
    pub async fn reset_pose(&self) {
        self.stop_and_wait().await;
        self.synchronizer.apply_local_pose(&self.home);
    }

    /// Mirror the remote device once, if it is connected
    ///
    /// Skipped while a motion is running; the motion task owns the model
    /// until it ends.
    pub async fn sync_from_device(&self) -> TickOutcome {
        let slot = self.motion.lock().await;
        if slot.as_ref().is_some_and(|task| !task.handle.is_finished()) {
            tracing::debug!("{}: sync skipped during motion", self.name);
            return TickOutcome::Skipped;
        }

        match self.connector.as_ref().filter(|_| self.is_remote()) {
            Some(connector) => self.synchronizer.sync_once(connector.protocol().as_ref()).await,
            None => TickOutcome::Skipped,
        }
    }
}

impl std::fmt::Debug for ModelController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelController")
            .field("name", &self.name)
            .field("pointer", &self.pointer())
            .field("remote", &self.is_remote())
            .finish()
    }
}
