//! Model state synchronization
//!
//! [`ModelStateSynchronizer`] owns the live pointer pose of the simulated
//! model and reconciles it, tick by tick, with whatever the remote device
//! reports. For a robot:
//! - pointer and node positions reported: node positions are applied
//!   verbatim and local kinematics is bypassed
//! - only the pointer reported: node positions are computed locally
//! - nothing reported: the model keeps its previous state
//!
//! Tools have no pointer; reported node actions are applied as they come.

use crate::kinematics::{origin_transform, Kinematics};
use crate::nodes::SceneNodes;
use parking_lot::RwLock;
use robolink_communication::DeviceProtocol;
use robolink_core::{
    DeviceEvent, DeviceEventBus, DeviceKind, NodeUpdate, PerformingState, Pose, PositionPoint,
    ProtocolError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default delay between `performing_state` polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What a tick did to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Remote node data was applied
    RemoteApplied,
    /// Node poses were computed from the remote pointer
    LocalComputed,
    /// Nothing was reported; the model is unchanged
    Skipped,
}

/// How a motion executed by the remote device ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteMotionOutcome {
    /// The device reported a terminal state
    Finished(PerformingState),
    /// Polling stopped on cancellation
    Cancelled,
    /// The device refused the motion
    Rejected,
    /// The device stopped answering `performing_state`
    Lost,
}

#[derive(Debug, Clone, Copy, Default)]
struct ModelState {
    pointer: Pose,
    origin: Pose,
}

/// Reconciles the simulated model with remote device reports
pub struct ModelStateSynchronizer {
    name: String,
    kind: DeviceKind,
    scene: Arc<dyn SceneNodes>,
    kinematics: Option<Arc<dyn Kinematics>>,
    state: RwLock<ModelState>,
    poll_interval: Duration,
    events: Option<DeviceEventBus>,
}

impl ModelStateSynchronizer {
    /// Create a synchronizer for the named device
    pub fn new(name: impl Into<String>, kind: DeviceKind, scene: Arc<dyn SceneNodes>) -> Self {
        Self {
            name: name.into(),
            kind,
            scene,
            kinematics: None,
            state: RwLock::new(ModelState::default()),
            poll_interval: DEFAULT_POLL_INTERVAL,
            events: None,
        }
    }

    /// Use `kinematics` when node positions have to be computed locally
    pub fn with_kinematics(mut self, kinematics: Arc<dyn Kinematics>) -> Self {
        self.kinematics = Some(kinematics);
        self
    }

    /// Set the cell origin pose
    pub fn with_origin(self, origin: Pose) -> Self {
        self.state.write().origin = origin;
        self
    }

    /// Set the delay between `performing_state` polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Publish [`DeviceEvent::PoseUpdated`] whenever the pointer changes
    pub fn with_events(mut self, events: DeviceEventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Device kind
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Current pointer pose, relative to the cell origin
    pub fn pointer(&self) -> Pose {
        self.state.read().pointer
    }

    /// Cell origin pose
    pub fn origin(&self) -> Pose {
        self.state.read().origin
    }

    /// Move the cell origin and recompute node poses
    pub fn set_origin(&self, origin: Pose) {
        self.state.write().origin = origin;
        let pointer = self.pointer();
        self.apply_local_pose(&pointer);
    }

    /// Set the pointer and compute node poses locally
    pub fn apply_local_pose(&self, pointer: &Pose) {
        let origin = {
            let mut state = self.state.write();
            state.pointer = *pointer;
            state.origin
        };

        if let Some(kinematics) = &self.kinematics {
            for (node, local) in kinematics.node_poses(pointer) {
                self.scene.set_node_pose(&node, &origin_transform(&origin, &local));
            }
        }
        self.publish_pose(*pointer);
    }

    /// Reconcile the model with one round of remote reports
    pub fn tick(
        &self,
        remote_pointer: Option<Pose>,
        remote_nodes: Option<Vec<NodeUpdate>>,
    ) -> TickOutcome {
        match self.kind {
            DeviceKind::Robot => match (remote_pointer, remote_nodes) {
                (Some(pointer), Some(nodes)) => {
                    for update in &nodes {
                        if let NodeUpdate::Position { node, pose } = update {
                            self.scene.set_node_pose(node, pose);
                        }
                    }
                    self.state.write().pointer = pointer;
                    self.publish_pose(pointer);
                    TickOutcome::RemoteApplied
                }
                (Some(pointer), None) => {
                    self.apply_local_pose(&pointer);
                    TickOutcome::LocalComputed
                }
                (None, _) => TickOutcome::Skipped,
            },
            DeviceKind::Tool => match remote_nodes {
                Some(nodes) => {
                    for update in &nodes {
                        if let NodeUpdate::Action { node, action } = update {
                            self.scene.apply_node_action(node, action);
                        }
                    }
                    TickOutcome::RemoteApplied
                }
                None => TickOutcome::Skipped,
            },
        }
    }

    /// Fetch the remote reports once and tick
    pub async fn sync_once(&self, protocol: &dyn DeviceProtocol) -> TickOutcome {
        let (pointer, nodes) = match self.kind {
            DeviceKind::Robot => {
                let pointer = protocol.sync_pointer().await;
                let nodes = match pointer {
                    Some(_) => protocol.sync_model().await,
                    None => None,
                };
                (pointer, nodes)
            }
            DeviceKind::Tool => (None, protocol.sync_model().await),
        };
        self.tick(pointer, nodes)
    }

    /// Let the remote device perform a motion and mirror it
    ///
    /// Sends `move_to`, then ticks while the device reports `processing` and
    /// `cancel` is not set. A final tick follows a terminal state.
    pub async fn run_remote_motion(
        &self,
        protocol: &dyn DeviceProtocol,
        point: &PositionPoint,
        cancel: &CancellationToken,
    ) -> RemoteMotionOutcome {
        let origin = self.origin();
        if !protocol.move_to(point, &origin).await {
            tracing::warn!("{}: remote motion rejected", self.name);
            return RemoteMotionOutcome::Rejected;
        }

        loop {
            if cancel.is_cancelled() {
                tracing::debug!("{}: remote motion polling cancelled", self.name);
                return RemoteMotionOutcome::Cancelled;
            }

            match protocol.performing_state().await {
                Some(PerformingState::Processing) => {
                    self.sync_once(protocol).await;
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = tokio::time::sleep(self.poll_interval) => {}
                    }
                }
                Some(state) => {
                    self.sync_once(protocol).await;
                    if state == PerformingState::Error {
                        tracing::warn!("{}: {}", self.name, ProtocolError::ExecutionError);
                    }
                    return RemoteMotionOutcome::Finished(state);
                }
                None => return RemoteMotionOutcome::Lost,
            }
        }
    }

    fn publish_pose(&self, pose: Pose) {
        if let Some(events) = &self.events {
            events.emit(DeviceEvent::PoseUpdated {
                device: self.name.clone(),
                pose,
            });
        }
    }
}

impl std::fmt::Debug for ModelStateSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelStateSynchronizer")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("pointer", &self.pointer())
            .finish()
    }
}
