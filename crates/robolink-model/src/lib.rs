//! # Robolink Model
//!
//! Simulated-model side of a device: cancellable motion interpolation,
//! reconciliation of the model with remote reports, local kinematics and the
//! per-device model controller.

pub mod controller;
pub mod kinematics;
pub mod motion;
pub mod nodes;
pub mod synchronizer;

pub use controller::{ModelController, MotionHandle, MoveResult};
pub use kinematics::{origin_transform, Kinematics, PortalKinematics};
pub use motion::{MotionInterpolator, MotionOutcome, MotionPlan, MOTION_STEPS};
pub use nodes::{InMemoryNodeGraph, NodeState, SceneNodes};
pub use synchronizer::{
    ModelStateSynchronizer, RemoteMotionOutcome, TickOutcome, DEFAULT_POLL_INTERVAL,
};
