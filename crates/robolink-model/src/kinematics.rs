//! Local kinematics
//!
//! When the remote device reports only its pointer, node poses are computed
//! locally: the kinematics model yields each node's pose relative to the cell
//! origin, and [`origin_transform`] places it in the world.
//!
//! Rotations are Euler angles in degrees, applied in X, Y, Z order.

use glam::{DMat4, DQuat, DVec3, EulerRot};
use robolink_core::Pose;

/// Node poses of a device model as a function of its pointer
pub trait Kinematics: Send + Sync {
    /// Names of the nodes this model drives
    fn node_names(&self) -> Vec<String>;

    /// Pose of every driven node relative to the cell origin
    fn node_poses(&self, pointer: &Pose) -> Vec<(String, Pose)>;
}

/// Homogeneous transform of a pose
pub fn pose_to_matrix(pose: &Pose) -> DMat4 {
    let rotation = DQuat::from_euler(
        EulerRot::XYZ,
        pose.r.to_radians(),
        pose.p.to_radians(),
        pose.w.to_radians(),
    );
    DMat4::from_rotation_translation(rotation, DVec3::new(pose.x, pose.y, pose.z))
}

/// Pose of a homogeneous transform
pub fn matrix_to_pose(matrix: &DMat4) -> Pose {
    let (_, rotation, translation) = matrix.to_scale_rotation_translation();
    let (r, p, w) = rotation.to_euler(EulerRot::XYZ);
    Pose::new(
        translation.x,
        translation.y,
        translation.z,
        r.to_degrees(),
        p.to_degrees(),
        w.to_degrees(),
    )
}

/// Place a pose given relative to `origin` in world coordinates
pub fn origin_transform(origin: &Pose, local: &Pose) -> Pose {
    matrix_to_pose(&(pose_to_matrix(origin) * pose_to_matrix(local)))
}

/// Three-axis gantry (portal) kinematics
///
/// The X carriage follows the pointer's x, the Y carriage rides on it, and
/// the Z carriage carries the pointer. Only the pointer node rotates.
#[derive(Debug, Clone)]
pub struct PortalKinematics {
    x_axis: String,
    y_axis: String,
    z_axis: String,
    pointer: String,
}

impl PortalKinematics {
    /// Gantry with the default node names `x_axis`, `y_axis`, `z_axis`, `pointer`
    pub fn new() -> Self {
        Self::with_nodes("x_axis", "y_axis", "z_axis", "pointer")
    }

    /// Gantry with custom node names
    pub fn with_nodes(
        x_axis: impl Into<String>,
        y_axis: impl Into<String>,
        z_axis: impl Into<String>,
        pointer: impl Into<String>,
    ) -> Self {
        Self {
            x_axis: x_axis.into(),
            y_axis: y_axis.into(),
            z_axis: z_axis.into(),
            pointer: pointer.into(),
        }
    }
}

impl Default for PortalKinematics {
    fn default() -> Self {
        Self::new()
    }
}

impl Kinematics for PortalKinematics {
    fn node_names(&self) -> Vec<String> {
        vec![
            self.x_axis.clone(),
            self.y_axis.clone(),
            self.z_axis.clone(),
            self.pointer.clone(),
        ]
    }

    fn node_poses(&self, pointer: &Pose) -> Vec<(String, Pose)> {
        vec![
            (
                self.x_axis.clone(),
                Pose::new(pointer.x, 0.0, 0.0, 0.0, 0.0, 0.0),
            ),
            (
                self.y_axis.clone(),
                Pose::new(pointer.x, pointer.y, 0.0, 0.0, 0.0, 0.0),
            ),
            (
                self.z_axis.clone(),
                Pose::new(pointer.x, pointer.y, pointer.z, 0.0, 0.0, 0.0),
            ),
            (self.pointer.clone(), *pointer),
        ]
    }
}
