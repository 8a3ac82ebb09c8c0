//! Poses and motion targets

use serde::{Deserialize, Serialize};

/// Location and orientation of a device element
///
/// Location is `(x, y, z)`, rotation is `(r, p, w)`. The wire form is the six
/// components separated by single spaces, always in that order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// X location
    pub x: f64,
    /// Y location
    pub y: f64,
    /// Z location
    pub z: f64,
    /// Roll
    pub r: f64,
    /// Pitch
    pub p: f64,
    /// Yaw
    pub w: f64,
}

impl Pose {
    /// Number of components in a pose
    pub const COMPONENTS: usize = 6;

    /// Create a pose from its six components
    pub const fn new(x: f64, y: f64, z: f64, r: f64, p: f64, w: f64) -> Self {
        Self { x, y, z, r, p, w }
    }

    /// Create a pose from components ordered `x y z r p w`
    pub const fn from_components(c: [f64; 6]) -> Self {
        Self::new(c[0], c[1], c[2], c[3], c[4], c[5])
    }

    /// Components ordered `x y z r p w`
    pub fn components(&self) -> [f64; 6] {
        [self.x, self.y, self.z, self.r, self.p, self.w]
    }

    /// Location part
    pub fn location(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Rotation part
    pub fn rotation(&self) -> [f64; 3] {
        [self.r, self.p, self.w]
    }

    /// Six wire tokens, one per component
    pub fn to_tokens(&self) -> Vec<String> {
        self.components().iter().map(|c| c.to_string()).collect()
    }
}

impl std::fmt::Display for Pose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.x, self.y, self.z, self.r, self.p, self.w
        )
    }
}

/// How the device approaches a target point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveType {
    /// Straight-line motion
    #[default]
    Linear,
    /// Exact stop at the target
    Fine,
}

/// Target of a motion request
///
/// Immutable once built: a motion request works on its own copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionPoint {
    #[serde(flatten)]
    pose: Pose,
    move_type: MoveType,
    move_speed: f64,
}

impl PositionPoint {
    /// Create a new position point
    pub fn new(pose: Pose, move_type: MoveType, move_speed: f64) -> Self {
        Self {
            pose,
            move_type,
            move_speed,
        }
    }

    /// Target pose
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Approach type
    pub fn move_type(&self) -> MoveType {
        self.move_type
    }

    /// Speed in location units (or rotation units) per second
    pub fn move_speed(&self) -> f64 {
        self.move_speed
    }

    /// Compact JSON used by the `move_to` command
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
