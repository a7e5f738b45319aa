use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Identity of a shape entity, assigned by the remote store.
///
/// Ids are stable and unique for the lifetime of the record; the client
/// never allocates them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ShapeId(pub i64);

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Identity rotation and unit scale at `position`.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Position with a rotation about +Y by `heading` radians.
    pub fn from_position_heading(position: Vec3, heading: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_y(heading),
            ..Self::default()
        }
    }
}
