//! Shared types used across all Coil crates.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an entity (projectile, effect, target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic ID derived from a seed (for tests and replays).
    pub fn from_seed(seed: u64) -> Self {
        Self(Uuid::from_u64_pair(0xC011_0000_0000_0000, seed))
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one chain segment. Allocated from a per-chain counter and
/// never reused while the chain lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(pub u64);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "segment#{}", self.0)
    }
}

/// Handle to a rigid body owned by a [`PhysicsWorld`](crate::collaborators::PhysicsWorld).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u64);

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Position and orientation of something in the simulation plane.
///
/// The plane is XY. A pose's forward axis is its local +Y and turning is a
/// rotation about +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// A pose at `position` with identity rotation (facing +Y).
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// The local +Y axis in world space — the direction of travel.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn distance_to(&self, other: &Pose) -> f32 {
        self.position.distance(other.position)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

/// Exact-match tag used to filter spatial query results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag(pub String);

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The tag carried by every chain segment.
    pub fn segment() -> Self {
        Self::new("SnakeSegment")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of pooled entity an instance is (the pool key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKind(pub String);

impl EntityKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn fireball() -> Self {
        Self::new("fireball")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Association between an acquired instance and the pool it returns to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolHandle {
    pub kind: EntityKind,
    pub instance: EntityId,
    /// Bumped every time the instance is handed out, so a stale handle from
    /// an earlier lifecycle never matches the current one.
    pub generation: u32,
}

/// Visual effect requested through an [`EffectSink`](crate::collaborators::EffectSink).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// A projectile was surrounded and neutralized.
    Nullified,
    /// A projectile struck its target.
    Impact,
    /// Domain-specific effect.
    Custom(String),
}

/// How segments (or the leader) are moved each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveMode {
    /// Direct pose interpolation, no rigid body involved.
    #[default]
    Kinematic,
    /// Forces and torques handed to the rigid-body world.
    Physics,
}

impl fmt::Display for DriveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveMode::Kinematic => f.write_str("kinematic"),
            DriveMode::Physics => f.write_str("physics"),
        }
    }
}

/// How segment targets are derived from their predecessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowMode {
    /// Each segment pursues a point `spacing` behind its predecessor's
    /// target, along the line from itself to that target.
    #[default]
    Elastic,
    /// Segments farther than `spacing` from their predecessor's actual
    /// position are pulled to exactly `spacing`; closer ones stay put.
    Clamp,
}

impl fmt::Display for FollowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowMode::Elastic => f.write_str("elastic"),
            FollowMode::Clamp => f.write_str("clamp"),
        }
    }
}

/// How a force handed to the physics world is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForceMode {
    /// Continuous force, scaled by the inverse mass.
    Force,
    /// Continuous acceleration, mass is ignored.
    Acceleration,
    /// Instant change in momentum.
    Impulse,
    /// Instant change in velocity, mass is ignored.
    VelocityChange,
}

/// Frame counter of the simulation.
pub type Tick = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_pose_faces_up() {
        let pose = Pose::default();
        assert!((pose.forward() - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn seeded_ids_are_stable() {
        assert_eq!(EntityId::from_seed(7), EntityId::from_seed(7));
        assert_ne!(EntityId::from_seed(7), EntityId::from_seed(8));
    }

    #[test]
    fn modes_deserialize_from_snake_case() {
        let mode: DriveMode = serde_json::from_str("\"physics\"").unwrap();
        assert_eq!(mode, DriveMode::Physics);
        let follow: FollowMode = serde_json::from_str("\"clamp\"").unwrap();
        assert_eq!(follow, FollowMode::Clamp);
    }
}
