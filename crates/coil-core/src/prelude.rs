//! Coil Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use coil_core::prelude::*;
//! ```

// Re-export commonly used types
pub use crate::types::{
    BodyHandle, DriveMode, EffectKind, EntityId, EntityKind, FollowMode, ForceMode, PoolHandle,
    Pose, SegmentId, Tag, Tick,
};

// Re-export configuration
pub use crate::config::{Bounds, ChainConfig, DetectorConfig, LeaderConfig};

// Re-export collaborator traits
pub use crate::collaborators::{
    BodyDesc, CandidateRef, EffectSink, NoEffects, ObjectPool, PhysicsWorld, SpatialCandidate,
    SpatialQuery,
};

pub use crate::input::DirectionInput;

// Re-export error types
pub use crate::error::{CoilError, ConfigError, PoolError, Result};

// Re-export the math types every caller needs
pub use glam::{Quat, Vec2, Vec3};
