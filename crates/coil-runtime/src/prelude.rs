//! Coil Runtime Prelude — convenient imports for common usage.
//!
//! ```rust
//! use coil_runtime::prelude::*;
//! ```

// Re-export the arena
pub use crate::arena::{Arena, ArenaConfig, ArenaEvent, ArenaSnapshot, ArenaStats};

// Re-export encapsulation
pub use crate::encapsulation::{
    DetectorState, EncapsulationDetector, EncapsulationHooks, NoHooks, Resolution,
};

// Re-export pooling
pub use crate::lifecycle::PooledEntity;
pub use crate::pool::{PoolConfig, PoolRegistry, PoolStats};

// Re-export game entities
pub use crate::earth::{Earth, EarthConfig};
pub use crate::fireball::{Fireball, FireballConfig, FireballOutcome};
pub use crate::spawner::{FireballSpawner, SpawnPlan, SpawnerConfig};

// Re-export reference collaborators
pub use crate::effects_impl::{
    effect_entity_kind, EffectConfig, EffectLog, EffectRecord, PlayingEffect, PooledEffects,
};
pub use crate::physics_impl::PointMassWorld;
pub use crate::spatial_impl::CandidateIndex;

// Re-export from chain
pub use coil_chain::prelude::*;
