//! Collaborators — the services the simulation consumes but does not own.
//!
//! Each collaborator is a trait so hosts can plug in their own engine
//! (a real physics backend, a broadphase, a particle system). The runtime
//! crate ships simple in-memory implementations of all four.

pub mod effects;
pub mod physics;
pub mod pool;
pub mod spatial;

// Re-export all traits at the collaborators level
pub use effects::{EffectSink, NoEffects};
pub use physics::{BodyDesc, PhysicsWorld};
pub use pool::ObjectPool;
pub use spatial::{CandidateRef, SpatialCandidate, SpatialQuery};
