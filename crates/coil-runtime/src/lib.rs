//! # Coil Runtime
//!
//! Encapsulation detection, pooled entities and the arena host.
//!
//! The chain crate knows how to move; this crate gives it something to do.
//! It provides the encapsulation detector, the pooled-entity lifecycle,
//! reference implementations of every collaborator trait from `coil-core`
//! (a point-mass physics world, a tag-filtered spatial index, a keyed
//! object pool and an effect log) and the `Arena` that drives a chain
//! against falling fireballs on a fixed/frame double clock.

pub mod arena;
pub mod earth;
pub mod effects_impl;
pub mod encapsulation;
pub mod fireball;
pub mod lifecycle;
pub mod physics_impl;
pub mod pool;
pub mod prelude;
pub mod spatial_impl;
pub mod spawner;
