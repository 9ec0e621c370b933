//! # Coil
//!
//! Procedural chain locomotion and encapsulation detection for snake-like
//! bodies.
//!
//! A leader steers; a chain of segments trails it at a fixed spacing, moved
//! either kinematically or through a rigid-body world. Projectiles that end
//! up surrounded by enough segments are nullified; the rest hit their
//! target, and those that miss are retired. Every ephemeral entity, fireballs
//! and their effects alike, comes from an object pool and goes back exactly
//! once.
//!
//! ## Quick Start
//!
//! ```rust
//! use coil::prelude::*;
//!
//! // A ten-segment kinematic chain trailing a leader at the origin
//! let mut body = ChainBody::new(
//!     ChainConfig::default().with_segments(10),
//!     &LeaderConfig::default().with_speed(5.0),
//!     Pose::at(Vec3::ZERO),
//!     None,
//! )
//! .unwrap();
//!
//! // Steer right and run one second of frames
//! body.set_direction(DirectionInput::turn(0.5));
//! for _ in 0..60 {
//!     body.frame_update(1.0 / 60.0, None).unwrap();
//! }
//! assert_eq!(body.len(), 10);
//! ```
//!
//! ## Architecture
//!
//! Coil is organized into several crates:
//!
//! - [`coil_core`] - Shared types, configuration, errors and the
//!   collaborator traits (spatial query, physics world, object pool,
//!   effect sink)
//! - [`coil_chain`] - Segment chain, leader locomotion and segment drives
//! - [`coil_runtime`] - Encapsulation detector, pooled entities, reference
//!   collaborators and the arena loop
//!
//! ## Key Concepts
//!
//! ### Drive modes
//!
//! | Mode | Leader | Segments |
//! |------|--------|----------|
//! | Kinematic | pose integrated on the frame clock | blended toward targets on the frame clock |
//! | Physics | forces and torque on the fixed clock | spring acceleration plus damping on the fixed clock |
//!
//! ### Follow modes
//!
//! - **Elastic** - targets are back-propagated from the leader; segments
//!   ease toward them
//! - **Clamp** - a segment farther than `spacing` from its predecessor is
//!   pulled to exactly `spacing`; closer ones stay put
//!
//! ### Encapsulation
//!
//! A detector counts tagged neighbors around its target on a fixed
//! interval. A single evaluation must reach the threshold; counts never
//! accumulate. Encapsulation and direct hits share one terminal state, so
//! a projectile is either nullified or impacts, never both.
//!
//! ## Arena
//!
//! ```rust
//! use coil::prelude::*;
//!
//! let mut config = ArenaConfig::default();
//! config.leader = config.leader.with_speed(0.0);
//! config.fireballs[0].fall_speed = 0.0;
//! let mut arena = Arena::new(config).unwrap();
//!
//! // Drop a fireball into the middle of the chain
//! let fireball = arena
//!     .launch(Pose::at(Vec3::new(0.0, -10.5, 0.0)), Vec3::ZERO)
//!     .unwrap();
//! let events = arena.step(1.0 / 60.0).unwrap();
//!
//! assert!(events
//!     .iter()
//!     .any(|e| matches!(e, ArenaEvent::Nullified { fireball: id, .. } if *id == fireball)));
//! ```

// Re-export all subcrates
pub use coil_chain as chain;
pub use coil_core as core;
pub use coil_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use coil::prelude::*;
/// ```
pub mod prelude {
    pub use coil_runtime::prelude::*;
}
