//! # Coil Core
//!
//! Core traits and types for Coil chain locomotion.
//!
//! This crate defines the vocabulary shared by every other crate in the
//! workspace:
//!
//! - **Types** — poses, entity/segment identifiers, tags and effect kinds
//! - **Configuration** — chain, leader and detector settings with validation
//! - **Collaborators** — the traits the simulation consumes but does not own:
//!   spatial queries, the rigid-body world, object pools and effect sinks
//! - **Input** — normalization of directional input into a turn value
//!
//! ## Quick Start
//!
//! ```rust
//! use coil_core::prelude::*;
//!
//! // A pose at the origin facing +Y
//! let pose = Pose::at(Vec3::ZERO);
//! assert_eq!(pose.forward(), Vec3::Y);
//!
//! // Configuration is validated before anything is built from it
//! let config = ChainConfig::default();
//! assert!(config.validate().is_ok());
//!
//! // A deterministic entity ID (for testing)
//! let id = EntityId::from_seed(42);
//! ```

pub mod collaborators;
pub mod config;
pub mod error;
pub mod input;
pub mod math;
pub mod prelude;
pub mod types;
