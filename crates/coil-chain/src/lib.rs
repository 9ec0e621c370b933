//! # Coil Chain
//!
//! Procedural chain locomotion: a steerable leader and the segments that
//! trail it.
//!
//! - **SegmentChain** — ordered segments and their targets, propagated back
//!   from the leader (elastic pursuit or distance clamp)
//! - **Leader** — constant-speed head steered by a turn input, moved
//!   kinematically or by forces on a rigid body
//! - **SegmentDrive** — turns targets into segment poses (kinematic blend or
//!   physics springs), picked once per chain
//! - **ChainBody** — ties the three together behind fixed and frame ticks

pub mod body;
pub mod drive;
pub mod leader;
pub mod prelude;
pub mod segment_chain;
