//! Coil Chain Prelude — convenient imports for common usage.
//!
//! ```rust
//! use coil_chain::prelude::*;
//! ```

// Re-export chain types
pub use crate::body::ChainBody;
pub use crate::drive::{drive_for, DriveStep, KinematicDrive, PhysicsDrive, SegmentDrive};
pub use crate::leader::Leader;
pub use crate::segment_chain::{Segment, SegmentChain};

// Re-export from core
pub use coil_core::prelude::*;
