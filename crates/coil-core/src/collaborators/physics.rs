//! The rigid-body world — an external integrator.
//!
//! Coil never integrates rigid bodies itself. In physics mode the leader
//! and segments own bodies in a world supplied by the host; Coil reads
//! their poses back, issues forces and torques, and lets the world step.

use crate::error::Result;
use crate::types::{BodyHandle, ForceMode, Pose};
use glam::{Quat, Vec3};

/// Parameters for a new body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub pose: Pose,
    pub mass: f32,
    /// Linear drag coefficient.
    pub drag: f32,
    /// Angular drag coefficient.
    pub angular_drag: f32,
}

impl BodyDesc {
    pub fn new(pose: Pose, mass: f32) -> Self {
        Self {
            pose,
            mass,
            drag: 0.0,
            angular_drag: 0.05,
        }
    }

    pub fn with_drag(mut self, drag: f32) -> Self {
        self.drag = drag;
        self
    }
}

/// A world of rigid bodies constrained to the XY plane (rotation about +Z).
pub trait PhysicsWorld {
    /// Create a body and return its handle.
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle;

    /// Destroy a body. Unknown handles are an error.
    fn destroy_body(&mut self, body: BodyHandle) -> Result<()>;

    /// Current pose of a body.
    fn pose(&self, body: BodyHandle) -> Result<Pose>;

    /// Teleport a body.
    fn set_pose(&mut self, body: BodyHandle, pose: Pose) -> Result<()>;

    fn velocity(&self, body: BodyHandle) -> Result<Vec3>;

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<()>;

    /// Angular velocity about +Z in radians per second.
    fn angular_velocity(&self, body: BodyHandle) -> Result<f32>;

    fn set_angular_velocity(&mut self, body: BodyHandle, angular_velocity: f32) -> Result<()>;

    /// Accumulate a force for the next step.
    fn add_force(&mut self, body: BodyHandle, force: Vec3, mode: ForceMode) -> Result<()>;

    /// Accumulate a torque about +Z for the next step.
    fn add_torque(&mut self, body: BodyHandle, torque: f32, mode: ForceMode) -> Result<()>;

    /// Rotate the body to `rotation` during the next step.
    fn move_rotation(&mut self, body: BodyHandle, rotation: Quat) -> Result<()>;

    /// Integrate every body by `dt` and clear accumulated forces.
    fn step(&mut self, dt: f32);

    /// Number of live bodies.
    fn body_count(&self) -> usize;
}
