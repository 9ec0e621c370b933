//! Leader — the input-driven head of the chain.
//!
//! The leader always moves forward at a constant speed and turns according
//! to a steering value in [-1, 1] (positive turns right). Two locomotion
//! models are available:
//!
//! - **Kinematic**: the pose is rotated and advanced directly each frame.
//! - **Physics**: the leader owns a rigid body and steers it with an
//!   acceleration-mode corrective force toward the desired velocity plus a
//!   torque, leaving integration to the physics world.

use coil_core::collaborators::{BodyDesc, PhysicsWorld};
use coil_core::config::{Bounds, ChainConfig, LeaderConfig};
use coil_core::error::{CoilError, Result};
use coil_core::input::DirectionInput;
use coil_core::math::{clamp_length, yaw_degrees};
use coil_core::types::{BodyHandle, DriveMode, ForceMode, Pose};
use serde::Serialize;

/// Steering below this magnitude applies no torque in physics mode.
pub const TURN_DEAD_ZONE: f32 = 0.01;

/// The head of the chain.
#[derive(Debug, Clone, Serialize)]
pub struct Leader {
    pose: Pose,
    /// Forward speed in units per second.
    speed: f32,
    /// Turn rate in degrees per second.
    turn_rate: f32,
    turn_input: f32,
    mode: DriveMode,
    /// Gain of the corrective force in physics mode.
    follow_strength: f32,
    mass: f32,
    drag: f32,
    bounds: Option<Bounds>,
    body: Option<BodyHandle>,
}

impl Leader {
    pub fn new(pose: Pose, config: &LeaderConfig, chain: &ChainConfig) -> Self {
        Self {
            pose,
            speed: config.speed,
            turn_rate: config.turn_rate,
            turn_input: 0.0,
            mode: config.resolved_mode(chain),
            follow_strength: chain.follow_strength,
            mass: chain.mass,
            drag: chain.drag,
            bounds: config.bounds,
            body: None,
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn turn_rate(&self) -> f32 {
        self.turn_rate
    }

    pub fn turn_input(&self) -> f32 {
        self.turn_input
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    /// Steering from a directional input; only its horizontal part counts.
    pub fn set_direction(&mut self, input: DirectionInput) {
        self.turn_input = input.turn_input();
    }

    pub fn set_turn_input(&mut self, turn_input: f32) {
        self.turn_input = DirectionInput::turn(turn_input).turn_input();
    }

    /// Create the leader's rigid body. No-op for kinematic leaders or when
    /// the body already exists.
    pub fn attach_body(&mut self, physics: &mut dyn PhysicsWorld) -> Option<BodyHandle> {
        if self.mode == DriveMode::Physics && self.body.is_none() {
            let desc = BodyDesc::new(self.pose, self.mass).with_drag(self.drag);
            self.body = Some(physics.create_body(desc));
        }
        self.body
    }

    /// Destroy the leader's body, if any.
    pub fn release_body(&mut self, physics: &mut dyn PhysicsWorld) -> Result<()> {
        match self.body.take() {
            Some(body) => physics.destroy_body(body),
            None => Ok(()),
        }
    }

    /// Read the body's pose back into the leader.
    pub fn sync_from_physics(&mut self, physics: &dyn PhysicsWorld) -> Result<()> {
        if let Some(body) = self.body {
            self.pose = physics.pose(body)?;
        }
        Ok(())
    }

    /// Advance the leader by one step with the given steering.
    ///
    /// Kinematic leaders move immediately. Physics leaders queue force and
    /// torque on their body; the new pose appears once the world steps.
    pub fn step(
        &mut self,
        turn_input: f32,
        dt: f32,
        physics: Option<&mut (dyn PhysicsWorld + '_)>,
    ) -> Result<()> {
        self.set_turn_input(turn_input);
        match self.mode {
            DriveMode::Kinematic => {
                self.step_kinematic(dt);
                Ok(())
            }
            DriveMode::Physics => {
                let physics = physics.ok_or(CoilError::unconfigured("physics world"))?;
                self.apply_forces(physics)
            }
        }
    }

    fn step_kinematic(&mut self, dt: f32) {
        self.pose.rotation = self.pose.rotation * yaw_degrees(-self.turn_input * self.turn_rate * dt);
        self.pose.rotation = self.pose.rotation.normalize();
        self.pose.position += self.pose.forward() * self.speed * dt;
        if let Some(bounds) = &self.bounds {
            self.pose.position = bounds.clamp(self.pose.position);
        }
    }

    fn apply_forces(&mut self, physics: &mut dyn PhysicsWorld) -> Result<()> {
        let body = self.body.ok_or(CoilError::unconfigured("leader rigid body"))?;

        // Speed and turn rate are hard caps on the state entering this step.
        let max_spin = self.turn_rate.to_radians();
        let velocity = clamp_length(physics.velocity(body)?, self.speed);
        physics.set_velocity(body, velocity)?;
        let spin = physics.angular_velocity(body)?.clamp(-max_spin, max_spin);
        physics.set_angular_velocity(body, spin)?;

        if let Some(bounds) = &self.bounds {
            if !bounds.contains(self.pose.position) {
                self.pose.position = bounds.clamp(self.pose.position);
                physics.set_pose(body, self.pose)?;
            }
        }

        let desired = self.pose.forward() * self.speed;
        physics.add_force(
            body,
            (desired - velocity) * self.follow_strength,
            ForceMode::Acceleration,
        )?;

        if self.turn_input.abs() > TURN_DEAD_ZONE {
            physics.add_torque(body, -self.turn_input * max_spin, ForceMode::Acceleration)?;
        }
        Ok(())
    }
}
