//! PointMassWorld — a minimal rigid-body world for headless runs.
//!
//! Bodies are point masses in the XY plane with a single spin axis (+Z).
//! There is no collision detection. Integration is semi-implicit Euler:
//! accumulated accelerations update velocity, drag scales it by
//! `1 / (1 + drag·dt)`, then velocity moves the pose.

use coil_core::collaborators::{BodyDesc, PhysicsWorld};
use coil_core::error::{CoilError, Result};
use coil_core::types::{BodyHandle, ForceMode, Pose};
use glam::{Quat, Vec3};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct PointBody {
    pose: Pose,
    velocity: Vec3,
    /// Radians per second about +Z.
    spin: f32,
    inverse_mass: f32,
    drag: f32,
    angular_drag: f32,
    /// Acceleration accumulated for the next step.
    acceleration: Vec3,
    angular_acceleration: f32,
    pending_rotation: Option<Quat>,
}

/// In-memory physics world of point masses.
#[derive(Debug, Clone, Default)]
pub struct PointMassWorld {
    bodies: BTreeMap<u64, PointBody>,
    next_handle: u64,
    steps: u64,
}

impl PointMassWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps integrated so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn contains(&self, body: BodyHandle) -> bool {
        self.bodies.contains_key(&body.0)
    }

    fn body(&self, body: BodyHandle) -> Result<&PointBody> {
        self.bodies.get(&body.0).ok_or(CoilError::UnknownBody(body))
    }

    fn body_mut(&mut self, body: BodyHandle) -> Result<&mut PointBody> {
        self.bodies.get_mut(&body.0).ok_or(CoilError::UnknownBody(body))
    }
}

impl PhysicsWorld for PointMassWorld {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        let inverse_mass = if desc.mass > 0.0 { 1.0 / desc.mass } else { 0.0 };
        self.bodies.insert(
            handle.0,
            PointBody {
                pose: desc.pose,
                velocity: Vec3::ZERO,
                spin: 0.0,
                inverse_mass,
                drag: desc.drag.max(0.0),
                angular_drag: desc.angular_drag.max(0.0),
                acceleration: Vec3::ZERO,
                angular_acceleration: 0.0,
                pending_rotation: None,
            },
        );
        handle
    }

    fn destroy_body(&mut self, body: BodyHandle) -> Result<()> {
        self.bodies
            .remove(&body.0)
            .map(|_| ())
            .ok_or(CoilError::UnknownBody(body))
    }

    fn pose(&self, body: BodyHandle) -> Result<Pose> {
        Ok(self.body(body)?.pose)
    }

    fn set_pose(&mut self, body: BodyHandle, pose: Pose) -> Result<()> {
        self.body_mut(body)?.pose = pose;
        Ok(())
    }

    fn velocity(&self, body: BodyHandle) -> Result<Vec3> {
        Ok(self.body(body)?.velocity)
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<()> {
        self.body_mut(body)?.velocity = velocity;
        Ok(())
    }

    fn angular_velocity(&self, body: BodyHandle) -> Result<f32> {
        Ok(self.body(body)?.spin)
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, angular_velocity: f32) -> Result<()> {
        self.body_mut(body)?.spin = angular_velocity;
        Ok(())
    }

    fn add_force(&mut self, body: BodyHandle, force: Vec3, mode: ForceMode) -> Result<()> {
        let body = self.body_mut(body)?;
        match mode {
            ForceMode::Force => body.acceleration += force * body.inverse_mass,
            ForceMode::Acceleration => body.acceleration += force,
            ForceMode::Impulse => body.velocity += force * body.inverse_mass,
            ForceMode::VelocityChange => body.velocity += force,
        }
        Ok(())
    }

    fn add_torque(&mut self, body: BodyHandle, torque: f32, mode: ForceMode) -> Result<()> {
        // Unit radius: the moment of inertia equals the mass.
        let body = self.body_mut(body)?;
        match mode {
            ForceMode::Force => body.angular_acceleration += torque * body.inverse_mass,
            ForceMode::Acceleration => body.angular_acceleration += torque,
            ForceMode::Impulse => body.spin += torque * body.inverse_mass,
            ForceMode::VelocityChange => body.spin += torque,
        }
        Ok(())
    }

    fn move_rotation(&mut self, body: BodyHandle, rotation: Quat) -> Result<()> {
        self.body_mut(body)?.pending_rotation = Some(rotation);
        Ok(())
    }

    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for body in self.bodies.values_mut() {
            body.velocity += body.acceleration * dt;
            body.velocity /= 1.0 + body.drag * dt;
            body.spin += body.angular_acceleration * dt;
            body.spin /= 1.0 + body.angular_drag * dt;

            body.pose.position += body.velocity * dt;
            body.pose.rotation = match body.pending_rotation.take() {
                Some(rotation) => rotation.normalize(),
                None => (Quat::from_rotation_z(body.spin * dt) * body.pose.rotation).normalize(),
            };

            body.acceleration = Vec3::ZERO;
            body.angular_acceleration = 0.0;
        }
        self.steps += 1;
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_body(mass: f32) -> (PointMassWorld, BodyHandle) {
        let mut world = PointMassWorld::new();
        let body = world.create_body(BodyDesc::new(Pose::default(), mass));
        (world, body)
    }

    #[test]
    fn force_scales_with_mass_acceleration_does_not() {
        let (mut world, pushed) = world_with_body(2.0);
        let accelerated = world.create_body(BodyDesc::new(Pose::default(), 2.0));

        world.add_force(pushed, Vec3::X, ForceMode::Force).unwrap();
        world.add_force(accelerated, Vec3::X, ForceMode::Acceleration).unwrap();
        world.step(1.0);

        assert!((world.velocity(pushed).unwrap().x - 0.5).abs() < 1e-6);
        assert!((world.velocity(accelerated).unwrap().x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn forces_clear_after_step() {
        let (mut world, body) = world_with_body(1.0);
        world.add_force(body, Vec3::Y, ForceMode::Acceleration).unwrap();
        world.step(0.5);
        world.step(0.5);
        // Second step moves by the carried velocity only
        let position = world.pose(body).unwrap().position;
        assert!((position.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn drag_slows_bodies() {
        let mut world = PointMassWorld::new();
        let body = world.create_body(BodyDesc::new(Pose::default(), 1.0).with_drag(1.0));
        world.set_velocity(body, Vec3::X).unwrap();
        world.step(1.0);
        assert!((world.velocity(body).unwrap().x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn negative_spin_turns_right() {
        let mut world = PointMassWorld::new();
        let desc = BodyDesc {
            angular_drag: 0.0,
            ..BodyDesc::new(Pose::default(), 1.0)
        };
        let body = world.create_body(desc);
        world
            .set_angular_velocity(body, -std::f32::consts::FRAC_PI_2)
            .unwrap();
        world.step(1.0);
        let forward = world.pose(body).unwrap().forward();
        assert!((forward - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn move_rotation_wins_over_spin() {
        let (mut world, body) = world_with_body(1.0);
        world.set_angular_velocity(body, 3.0).unwrap();
        world.move_rotation(body, Quat::IDENTITY).unwrap();
        world.step(0.1);
        assert_eq!(world.pose(body).unwrap().rotation, Quat::IDENTITY);
    }

    #[test]
    fn destroyed_bodies_are_unknown() {
        let (mut world, body) = world_with_body(1.0);
        world.destroy_body(body).unwrap();
        assert_eq!(world.pose(body).unwrap_err(), CoilError::UnknownBody(body));
        assert_eq!(world.destroy_body(body).unwrap_err(), CoilError::UnknownBody(body));
        assert_eq!(world.body_count(), 0);
    }
}
