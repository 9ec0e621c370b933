//! Segment drive — how a computed target becomes a segment pose.
//!
//! The drive is chosen once when a chain is built. Kinematic chains blend
//! poses directly; physics chains push their segment bodies with spring-like
//! forces and let the rigid-body world integrate them.

use crate::segment_chain::Segment;
use coil_core::collaborators::PhysicsWorld;
use coil_core::config::ChainConfig;
use coil_core::error::{CoilError, Result};
use coil_core::math::{blend_factor, look_rotation};
use coil_core::types::{DriveMode, ForceMode, Pose};
use glam::Vec3;

/// Physics segments closer than this to their target receive no force.
pub const PHYSICS_DEAD_ZONE: f32 = 0.1;

/// Per-step context handed to a drive.
pub struct DriveStep<'a> {
    pub dt: f32,
    pub physics: Option<&'a mut dyn PhysicsWorld>,
}

impl<'a> DriveStep<'a> {
    pub fn new(dt: f32, physics: Option<&'a mut (dyn PhysicsWorld + '_)>) -> Self {
        Self {
            dt,
            physics: physics.map(|world| world as &mut dyn PhysicsWorld),
        }
    }

    pub fn kinematic(dt: f32) -> Self {
        Self { dt, physics: None }
    }
}

/// Moves one segment toward its target and turns it toward `look_at`.
pub trait SegmentDrive: Send + Sync {
    fn mode(&self) -> DriveMode;

    /// Drive `segment` one step and return its new pose.
    ///
    /// Physics drives return the pose the segment had on entry (with the
    /// rotation they requested); the body's new position shows up once the
    /// world has stepped.
    fn drive_segment(
        &self,
        segment: &Segment,
        target: Vec3,
        look_at: Vec3,
        step: &mut DriveStep<'_>,
    ) -> Result<Pose>;
}

/// Build the drive a chain config asks for.
pub fn drive_for(config: &ChainConfig) -> Box<dyn SegmentDrive> {
    match config.mode {
        DriveMode::Kinematic => Box::new(KinematicDrive::new(config.follow_strength)),
        DriveMode::Physics => Box::new(PhysicsDrive::new(config.follow_strength, config.damping)),
    }
}

/// Linear blend toward the target by `follow_strength × dt` per step.
///
/// This is the first-order approximation of an exponential approach and
/// degrades at low frame rates: once `follow_strength × dt ≥ 1` segments
/// snap straight onto their targets.
#[derive(Debug, Clone, Copy)]
pub struct KinematicDrive {
    follow_strength: f32,
}

impl KinematicDrive {
    pub fn new(follow_strength: f32) -> Self {
        Self { follow_strength }
    }
}

impl SegmentDrive for KinematicDrive {
    fn mode(&self) -> DriveMode {
        DriveMode::Kinematic
    }

    fn drive_segment(
        &self,
        segment: &Segment,
        target: Vec3,
        look_at: Vec3,
        step: &mut DriveStep<'_>,
    ) -> Result<Pose> {
        let t = blend_factor(self.follow_strength, step.dt);
        let current = segment.pose();
        let position = current.position.lerp(target, t);
        let rotation = match look_rotation(look_at - position) {
            Some(look) => current.rotation.slerp(look, t).normalize(),
            None => current.rotation,
        };
        Ok(Pose::new(position, rotation))
    }
}

/// Spring force toward the target plus velocity damping.
///
/// Force magnitude is `follow_strength × distance`, uncapped, so a segment
/// knocked far off its target snaps back hard. Damping multiplies the
/// velocity every step whatever the distance, bounding terminal speed.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsDrive {
    follow_strength: f32,
    damping: f32,
}

impl PhysicsDrive {
    pub fn new(follow_strength: f32, damping: f32) -> Self {
        Self {
            follow_strength,
            damping,
        }
    }
}

impl SegmentDrive for PhysicsDrive {
    fn mode(&self) -> DriveMode {
        DriveMode::Physics
    }

    fn drive_segment(
        &self,
        segment: &Segment,
        target: Vec3,
        look_at: Vec3,
        step: &mut DriveStep<'_>,
    ) -> Result<Pose> {
        let body = segment
            .body()
            .ok_or(CoilError::unconfigured("segment rigid body"))?;
        let physics = step
            .physics
            .as_deref_mut()
            .ok_or(CoilError::unconfigured("physics world"))?;

        let current = segment.pose();
        let offset = target - current.position;
        let distance = offset.length();
        if distance > PHYSICS_DEAD_ZONE {
            let force = offset / distance * self.follow_strength * distance;
            physics.add_force(body, force, ForceMode::Acceleration)?;
        }

        let velocity = physics.velocity(body)?;
        physics.set_velocity(body, velocity * self.damping)?;

        let t = blend_factor(self.follow_strength, step.dt);
        let rotation = match look_rotation(look_at - current.position) {
            Some(look) => {
                let rotation = current.rotation.slerp(look, t).normalize();
                physics.move_rotation(body, rotation)?;
                rotation
            }
            None => current.rotation,
        };
        Ok(Pose::new(current.position, rotation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment_chain::SegmentChain;
    use coil_core::types::FollowMode;

    fn lone_segment(at: Vec3) -> SegmentChain {
        let mut chain = SegmentChain::new(1.0, FollowMode::Elastic).unwrap();
        chain.push(Pose::at(at), None);
        chain
    }

    #[test]
    fn kinematic_blends_linearly() {
        let chain = lone_segment(Vec3::ZERO);
        let drive = KinematicDrive::new(10.0);
        let pose = drive
            .drive_segment(
                chain.segment(0).unwrap(),
                Vec3::new(0.0, 10.0, 0.0),
                Vec3::new(0.0, 20.0, 0.0),
                &mut DriveStep::kinematic(0.02),
            )
            .unwrap();
        assert!((pose.position.y - 2.0).abs() < 1e-4);
    }

    #[test]
    fn kinematic_snaps_at_large_dt() {
        let chain = lone_segment(Vec3::ZERO);
        let drive = KinematicDrive::new(10.0);
        let target = Vec3::new(4.0, 0.0, 0.0);
        let pose = drive
            .drive_segment(chain.segment(0).unwrap(), target, Vec3::new(8.0, 0.0, 0.0), &mut DriveStep::kinematic(1.0))
            .unwrap();
        assert_eq!(pose.position, target);
        assert!((pose.forward() - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn zero_look_direction_keeps_rotation() {
        let chain = lone_segment(Vec3::ZERO);
        let drive = KinematicDrive::new(10.0);
        let pose = drive
            .drive_segment(chain.segment(0).unwrap(), Vec3::ZERO, Vec3::ZERO, &mut DriveStep::kinematic(0.02))
            .unwrap();
        assert_eq!(pose.rotation, chain.segment(0).unwrap().pose().rotation);
        assert!(pose.rotation.is_finite());
    }

    #[test]
    fn physics_drive_requires_body() {
        let chain = lone_segment(Vec3::ZERO);
        let drive = PhysicsDrive::new(10.0, 0.8);
        let err = drive
            .drive_segment(chain.segment(0).unwrap(), Vec3::X, Vec3::X, &mut DriveStep::kinematic(0.02))
            .unwrap_err();
        assert_eq!(err, CoilError::Unconfigured("segment rigid body"));
    }

    #[test]
    fn drive_matches_config_mode() {
        let config = ChainConfig::default().with_mode(DriveMode::Physics);
        assert_eq!(drive_for(&config).mode(), DriveMode::Physics);
        assert_eq!(drive_for(&ChainConfig::default()).mode(), DriveMode::Kinematic);
    }
}
