//! ChainBody — a leader, its trailing segments and the drive that moves them.
//!
//! A chain body is ticked twice per frame by its host:
//!
//! - `fixed_update` on the physics clock: leader forces, then segment forces,
//!   all computed from the leader pose committed at the start of the tick.
//!   The host steps its world afterwards.
//! - `frame_update` on the render clock: kinematic leader step, target
//!   recomputation, kinematic segment drive.
//!
//! Physics poses are read back from the world at the start of both ticks.

use crate::drive::{drive_for, DriveStep, SegmentDrive};
use crate::leader::Leader;
use crate::segment_chain::SegmentChain;
use coil_core::collaborators::{BodyDesc, PhysicsWorld};
use coil_core::config::{ChainConfig, LeaderConfig};
use coil_core::error::{CoilError, Result};
use coil_core::input::DirectionInput;
use coil_core::types::{DriveMode, FollowMode, Pose, SegmentId};
use tracing::{debug, warn};

/// The whole snake: leader, segment chain and segment drive.
pub struct ChainBody {
    config: ChainConfig,
    leader: Leader,
    chain: SegmentChain,
    drive: Box<dyn SegmentDrive>,
}

impl ChainBody {
    /// Build a chain of `config.segment_count` segments trailing a leader
    /// at `leader_pose`.
    ///
    /// Both configs are validated first. A world must be supplied when the
    /// leader or the segments are physics-driven.
    pub fn new(
        config: ChainConfig,
        leader_config: &LeaderConfig,
        leader_pose: Pose,
        mut physics: Option<&mut (dyn PhysicsWorld + '_)>,
    ) -> Result<Self> {
        config.validate()?;
        leader_config.validate()?;

        let chain = SegmentChain::new(config.spacing, config.follow_mode)?;
        let leader = Leader::new(leader_pose, leader_config, &config);
        let drive = drive_for(&config);
        let mut body = Self {
            config,
            leader,
            chain,
            drive,
        };

        if body.needs_physics() {
            let world = physics
                .as_deref_mut()
                .ok_or(CoilError::unconfigured("physics world"))?;
            body.leader.attach_body(world);
        }
        for _ in 0..body.config.segment_count {
            body.add_segment(physics.as_deref_mut())?;
        }

        debug!(
            segments = body.chain.len(),
            leader_mode = %body.leader.mode(),
            segment_mode = %body.drive.mode(),
            follow_mode = %body.chain.follow_mode(),
            "Chain created"
        );
        Ok(body)
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn leader(&self) -> &Leader {
        &self.leader
    }

    pub fn chain(&self) -> &SegmentChain {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Mode used to drive the segments.
    pub fn segment_mode(&self) -> DriveMode {
        self.drive.mode()
    }

    /// Whether any part of this chain lives in a physics world.
    pub fn needs_physics(&self) -> bool {
        self.leader.mode() == DriveMode::Physics || self.drive.mode() == DriveMode::Physics
    }

    /// Rigid bodies this chain still owns.
    pub fn live_bodies(&self) -> usize {
        let segments = self
            .chain
            .segments()
            .iter()
            .filter(|s| s.body().is_some())
            .count();
        segments + usize::from(self.leader.body().is_some())
    }

    pub fn set_direction(&mut self, input: DirectionInput) {
        self.leader.set_direction(input);
    }

    pub fn set_turn_input(&mut self, turn_input: f32) {
        self.leader.set_turn_input(turn_input);
    }

    /// Physics clock tick. No-op for fully kinematic chains.
    pub fn fixed_update(
        &mut self,
        dt: f32,
        physics: Option<&mut (dyn PhysicsWorld + '_)>,
    ) -> Result<()> {
        if !self.needs_physics() {
            return Ok(());
        }
        let world = physics.ok_or(CoilError::unconfigured("physics world"))?;
        self.sync_from_physics(&*world)?;

        let leader = self.leader.pose();
        if self.leader.mode() == DriveMode::Physics {
            let turn_input = self.leader.turn_input();
            self.leader.step(turn_input, dt, Some(&mut *world))?;
        }
        if self.drive.mode() == DriveMode::Physics {
            let mut step = DriveStep::new(dt, Some(world));
            self.drive_segments(&leader, &mut step)?;
        }
        Ok(())
    }

    /// Render clock tick.
    pub fn frame_update(
        &mut self,
        dt: f32,
        physics: Option<&mut (dyn PhysicsWorld + '_)>,
    ) -> Result<()> {
        if self.needs_physics() {
            let world = physics.ok_or(CoilError::unconfigured("physics world"))?;
            self.sync_from_physics(&*world)?;
        }

        if self.leader.mode() == DriveMode::Kinematic {
            let turn_input = self.leader.turn_input();
            self.leader.step(turn_input, dt, None)?;
        }

        let leader = self.leader.pose();
        self.chain.update_targets(&leader);

        // Clamp mode has already placed the segments.
        if self.drive.mode() == DriveMode::Kinematic
            && self.chain.follow_mode() == FollowMode::Elastic
        {
            self.drive_segments(&leader, &mut DriveStep::kinematic(dt))?;
        }
        Ok(())
    }

    /// Append a segment one spacing behind the current tail.
    pub fn add_segment(
        &mut self,
        physics: Option<&mut (dyn PhysicsWorld + '_)>,
    ) -> Result<SegmentId> {
        let pose = self.chain.spawn_pose(&self.leader.pose());
        let body = match self.drive.mode() {
            DriveMode::Physics => {
                let world = physics.ok_or(CoilError::unconfigured("physics world"))?;
                let desc = BodyDesc::new(pose, self.config.segment_mass()).with_drag(self.config.drag);
                Some(world.create_body(desc))
            }
            DriveMode::Kinematic => None,
        };
        let id = self.chain.push(pose, body);
        debug!(segment = %id, len = self.chain.len(), "Segment added");
        Ok(id)
    }

    /// Destroy the trailing segment. Returns `None` when the chain is empty.
    pub fn remove_segment(
        &mut self,
        physics: Option<&mut (dyn PhysicsWorld + '_)>,
    ) -> Result<Option<SegmentId>> {
        let tail_body = match self.chain.tail() {
            Some(tail) => tail.body(),
            None => return Ok(None),
        };
        // Destroy the body before popping so a failure leaves the chain intact.
        if let Some(body) = tail_body {
            let world = physics.ok_or(CoilError::unconfigured("physics world"))?;
            world.destroy_body(body)?;
        }
        let removed = self.chain.pop().map(|segment| segment.id());
        if let Some(id) = removed {
            debug!(segment = %id, len = self.chain.len(), "Segment removed");
        }
        Ok(removed)
    }

    /// Release every rigid body the chain owns. Segments stay in place as
    /// kinematic ghosts; the chain should be dropped afterwards.
    ///
    /// Best effort: a body the world refuses to destroy is logged and
    /// skipped. Returns how many bodies were released.
    pub fn despawn(&mut self, physics: &mut dyn PhysicsWorld) -> usize {
        let mut released = 0;
        for body in self.chain.take_bodies() {
            match physics.destroy_body(body) {
                Ok(()) => released += 1,
                Err(err) => warn!(%body, error = %err, "Failed to release segment body"),
            }
        }
        if let Some(body) = self.leader.body() {
            match self.leader.release_body(physics) {
                Ok(()) => released += 1,
                Err(err) => warn!(%body, error = %err, "Failed to release leader body"),
            }
        }
        debug!(released, "Chain despawned");
        released
    }

    fn sync_from_physics(&mut self, world: &dyn PhysicsWorld) -> Result<()> {
        self.leader.sync_from_physics(world)?;
        for segment in self.chain.segments_mut() {
            if let Some(body) = segment.body() {
                segment.set_pose(world.pose(body)?);
            }
        }
        Ok(())
    }

    fn drive_segments(&mut self, leader: &Pose, step: &mut DriveStep<'_>) -> Result<()> {
        for index in 0..self.chain.len() {
            let Some(look_at) = self.chain.look_at(index, leader) else {
                break;
            };
            let segment = &self.chain.segments()[index];
            let pose = self
                .drive
                .drive_segment(segment, segment.target(), look_at, step)?;
            if let Some(segment) = self.chain.segment_mut(index) {
                segment.set_pose(pose);
            }
        }
        Ok(())
    }
}

impl Drop for ChainBody {
    fn drop(&mut self) {
        let live = self.live_bodies();
        if live > 0 {
            warn!(bodies = live, "Chain dropped while still owning rigid bodies");
        }
    }
}
