//! Segment chain — the ordered body trailing the leader.
//!
//! The chain is a contiguous sequence with stack discipline: segments are
//! appended at the tail and only the tail can be removed. Index 0 is the
//! segment closest to the leader.
//!
//! Each segment stores its own target, so the sequence of poses and the
//! sequence of targets can never disagree in length.
//!
//! Two propagation modes are supported:
//! - **Elastic** pursuit: segment `i` aims for a point `spacing` behind the
//!   *target* of segment `i-1`, along the line from its own current
//!   position. Propagating through targets rather than poses keeps one
//!   segment's oscillation from feeding into the next.
//! - **Clamp**: a segment farther than `spacing` from its predecessor's
//!   *actual* position is pulled to exactly `spacing`; closer segments stay
//!   where they are, like slack rope.

use coil_core::error::{CoilError, Result};
use coil_core::math::{look_rotation, safe_normalize};
use coil_core::types::{BodyHandle, FollowMode, Pose, SegmentId};
use glam::Vec3;
use serde::Serialize;

/// One link of the chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    id: SegmentId,
    pose: Pose,
    /// Where the segment is heading this step. Not rendered.
    target: Vec3,
    /// Rigid body in the physics world (physics drive only).
    body: Option<BodyHandle>,
}

impl Segment {
    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }
}

/// The ordered sequence of segments behind a leader.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentChain {
    segments: Vec<Segment>,
    spacing: f32,
    follow_mode: FollowMode,
    next_id: u64,
}

impl SegmentChain {
    /// An empty chain. Spacing must be positive.
    pub fn new(spacing: f32, follow_mode: FollowMode) -> Result<Self> {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(CoilError::invalid_config(
                "chain.spacing",
                spacing.to_string(),
                "must be positive",
            ));
        }
        Ok(Self {
            segments: Vec::new(),
            spacing,
            follow_mode,
            next_id: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn follow_mode(&self) -> FollowMode {
        self.follow_mode
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn segment_mut(&mut self, index: usize) -> Option<&mut Segment> {
        self.segments.get_mut(index)
    }

    pub fn segments_mut(&mut self) -> impl Iterator<Item = &mut Segment> {
        self.segments.iter_mut()
    }

    /// The trailing-most segment.
    pub fn tail(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Current targets, in chain order.
    pub fn targets(&self) -> Vec<Vec3> {
        self.segments.iter().map(|s| s.target).collect()
    }

    /// Current positions, in chain order.
    pub fn positions(&self) -> Vec<Vec3> {
        self.segments.iter().map(|s| s.pose.position).collect()
    }

    /// Where the next appended segment goes: one spacing behind the tail
    /// along the tail's forward axis, facing the same way. An empty chain
    /// spawns behind the leader instead.
    pub fn spawn_pose(&self, leader: &Pose) -> Pose {
        let anchor = self.tail().map(|s| s.pose).unwrap_or(*leader);
        Pose::new(anchor.position - anchor.forward() * self.spacing, anchor.rotation)
    }

    /// Append a segment at `pose`. Existing segments are not touched.
    pub fn push(&mut self, pose: Pose, body: Option<BodyHandle>) -> SegmentId {
        let id = SegmentId(self.next_id);
        self.next_id += 1;
        self.segments.push(Segment {
            id,
            pose,
            target: pose.position,
            body,
        });
        id
    }

    /// Remove and return the trailing segment. Empty chains return `None`.
    pub fn pop(&mut self) -> Option<Segment> {
        self.segments.pop()
    }

    /// The point segment `index` should face: its predecessor's target, or
    /// the leader for the first segment. `None` past the end of the chain;
    /// `index == len` answers for a segment about to be appended.
    pub fn look_at(&self, index: usize, leader: &Pose) -> Option<Vec3> {
        match index {
            0 => Some(leader.position),
            i => self.segments.get(i - 1).map(|segment| segment.target),
        }
    }

    /// Recompute every target by elastic back-propagation from the leader.
    ///
    /// `target[0] = leader − dir₀ × spacing` where `dir₀` points from
    /// segment 0 to the leader; `target[i] = target[i-1] − dirᵢ × spacing`
    /// where `dirᵢ` points from segment `i` to `target[i-1]`. A segment
    /// sitting exactly on its anchor falls back to its own forward axis so
    /// every target stays `spacing` from its anchor.
    pub fn recompute_targets(&mut self, leader: &Pose) -> Vec<Vec3> {
        let spacing = self.spacing;
        let mut anchor = leader.position;
        for segment in &mut self.segments {
            let direction = safe_normalize(anchor - segment.pose.position)
                .unwrap_or_else(|| segment.pose.forward());
            segment.target = anchor - direction * spacing;
            anchor = segment.target;
        }
        self.targets()
    }

    /// Apply the distance clamp from the leader down the chain.
    ///
    /// Each segment is compared with its predecessor's position *after*
    /// that predecessor was clamped this pass. Returns how many segments
    /// moved.
    pub fn apply_clamp(&mut self, leader: &Pose) -> usize {
        let spacing = self.spacing;
        let mut anchor = leader.position;
        let mut moved = 0;
        for segment in &mut self.segments {
            let offset = anchor - segment.pose.position;
            let distance = offset.length();
            if distance > spacing {
                if let Some(direction) = safe_normalize(offset) {
                    segment.pose.position += direction * (distance - spacing);
                    if let Some(rotation) = look_rotation(direction) {
                        segment.pose.rotation = rotation;
                    }
                    moved += 1;
                }
            }
            segment.target = segment.pose.position;
            anchor = segment.pose.position;
        }
        moved
    }

    /// Advance targets with whichever mode the chain was built with.
    pub fn update_targets(&mut self, leader: &Pose) {
        match self.follow_mode {
            FollowMode::Elastic => {
                self.recompute_targets(leader);
            }
            FollowMode::Clamp => {
                self.apply_clamp(leader);
            }
        }
    }

    /// Distances between consecutive segment positions (tail excluded).
    pub fn gaps(&self) -> Vec<f32> {
        self.segments
            .windows(2)
            .map(|pair| pair[0].pose.position.distance(pair[1].pose.position))
            .collect()
    }

    /// Detach every body handle, leaving the segments in place.
    pub(crate) fn take_bodies(&mut self) -> Vec<BodyHandle> {
        self.segments.iter_mut().filter_map(|s| s.body.take()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn straight_chain(count: usize, spacing: f32) -> (SegmentChain, Pose) {
        let leader = Pose::at(Vec3::ZERO);
        let mut chain = SegmentChain::new(spacing, FollowMode::Elastic).unwrap();
        for _ in 0..count {
            let pose = chain.spawn_pose(&leader);
            chain.push(pose, None);
        }
        (chain, leader)
    }

    #[test]
    fn rejects_non_positive_spacing() {
        assert!(SegmentChain::new(0.0, FollowMode::Elastic).is_err());
        assert!(SegmentChain::new(-1.0, FollowMode::Clamp).is_err());
        assert!(SegmentChain::new(f32::NAN, FollowMode::Elastic).is_err());
    }

    #[test]
    fn spawns_trail_behind_leader() {
        let (chain, _) = straight_chain(3, 0.5);
        let ys: Vec<f32> = chain.positions().iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![-0.5, -1.0, -1.5]);
    }

    #[test]
    fn first_target_lies_on_ray_to_leader() {
        let (mut chain, _) = straight_chain(2, 1.0);
        let leader = Pose::at(Vec3::new(3.0, 4.0, 0.0));
        chain.segment_mut(0).unwrap().set_pose(Pose::at(Vec3::ZERO));

        let targets = chain.recompute_targets(&leader);

        assert!((targets[0].distance(leader.position) - 1.0).abs() < 1e-5);
        // On the segment→leader ray: (0.6, 0.8) direction, 4 units out
        assert!((targets[0] - Vec3::new(2.4, 3.2, 0.0)).length() < 1e-5);
    }

    #[test]
    fn targets_are_spacing_apart() {
        let (mut chain, _) = straight_chain(5, 0.75);
        for (i, segment) in chain.segments_mut().enumerate() {
            segment.set_pose(Pose::at(Vec3::new(i as f32 * 0.3, -(i as f32), 0.0)));
        }
        let leader = Pose::at(Vec3::new(2.0, 1.0, 0.0));
        let targets = chain.recompute_targets(&leader);

        assert!((targets[0].distance(leader.position) - 0.75).abs() < 1e-5);
        for pair in targets.windows(2) {
            assert!((pair[0].distance(pair[1]) - 0.75).abs() < 1e-5);
        }
    }

    #[test]
    fn coincident_segment_keeps_spacing_without_nan() {
        let (mut chain, leader) = straight_chain(1, 1.0);
        chain
            .segment_mut(0)
            .unwrap()
            .set_pose(Pose::new(leader.position, Quat::IDENTITY));

        let targets = chain.recompute_targets(&leader);

        assert!(targets[0].is_finite());
        assert!((targets[0] - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn clamp_pulls_only_stretched_segments() {
        let mut chain = SegmentChain::new(1.0, FollowMode::Clamp).unwrap();
        chain.push(Pose::at(Vec3::new(0.0, -0.5, 0.0)), None);
        chain.push(Pose::at(Vec3::new(0.0, -4.0, 0.0)), None);
        let leader = Pose::at(Vec3::ZERO);

        let moved = chain.apply_clamp(&leader);

        assert_eq!(moved, 1);
        assert_eq!(chain.positions()[0], Vec3::new(0.0, -0.5, 0.0));
        assert!((chain.positions()[1] - Vec3::new(0.0, -1.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn clamp_faces_the_predecessor() {
        let mut chain = SegmentChain::new(1.0, FollowMode::Clamp).unwrap();
        chain.push(Pose::at(Vec3::new(-3.0, 0.0, 0.0)), None);
        chain.apply_clamp(&Pose::at(Vec3::ZERO));

        let forward = chain.segment(0).unwrap().pose().forward();
        assert!((forward - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn push_then_pop_restores_tail() {
        let (mut chain, leader) = straight_chain(3, 1.0);
        let tail_before = chain.tail().map(Segment::id);

        let pushed = chain.push(chain.spawn_pose(&leader), None);
        let popped = chain.pop().map(|s| s.id());

        assert_eq!(popped, Some(pushed));
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.tail().map(Segment::id), tail_before);
    }

    #[test]
    fn pop_on_empty_is_noop() {
        let mut chain = SegmentChain::new(1.0, FollowMode::Elastic).unwrap();
        assert!(chain.pop().is_none());
        assert!(chain.is_empty());
    }

    #[test]
    fn look_at_past_the_end_is_none() {
        let (mut chain, leader) = straight_chain(2, 1.0);
        let targets = chain.recompute_targets(&leader);

        assert_eq!(chain.look_at(0, &leader), Some(leader.position));
        assert_eq!(chain.look_at(2, &leader), Some(targets[1]));
        assert_eq!(chain.look_at(3, &leader), None);
        assert_eq!(chain.look_at(usize::MAX, &leader), None);
    }

    #[test]
    fn ids_are_never_reused() {
        let (mut chain, leader) = straight_chain(2, 1.0);
        chain.pop();
        let id = chain.push(chain.spawn_pose(&leader), None);
        assert_eq!(id, SegmentId(2));
    }
}
