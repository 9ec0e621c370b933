//! CandidateIndex — an in-memory spatial query over a flat candidate list.
//!
//! Chains in this simulation are tens of segments long, so a linear scan
//! answers a sphere query faster than maintaining a tree would. The index
//! is rebuilt from the chain once per frame, after segments have moved.

use coil_chain::segment_chain::SegmentChain;
use coil_core::collaborators::{CandidateRef, SpatialCandidate, SpatialQuery};
use coil_core::types::Tag;
use glam::Vec3;

#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    candidates: Vec<SpatialCandidate>,
}

impl CandidateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// An index holding every segment of `chain`, tagged as segments.
    pub fn from_chain(chain: &SegmentChain, encapsulate_radius: Option<f32>) -> Self {
        let mut index = Self::new();
        index.sync_chain(chain, encapsulate_radius);
        index
    }

    /// Replace the contents with the current segment positions of `chain`.
    pub fn sync_chain(&mut self, chain: &SegmentChain, encapsulate_radius: Option<f32>) {
        self.candidates.clear();
        for segment in chain.segments() {
            let candidate = SpatialCandidate::new(
                CandidateRef::Segment(segment.id()),
                Tag::segment(),
                segment.position(),
            );
            self.candidates.push(match encapsulate_radius {
                Some(radius) => candidate.with_encapsulate_radius(radius),
                None => candidate,
            });
        }
    }

    pub fn insert(&mut self, candidate: SpatialCandidate) {
        self.candidates.push(candidate);
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl SpatialQuery for CandidateIndex {
    fn query(&self, center: Vec3, radius: f32, tag: &Tag) -> Vec<SpatialCandidate> {
        let radius_sq = radius * radius;
        self.candidates
            .iter()
            .filter(|c| &c.tag == tag && c.position.distance_squared(center) <= radius_sq)
            .cloned()
            .collect()
    }
}
