//! Spatial queries — "what is near this point?"
//!
//! The encapsulation detector never walks the chain itself. It asks a
//! spatial query for tagged candidates inside a sphere and counts what comes
//! back. Results are unordered; callers must not assume they are sorted by
//! distance.

use crate::types::{EntityId, SegmentId, Tag};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What a spatial candidate refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateRef {
    Segment(SegmentId),
    Entity(EntityId),
}

/// One entity returned by a spatial query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialCandidate {
    pub entity: CandidateRef,
    pub tag: Tag,
    pub position: Vec3,
    /// Radius within which this candidate counts as surrounding something.
    /// `None` means anything the query returns counts.
    pub encapsulate_radius: Option<f32>,
}

impl SpatialCandidate {
    pub fn new(entity: CandidateRef, tag: Tag, position: Vec3) -> Self {
        Self {
            entity,
            tag,
            position,
            encapsulate_radius: None,
        }
    }

    pub fn with_encapsulate_radius(mut self, radius: f32) -> Self {
        self.encapsulate_radius = Some(radius);
        self
    }

    /// Whether this candidate surrounds `point` by its own measure.
    pub fn encapsulates(&self, point: Vec3) -> bool {
        match self.encapsulate_radius {
            Some(radius) => self.position.distance(point) <= radius,
            None => true,
        }
    }
}

/// Sphere overlap query with an exact-match tag filter.
pub trait SpatialQuery {
    /// All candidates within `radius` of `center` whose tag equals `tag`.
    fn query(&self, center: Vec3, radius: f32, tag: &Tag) -> Vec<SpatialCandidate>;
}

impl<T: SpatialQuery + ?Sized> SpatialQuery for &T {
    fn query(&self, center: Vec3, radius: f32, tag: &Tag) -> Vec<SpatialCandidate> {
        (**self).query(center, radius, tag)
    }
}
