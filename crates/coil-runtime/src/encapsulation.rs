//! Encapsulation detection — has a target been surrounded by the chain?
//!
//! A detector tracks one entity (a fireball). On a fixed interval it asks
//! the spatial query for tagged neighbors around that entity and counts
//! them. If one evaluation alone finds at least `min_encapsulation`
//! neighbors, the detector resolves. Counts never carry over between
//! evaluations: a chain has to close around the target in one go.
//!
//! State machine:
//!
//! ```text
//! Idle ──first evaluation──▶ Evaluating ──count ≥ min──▶ Resolved(Encapsulated)
//!   │                            │
//!   └──────────direct hit────────┴──────────────────────▶ Resolved(DirectHit)
//! ```
//!
//! Resolved is terminal. Both paths share the same flag, so an entity is
//! either nullified or impacts, never both.

use coil_core::collaborators::SpatialQuery;
use coil_core::config::DetectorConfig;
use coil_core::error::{CoilError, Result};
use glam::Vec3;
use serde::Serialize;
use tracing::{info, warn};

/// How a detector reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Enough neighbors surrounded the target in a single evaluation.
    Encapsulated { neighbors: usize },
    /// The target struck what it was aimed at first.
    DirectHit { damage: u32 },
}

/// Lifecycle of a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorState {
    /// Not evaluated yet.
    Idle,
    /// Evaluated at least once without reaching the threshold.
    Evaluating,
    /// Terminal.
    Resolved(Resolution),
}

/// Callbacks fired when a detector resolves. Exactly one of them fires,
/// exactly once, per detector.
pub trait EncapsulationHooks {
    /// The target was surrounded by `neighbors` matching candidates.
    fn nullified(&mut self, neighbors: usize);

    /// The target hit its destination and deals `damage`.
    fn impacted(&mut self, damage: u32);
}

/// Hooks that ignore every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl EncapsulationHooks for NoHooks {
    fn nullified(&mut self, _neighbors: usize) {}
    fn impacted(&mut self, _damage: u32) {}
}

/// Periodic neighbor counter around one tracked entity.
#[derive(Debug, Clone, Serialize)]
pub struct EncapsulationDetector {
    config: DetectorConfig,
    state: DetectorState,
    /// Seconds accumulated since the last evaluation.
    elapsed: f32,
    /// Neighbors counted by the most recent evaluation.
    last_count: usize,
    evaluations: u64,
}

impl EncapsulationDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: DetectorState::Idle,
            elapsed: 0.0,
            last_count: 0,
            evaluations: 0,
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, DetectorState::Resolved(_))
    }

    pub fn resolution(&self) -> Option<Resolution> {
        match self.state {
            DetectorState::Resolved(resolution) => Some(resolution),
            _ => None,
        }
    }

    pub fn last_count(&self) -> usize {
        self.last_count
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Advance the interval timer and evaluate when it is due.
    ///
    /// The first update evaluates immediately; afterwards evaluations run
    /// every `evaluation_interval` seconds (every update when the interval
    /// is zero). At most one evaluation runs per update. No-op once
    /// resolved.
    pub fn update(
        &mut self,
        dt: f32,
        center: Vec3,
        query: &dyn SpatialQuery,
        hooks: &mut dyn EncapsulationHooks,
    ) -> Option<Resolution> {
        if self.is_resolved() {
            return None;
        }
        self.elapsed += dt;
        let interval = self.config.evaluation_interval;
        let due = self.state == DetectorState::Idle || interval <= 0.0 || self.elapsed >= interval;
        if !due {
            return None;
        }
        self.elapsed = 0.0;
        self.evaluate(center, query, hooks)
    }

    /// Run one evaluation now, regardless of the timer.
    pub fn evaluate(
        &mut self,
        center: Vec3,
        query: &dyn SpatialQuery,
        hooks: &mut dyn EncapsulationHooks,
    ) -> Option<Resolution> {
        if self.is_resolved() {
            return None;
        }

        let tag = &self.config.tag;
        let count = query
            .query(center, self.config.detection_radius, tag)
            .iter()
            .filter(|candidate| &candidate.tag == tag && candidate.encapsulates(center))
            .count();
        self.last_count = count;
        self.evaluations += 1;

        if count < self.config.min_encapsulation {
            self.state = DetectorState::Evaluating;
            return None;
        }

        let resolution = Resolution::Encapsulated { neighbors: count };
        self.state = DetectorState::Resolved(resolution);
        info!(
            neighbors = count,
            required = self.config.min_encapsulation,
            evaluation = self.evaluations,
            "Target encapsulated"
        );
        hooks.nullified(count);
        Some(resolution)
    }

    /// Resolve by direct collision with the tracked target.
    ///
    /// Fails with [`CoilError::AlreadyResolved`] if the detector has
    /// already resolved either way; the hooks are not called again.
    pub fn on_direct_hit(
        &mut self,
        damage: u32,
        hooks: &mut dyn EncapsulationHooks,
    ) -> Result<Resolution> {
        if let DetectorState::Resolved(previous) = self.state {
            warn!(?previous, "Direct hit on an already resolved detector ignored");
            return Err(CoilError::AlreadyResolved);
        }
        let resolution = Resolution::DirectHit { damage };
        self.state = DetectorState::Resolved(resolution);
        info!(damage, "Target hit directly");
        hooks.impacted(damage);
        Ok(resolution)
    }
}
