//! Fireball — a pooled projectile the chain has to surround.
//!
//! A fireball travels along its forward axis toward the earth. Every frame
//! it either strikes the earth or lets its encapsulation detector look for
//! surrounding segments. Whichever happens first decides its fate:
//!
//! - **Nullified**: `Nullified` effect, score awarded, instance released.
//! - **Impacted**: `Impact` effect, damage dealt to the earth, instance
//!   released.
//! - **Expired**: missed the earth and flew past the cull distance, or
//!   outlived `max_age`. Instance released, nothing else.
//!
//! Each fireball kind carries its own config and draws from its own pool.

use crate::earth::Earth;
use crate::encapsulation::{EncapsulationDetector, EncapsulationHooks};
use crate::lifecycle::PooledEntity;
use coil_core::collaborators::{EffectSink, ObjectPool, SpatialQuery};
use coil_core::config::DetectorConfig;
use coil_core::error::{CoilError, Result};
use coil_core::types::{EffectKind, EntityId, EntityKind, Pose};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireballConfig {
    /// Pool key for this kind of fireball.
    #[serde(default = "EntityKind::fireball")]
    pub kind: EntityKind,
    /// Relative chance the spawner picks this kind.
    #[serde(default = "default_weight")]
    pub weight: f32,
    /// Score for nullifying this fireball.
    #[serde(default = "default_score_value")]
    pub score_value: u32,
    /// Damage dealt on reaching the earth.
    #[serde(default = "default_earth_damage")]
    pub earth_damage: u32,
    /// Travel speed in units per second.
    #[serde(default = "default_fall_speed")]
    pub fall_speed: f32,
    /// Fireballs that cannot be encapsulated always reach the earth.
    #[serde(default = "default_can_be_encapsulated")]
    pub can_be_encapsulated: bool,
    /// Seconds before an unresolved fireball is retired.
    #[serde(default = "default_max_age")]
    pub max_age: f32,
    /// Distance from the earth past which a fireball is retired. Absent
    /// means the arena picks twice the spawn radius.
    #[serde(default)]
    pub cull_distance: Option<f32>,
    #[serde(default)]
    pub detector: DetectorConfig,
}

fn default_weight() -> f32 { 1.0 }
fn default_score_value() -> u32 { 10 }
fn default_earth_damage() -> u32 { 10 }
fn default_fall_speed() -> f32 { 5.0 }
fn default_can_be_encapsulated() -> bool { true }
fn default_max_age() -> f32 { 30.0 }

impl Default for FireballConfig {
    fn default() -> Self {
        Self {
            kind: EntityKind::fireball(),
            weight: default_weight(),
            score_value: default_score_value(),
            earth_damage: default_earth_damage(),
            fall_speed: default_fall_speed(),
            can_be_encapsulated: default_can_be_encapsulated(),
            max_age: default_max_age(),
            cull_distance: None,
            detector: DetectorConfig::default(),
        }
    }
}

impl FireballConfig {
    /// A config for another kind of fireball with default settings.
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::new(kind),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.weight.is_finite() && self.weight >= 0.0) {
            return Err(CoilError::invalid_config(
                "fireball.weight",
                self.weight.to_string(),
                "must be non-negative",
            ));
        }
        if !(self.max_age.is_finite() && self.max_age > 0.0) {
            return Err(CoilError::invalid_config(
                "fireball.max_age",
                self.max_age.to_string(),
                "must be positive",
            ));
        }
        if let Some(distance) = self.cull_distance {
            if !(distance.is_finite() && distance > 0.0) {
                return Err(CoilError::invalid_config(
                    "fireball.cull_distance",
                    distance.to_string(),
                    "must be positive",
                ));
            }
        }
        if !(self.fall_speed.is_finite() && self.fall_speed >= 0.0) {
            return Err(CoilError::invalid_config(
                "fireball.fall_speed",
                self.fall_speed.to_string(),
                "must be non-negative",
            ));
        }
        self.detector.validate()
    }
}

/// How a fireball ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FireballOutcome {
    Nullified { score: u32, neighbors: usize },
    Impacted { damage: u32, earth_destroyed: bool },
    Expired { age: f32 },
}

/// A live projectile.
#[derive(Debug)]
pub struct Fireball {
    entity: PooledEntity,
    pose: Pose,
    /// Where it was aimed when launched.
    aim: Vec3,
    config: FireballConfig,
    detector: EncapsulationDetector,
    age: f32,
    outcome: Option<FireballOutcome>,
}

impl Fireball {
    /// Take a fireball instance from `pool` and place it at `pose`.
    pub fn launch(
        pool: &mut dyn ObjectPool,
        pose: Pose,
        aim: Vec3,
        config: FireballConfig,
    ) -> Result<Self> {
        config.validate()?;
        let detector = EncapsulationDetector::new(config.detector.clone())?;
        let entity = PooledEntity::acquire(pool, &config.kind)?;
        Ok(Self {
            entity,
            pose,
            aim,
            config,
            detector,
            age: 0.0,
            outcome: None,
        })
    }

    pub fn id(&self) -> EntityId {
        self.entity.instance()
    }

    pub fn kind(&self) -> &EntityKind {
        &self.config.kind
    }

    pub fn config(&self) -> &FireballConfig {
        &self.config
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn aim(&self) -> Vec3 {
        self.aim
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn detector(&self) -> &EncapsulationDetector {
        &self.detector
    }

    pub fn outcome(&self) -> Option<FireballOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Advance one frame. Returns the outcome on the frame the fireball
    /// ends; finished fireballs do nothing.
    pub fn update(
        &mut self,
        dt: f32,
        earth: &mut Earth,
        query: &dyn SpatialQuery,
        pool: &mut dyn ObjectPool,
        effects: &mut dyn EffectSink,
    ) -> Option<FireballOutcome> {
        if self.outcome.is_some() {
            return None;
        }
        self.age += dt;
        let from = self.pose.position;
        self.pose.position += self.pose.forward() * self.config.fall_speed * dt;

        let instance = self.entity.instance();
        let contact = earth.sweep(from, self.pose.position);
        if let Some(contact) = contact {
            self.pose.position = contact;
        }
        let beyond_cull = self
            .config
            .cull_distance
            .is_some_and(|distance| self.pose.position.distance(earth.position()) > distance);

        let mut hooks = FireballHooks {
            pose: self.pose,
            score_value: self.config.score_value,
            earth,
            entity: &mut self.entity,
            pool,
            effects,
            outcome: None,
        };

        if contact.is_some() {
            if let Err(err) = self.detector.on_direct_hit(self.config.earth_damage, &mut hooks) {
                warn!(fireball = %instance, error = %err, "Impact ignored");
            }
        } else if self.config.can_be_encapsulated {
            self.detector.update(dt, self.pose.position, query, &mut hooks);
        }

        if hooks.outcome.is_none() && (beyond_cull || self.age >= self.config.max_age) {
            debug!(fireball = %instance, age = self.age, "Fireball expired");
            hooks.release();
            hooks.outcome = Some(FireballOutcome::Expired { age: self.age });
        }

        self.outcome = hooks.outcome;
        self.outcome
    }

    /// Give the instance back without an outcome (arena teardown).
    pub fn recall(&mut self, pool: &mut dyn ObjectPool) -> Result<()> {
        self.entity.release(pool)
    }
}

/// Reactions to a fireball's detector, borrowing what they touch.
struct FireballHooks<'a> {
    pose: Pose,
    score_value: u32,
    earth: &'a mut Earth,
    entity: &'a mut PooledEntity,
    pool: &'a mut dyn ObjectPool,
    effects: &'a mut dyn EffectSink,
    outcome: Option<FireballOutcome>,
}

impl FireballHooks<'_> {
    fn release(&mut self) {
        if let Err(err) = self.entity.release(&mut *self.pool) {
            warn!(fireball = %self.entity.instance(), error = %err, "Fireball release failed");
        }
    }
}

impl EncapsulationHooks for FireballHooks<'_> {
    fn nullified(&mut self, neighbors: usize) {
        self.effects
            .raise(EffectKind::Nullified, self.pose.position, self.pose.rotation);
        self.release();
        self.outcome = Some(FireballOutcome::Nullified {
            score: self.score_value,
            neighbors,
        });
    }

    fn impacted(&mut self, damage: u32) {
        self.effects
            .raise(EffectKind::Impact, self.pose.position, self.pose.rotation);
        let earth_destroyed = self.earth.take_damage(damage);
        self.release();
        self.outcome = Some(FireballOutcome::Impacted {
            damage,
            earth_destroyed,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::earth::EarthConfig;
    use crate::effects_impl::EffectLog;
    use crate::pool::{PoolConfig, PoolRegistry};
    use crate::spatial_impl::CandidateIndex;
    use coil_core::collaborators::{CandidateRef, SpatialCandidate};
    use coil_core::types::{SegmentId, Tag};
    use glam::Quat;

    struct Scene {
        pools: PoolRegistry,
        earth: Earth,
        effects: EffectLog,
        index: CandidateIndex,
    }

    fn scene() -> Scene {
        Scene {
            pools: PoolRegistry::new()
                .with_kind(EntityKind::fireball(), PoolConfig::default())
                .unwrap(),
            earth: Earth::new(&EarthConfig::default()).unwrap(),
            effects: EffectLog::new(),
            index: CandidateIndex::new(),
        }
    }

    /// Fireball ten units above the earth, falling straight down.
    fn falling(scene: &mut Scene, config: FireballConfig) -> Fireball {
        let pose = Pose::new(Vec3::new(0.0, 10.0, 0.0), Quat::from_rotation_z(std::f32::consts::PI));
        Fireball::launch(&mut scene.pools, pose, Vec3::ZERO, config).unwrap()
    }

    fn step(scene: &mut Scene, fireball: &mut Fireball, dt: f32) -> Option<FireballOutcome> {
        fireball.update(dt, &mut scene.earth, &scene.index, &mut scene.pools, &mut scene.effects)
    }

    #[test]
    fn falls_toward_earth_and_impacts() {
        let mut scene = scene();
        let mut fireball = falling(&mut scene, FireballConfig::default());

        let mut outcome = None;
        for _ in 0..200 {
            outcome = outcome.or(step(&mut scene, &mut fireball, 0.05));
        }

        assert_eq!(
            outcome,
            Some(FireballOutcome::Impacted {
                damage: 10,
                earth_destroyed: false
            })
        );
        assert_eq!(scene.earth.health(), 90);
        assert_eq!(scene.effects.count(&EffectKind::Impact), 1);
        assert_eq!(scene.pools.stats(&EntityKind::fireball()).unwrap().active, 0);
    }

    #[test]
    fn surrounded_fireball_is_nullified() {
        let mut scene = scene();
        for i in 0..3 {
            scene.index.insert(SpatialCandidate::new(
                CandidateRef::Segment(SegmentId(i)),
                Tag::segment(),
                Vec3::new(i as f32 - 1.0, 9.0, 0.0),
            ));
        }
        let mut fireball = falling(&mut scene, FireballConfig::default());

        let outcome = step(&mut scene, &mut fireball, 0.02);

        assert_eq!(
            outcome,
            Some(FireballOutcome::Nullified {
                score: 10,
                neighbors: 3
            })
        );
        assert_eq!(scene.effects.count(&EffectKind::Nullified), 1);
        assert_eq!(scene.earth.hits(), 0);
        assert!(!fireball.entity.is_held());
        // Finished fireballs ignore later frames
        assert_eq!(step(&mut scene, &mut fireball, 10.0), None);
        assert_eq!(scene.earth.hits(), 0);
    }

    #[test]
    fn fast_fireball_cannot_step_over_the_earth() {
        let mut scene = scene();
        let config = FireballConfig {
            fall_speed: 300.0,
            ..FireballConfig::default()
        };
        let mut fireball = falling(&mut scene, config);

        // One frame moves it 15 units: from y = 10 straight past the sphere
        let outcome = step(&mut scene, &mut fireball, 0.05);

        assert_eq!(
            outcome,
            Some(FireballOutcome::Impacted {
                damage: 10,
                earth_destroyed: false
            })
        );
        assert!((fireball.pose().position - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-3);
        assert_eq!(scene.earth.hits(), 1);
    }

    #[test]
    fn missed_fireball_expires_past_the_cull_distance() {
        let mut scene = scene();
        let config = FireballConfig {
            cull_distance: Some(15.0),
            ..FireballConfig::default()
        };
        // Falls along x = 5, clear of the earth
        let pose = Pose::new(Vec3::new(5.0, 10.0, 0.0), Quat::from_rotation_z(std::f32::consts::PI));
        let mut fireball = Fireball::launch(&mut scene.pools, pose, Vec3::ZERO, config).unwrap();

        let mut outcome = None;
        for _ in 0..200 {
            outcome = outcome.or(step(&mut scene, &mut fireball, 0.05));
        }

        assert!(matches!(outcome, Some(FireballOutcome::Expired { .. })));
        assert!(fireball.pose().position.y < -13.0);
        assert_eq!(scene.earth.hits(), 0);
        assert!(scene.effects.is_empty());
        let stats = scene.pools.stats(&EntityKind::fireball()).unwrap();
        assert_eq!((stats.active, stats.idle, stats.misuse), (0, 1, 0));
    }

    #[test]
    fn hovering_fireball_expires_with_age() {
        let mut scene = scene();
        let config = FireballConfig {
            fall_speed: 0.0,
            max_age: 1.0,
            ..FireballConfig::default()
        };
        let mut fireball = falling(&mut scene, config);

        let outcomes: Vec<_> = (0..30)
            .filter_map(|_| step(&mut scene, &mut fireball, 0.05))
            .collect();

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], FireballOutcome::Expired { age } if age >= 1.0));
        assert!(!fireball.entity.is_held());
    }

    #[test]
    fn kinds_draw_from_their_own_pool() {
        let mut scene = scene();
        let kind = EntityKind::new("comet");
        scene.pools.register(kind.clone(), PoolConfig::default()).unwrap();
        let pose = Pose::at(Vec3::new(0.0, 10.0, 0.0));

        let mut comet =
            Fireball::launch(&mut scene.pools, pose, Vec3::ZERO, FireballConfig::of_kind("comet")).unwrap();

        assert_eq!(comet.kind(), &kind);
        assert_eq!(scene.pools.stats(&kind).unwrap().active, 1);
        assert_eq!(scene.pools.stats(&EntityKind::fireball()).unwrap().active, 0);
        comet.recall(&mut scene.pools).unwrap();

        // No pool registered for this kind
        let err = Fireball::launch(&mut scene.pools, pose, Vec3::ZERO, FireballConfig::of_kind("meteor"));
        assert!(err.is_err());
    }

    #[test]
    fn unencapsulatable_fireball_ignores_segments() {
        let mut scene = scene();
        for i in 0..5 {
            scene.index.insert(SpatialCandidate::new(
                CandidateRef::Segment(SegmentId(i)),
                Tag::segment(),
                Vec3::new(0.0, 9.5, 0.0),
            ));
        }
        let config = FireballConfig {
            can_be_encapsulated: false,
            ..FireballConfig::default()
        };
        let mut fireball = falling(&mut scene, config);

        assert_eq!(step(&mut scene, &mut fireball, 0.02), None);
        assert_eq!(fireball.detector().evaluations(), 0);
    }
}
