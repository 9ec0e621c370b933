//! FireballSpawner — seeded launch schedule around the earth.
//!
//! Every launch picks one of the registered fireball kinds by weight.

use coil_core::error::{CoilError, Result};
use coil_core::math::look_rotation;
use coil_core::types::{EntityKind, Pose};
use glam::{Quat, Vec3};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnerConfig {
    /// Distance from the earth's center at which fireballs appear.
    #[serde(default = "default_spawn_radius")]
    pub spawn_radius: f32,
    /// Seconds between launches, drawn uniformly from `[min, max]`.
    #[serde(default = "default_spawn_interval")]
    pub spawn_interval: (f32, f32),
    /// Fireballs aim at a random point within this distance of the center.
    #[serde(default = "default_aim_jitter")]
    pub aim_jitter: f32,
}

fn default_spawn_radius() -> f32 { 20.0 }
fn default_spawn_interval() -> (f32, f32) { (1.0, 3.0) }
fn default_aim_jitter() -> f32 { 1.5 }

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            spawn_radius: default_spawn_radius(),
            spawn_interval: default_spawn_interval(),
            aim_jitter: default_aim_jitter(),
        }
    }
}

impl SpawnerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.spawn_radius.is_finite() && self.spawn_radius > 0.0) {
            return Err(CoilError::invalid_config(
                "spawner.spawn_radius",
                self.spawn_radius.to_string(),
                "must be positive",
            ));
        }
        let (min, max) = self.spawn_interval;
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || min > max {
            return Err(CoilError::invalid_config(
                "spawner.spawn_interval",
                format!("[{}, {}]", min, max),
                "must satisfy 0 < min <= max",
            ));
        }
        if !(self.aim_jitter.is_finite() && self.aim_jitter >= 0.0) {
            return Err(CoilError::invalid_config(
                "spawner.aim_jitter",
                self.aim_jitter.to_string(),
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Where and at what a new fireball is launched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpawnPlan {
    pub kind: EntityKind,
    /// Spawn point, rotated so forward points at `aim`.
    pub pose: Pose,
    pub aim: Vec3,
}

/// Decides when and where fireballs appear.
#[derive(Debug, Clone)]
pub struct FireballSpawner {
    config: SpawnerConfig,
    rng: StdRng,
    kinds: Vec<EntityKind>,
    /// Absent while only one kind is registered.
    choice: Option<WeightedIndex<f32>>,
    /// Seconds until the next launch.
    countdown: f32,
    spawned: u64,
}

impl FireballSpawner {
    pub fn new(config: SpawnerConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut spawner = Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            kinds: vec![EntityKind::fireball()],
            choice: None,
            countdown: 0.0,
            spawned: 0,
        };
        spawner.countdown = spawner.next_interval();
        Ok(spawner)
    }

    /// Replace the kinds to launch with weighted `(kind, weight)` pairs.
    pub fn with_kinds(mut self, kinds: Vec<(EntityKind, f32)>) -> Result<Self> {
        let invalid = |reason: &str| {
            CoilError::invalid_config("fireballs", format!("{} kinds", kinds.len()), reason)
        };
        if kinds.is_empty() {
            return Err(invalid("at least one fireball kind is required"));
        }
        let choice = WeightedIndex::new(kinds.iter().map(|(_, weight)| *weight))
            .map_err(|_| invalid("weights must be non-negative with a positive sum"))?;
        self.choice = (kinds.len() > 1).then_some(choice);
        self.kinds = kinds.into_iter().map(|(kind, _)| kind).collect();
        Ok(self)
    }

    pub fn kinds(&self) -> &[EntityKind] {
        &self.kinds
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    /// Seconds until the next launch.
    pub fn countdown(&self) -> f32 {
        self.countdown
    }

    /// Advance the schedule. Returns a plan when a launch is due; at most
    /// one launch per call.
    pub fn update(&mut self, dt: f32, earth: Vec3) -> Option<SpawnPlan> {
        self.countdown -= dt;
        if self.countdown > 0.0 {
            return None;
        }
        self.countdown = self.next_interval();
        Some(self.plan(earth))
    }

    /// Draw a launch around `earth` without touching the schedule.
    pub fn plan(&mut self, earth: Vec3) -> SpawnPlan {
        let angle = self.rng.gen_range(0.0..TAU);
        let position = earth + Vec3::new(angle.cos(), angle.sin(), 0.0) * self.config.spawn_radius;

        // Uniform point inside a disc of radius `aim_jitter`
        let jitter_angle = self.rng.gen_range(0.0..TAU);
        let jitter = self.config.aim_jitter * self.rng.gen::<f32>().sqrt();
        let aim = earth + Vec3::new(jitter_angle.cos(), jitter_angle.sin(), 0.0) * jitter;

        let rotation = look_rotation(aim - position).unwrap_or(Quat::IDENTITY);
        let kind = match &self.choice {
            Some(choice) => self.kinds[choice.sample(&mut self.rng)].clone(),
            None => self.kinds[0].clone(),
        };
        self.spawned += 1;
        SpawnPlan {
            kind,
            pose: Pose::new(position, rotation),
            aim,
        }
    }

    fn next_interval(&mut self) -> f32 {
        let (min, max) = self.config.spawn_interval;
        self.rng.gen_range(min..=max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plans_start_on_the_circle_and_face_inward() {
        let mut spawner = FireballSpawner::new(SpawnerConfig::default(), 7).unwrap();
        let earth = Vec3::new(1.0, -2.0, 0.0);
        for _ in 0..20 {
            let plan = spawner.plan(earth);
            assert!((plan.pose.position.distance(earth) - 20.0).abs() < 1e-3);
            assert!(plan.aim.distance(earth) <= 1.5 + 1e-5);
            let toward = (plan.aim - plan.pose.position).normalize();
            assert!((plan.pose.forward() - toward).length() < 1e-4);
        }
    }

    #[test]
    fn same_seed_same_schedule() {
        let mut a = FireballSpawner::new(SpawnerConfig::default(), 42).unwrap();
        let mut b = FireballSpawner::new(SpawnerConfig::default(), 42).unwrap();
        for _ in 0..500 {
            assert_eq!(a.update(0.05, Vec3::ZERO), b.update(0.05, Vec3::ZERO));
        }
        assert!(a.spawned() > 0);
    }

    #[test]
    fn interval_stays_in_range() {
        let config = SpawnerConfig {
            spawn_interval: (0.5, 0.75),
            ..SpawnerConfig::default()
        };
        let mut spawner = FireballSpawner::new(config, 1).unwrap();
        for _ in 0..50 {
            let countdown = spawner.countdown();
            assert!((0.5..=0.75).contains(&countdown));
            spawner.update(countdown, Vec3::ZERO);
        }
        assert_eq!(spawner.spawned(), 50);
    }

    #[test]
    fn kinds_follow_their_weights() {
        let mut spawner = FireballSpawner::new(SpawnerConfig::default(), 3)
            .unwrap()
            .with_kinds(vec![
                (EntityKind::fireball(), 3.0),
                (EntityKind::new("comet"), 1.0),
                (EntityKind::new("never"), 0.0),
            ])
            .unwrap();

        let mut comets = 0;
        for _ in 0..400 {
            let plan = spawner.plan(Vec3::ZERO);
            assert_ne!(plan.kind.as_str(), "never");
            if plan.kind.as_str() == "comet" {
                comets += 1;
            }
        }
        assert!((60..140).contains(&comets), "comets: {comets}");
    }

    #[test]
    fn rejects_empty_or_zero_weights() {
        let spawner = || FireballSpawner::new(SpawnerConfig::default(), 0).unwrap();
        assert!(spawner().with_kinds(Vec::new()).is_err());
        assert!(spawner()
            .with_kinds(vec![(EntityKind::fireball(), 0.0)])
            .is_err());
    }

    #[test]
    fn rejects_inverted_interval() {
        let config = SpawnerConfig {
            spawn_interval: (3.0, 1.0),
            ..SpawnerConfig::default()
        };
        assert!(FireballSpawner::new(config, 0).is_err());
    }
}
