//! Arena — one chain defending the earth from falling fireballs.
//!
//! The arena owns every collaborator the chain and fireballs need and runs
//! them on two clocks. Each `step(frame_dt)`:
//! 1. Fixed ticks drain the time accumulator: chain forces, then the
//!    physics world integrates
//! 2. One frame tick: leader/segment kinematics, targets
//! 3. The spatial index is rebuilt from the segment positions
//! 4. Stopped effects go back to their pools
//! 5. The spawner may launch a fireball of a weighted random kind
//! 6. Every live fireball moves and is checked for impact, encapsulation
//!    or expiry
//! 7. Finished fireballs are dropped; nullifications may grow the chain

use crate::earth::{Earth, EarthConfig};
use crate::effects_impl::{EffectConfig, PooledEffects};
use crate::encapsulation::DetectorState;
use crate::fireball::{Fireball, FireballConfig, FireballOutcome};
use crate::physics_impl::PointMassWorld;
use crate::pool::{PoolConfig, PoolRegistry, PoolStats};
use crate::spatial_impl::CandidateIndex;
use crate::spawner::{FireballSpawner, SpawnerConfig};
use coil_chain::body::ChainBody;
use coil_core::collaborators::PhysicsWorld;
use coil_core::config::{ChainConfig, LeaderConfig};
use coil_core::error::{CoilError, Result};
use coil_core::input::DirectionInput;
use coil_core::types::{EntityId, EntityKind, Pose, SegmentId, Tick};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Event emitted by the arena during simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ArenaEvent {
    /// A fireball was launched.
    Spawned { fireball: EntityId, kind: EntityKind, position: Vec3, aim: Vec3 },
    /// A fireball was surrounded by the chain.
    Nullified { fireball: EntityId, score: u32, neighbors: usize },
    /// A fireball reached the earth.
    Impacted { fireball: EntityId, damage: u32 },
    /// A fireball missed and was retired.
    Expired { fireball: EntityId, age: f32 },
    /// The chain grew by one segment.
    SegmentAdded { segment: SegmentId, len: usize },
    /// The chain lost its tail segment.
    SegmentRemoved { segment: SegmentId, len: usize },
    /// The earth ran out of health.
    EarthDestroyed { tick: Tick },
}

/// Configuration for an arena run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Physics step in seconds (default: 0.02).
    #[serde(default = "default_fixed_dt")]
    pub fixed_dt: f32,
    /// Fixed steps allowed per frame before the backlog is dropped (default: 8).
    #[serde(default = "default_max_fixed_steps")]
    pub max_fixed_steps: u32,
    /// Seed for the fireball spawner.
    #[serde(default)]
    pub seed: u64,
    /// Where the leader starts, facing +Y.
    #[serde(default = "default_leader_start")]
    pub leader_start: Vec3,
    /// Encapsulation radius every segment publishes. Absent means any
    /// segment the query finds counts.
    #[serde(default)]
    pub segment_encapsulate_radius: Option<f32>,
    /// Add a segment for every nullified fireball.
    #[serde(default = "default_grow_on_nullify")]
    pub grow_on_nullify: bool,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub leader: LeaderConfig,
    /// Fireball kinds the spawner picks from by weight. The first one is
    /// what [`Arena::launch`] fires.
    #[serde(default = "default_fireballs")]
    pub fireballs: Vec<FireballConfig>,
    #[serde(default)]
    pub earth: EarthConfig,
    #[serde(default)]
    pub spawner: SpawnerConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub effects: EffectConfig,
}

fn default_fixed_dt() -> f32 { 0.02 }
fn default_max_fixed_steps() -> u32 { 8 }
fn default_leader_start() -> Vec3 { Vec3::new(0.0, -8.0, 0.0) }
fn default_grow_on_nullify() -> bool { true }
fn default_fireballs() -> Vec<FireballConfig> { vec![FireballConfig::default()] }

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            fixed_dt: default_fixed_dt(),
            max_fixed_steps: default_max_fixed_steps(),
            seed: 0,
            leader_start: default_leader_start(),
            segment_encapsulate_radius: None,
            grow_on_nullify: default_grow_on_nullify(),
            chain: ChainConfig::default(),
            leader: LeaderConfig::default(),
            fireballs: default_fireballs(),
            earth: EarthConfig::default(),
            spawner: SpawnerConfig::default(),
            pool: PoolConfig::default(),
            effects: EffectConfig::default(),
        }
    }
}

impl ArenaConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.fixed_dt.is_finite() && self.fixed_dt > 0.0) {
            return Err(CoilError::invalid_config(
                "fixed_dt",
                self.fixed_dt.to_string(),
                "must be positive",
            ));
        }
        if self.max_fixed_steps == 0 {
            return Err(CoilError::invalid_config(
                "max_fixed_steps",
                "0",
                "at least one fixed step per frame is required",
            ));
        }
        if let Some(radius) = self.segment_encapsulate_radius {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(CoilError::invalid_config(
                    "segment_encapsulate_radius",
                    radius.to_string(),
                    "must be positive",
                ));
            }
        }
        if self.fireballs.is_empty() {
            return Err(CoilError::invalid_config(
                "fireballs",
                "[]",
                "at least one fireball kind is required",
            ));
        }
        let mut kinds = BTreeSet::new();
        for fireball in &self.fireballs {
            fireball.validate()?;
            if !kinds.insert(&fireball.kind) {
                return Err(CoilError::invalid_config(
                    "fireballs.kind",
                    fireball.kind.to_string(),
                    "kinds must be unique",
                ));
            }
        }
        if self.fireballs.iter().map(|fireball| fireball.weight).sum::<f32>() <= 0.0 {
            return Err(CoilError::invalid_config(
                "fireballs.weight",
                "0",
                "at least one kind needs a positive weight",
            ));
        }
        self.chain.validate()?;
        self.leader.validate()?;
        self.earth.validate()?;
        self.spawner.validate()?;
        self.pool.validate()?;
        self.effects.validate()
    }

    /// Settings of fireball `kind`, if configured.
    pub fn fireball(&self, kind: &EntityKind) -> Option<&FireballConfig> {
        self.fireballs.iter().find(|fireball| &fireball.kind == kind)
    }
}

/// Counters for an arena run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArenaStats {
    pub tick: Tick,
    pub time: f32,
    pub fixed_steps: u64,
    pub segments: usize,
    pub live_fireballs: usize,
    pub spawned: u64,
    pub nullified: u64,
    pub impacted: u64,
    pub expired: u64,
    pub score: u64,
    pub earth_health: u32,
    pub earth_destroyed: bool,
    pub rigid_bodies: usize,
    /// Effects playing right now.
    pub effects_playing: usize,
    pub effects_played: u64,
    pub pools: BTreeMap<EntityKind, PoolStats>,
}

/// A serializable snapshot of one segment.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentSnapshot {
    pub id: SegmentId,
    pub position: Vec3,
    pub target: Vec3,
}

/// A serializable snapshot of one fireball.
#[derive(Debug, Clone, Serialize)]
pub struct FireballSnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec3,
    pub detector: DetectorState,
    pub last_count: usize,
}

/// A complete serializable snapshot of the arena at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct ArenaSnapshot {
    pub tick: Tick,
    pub leader: Pose,
    pub segments: Vec<SegmentSnapshot>,
    pub fireballs: Vec<FireballSnapshot>,
    pub earth: Earth,
    pub stats: ArenaStats,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    fixed_steps: u64,
    spawned: u64,
    nullified: u64,
    impacted: u64,
    expired: u64,
    score: u64,
}

/// The simulation host.
pub struct Arena {
    config: ArenaConfig,
    world: PointMassWorld,
    chain: ChainBody,
    pools: PoolRegistry,
    effects: PooledEffects,
    index: CandidateIndex,
    earth: Earth,
    spawner: FireballSpawner,
    fireballs: Vec<Fireball>,
    /// Events raised between steps, delivered with the next step.
    pending: Vec<ArenaEvent>,
    accumulator: f32,
    tick: Tick,
    time: f32,
    counters: Counters,
}

impl Arena {
    pub fn new(config: ArenaConfig) -> Result<Self> {
        config.validate()?;

        let mut world = PointMassWorld::new();
        let chain = ChainBody::new(
            config.chain.clone(),
            &config.leader,
            Pose::at(config.leader_start),
            Some(&mut world as &mut dyn PhysicsWorld),
        )?;
        let mut pools = PoolRegistry::new();
        for fireball in &config.fireballs {
            pools.register(fireball.kind.clone(), config.pool.clone())?;
        }
        let effects = PooledEffects::new(config.effects.clone())?;
        let earth = Earth::new(&config.earth)?;
        let spawner = FireballSpawner::new(config.spawner.clone(), config.seed)?.with_kinds(
            config
                .fireballs
                .iter()
                .map(|fireball| (fireball.kind.clone(), fireball.weight))
                .collect(),
        )?;
        let index = CandidateIndex::from_chain(chain.chain(), config.segment_encapsulate_radius);

        info!(
            segments = chain.len(),
            mode = %chain.segment_mode(),
            kinds = config.fireballs.len(),
            seed = config.seed,
            "Arena created"
        );

        Ok(Self {
            config,
            world,
            chain,
            pools,
            effects,
            index,
            earth,
            spawner,
            fireballs: Vec::new(),
            pending: Vec::new(),
            accumulator: 0.0,
            tick: 0,
            time: 0.0,
            counters: Counters::default(),
        })
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn chain(&self) -> &ChainBody {
        &self.chain
    }

    pub fn world(&self) -> &PointMassWorld {
        &self.world
    }

    pub fn earth(&self) -> &Earth {
        &self.earth
    }

    pub fn effects(&self) -> &PooledEffects {
        &self.effects
    }

    pub fn pools(&self) -> &PoolRegistry {
        &self.pools
    }

    pub fn fireballs(&self) -> &[Fireball] {
        &self.fireballs
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn set_direction(&mut self, input: DirectionInput) {
        self.chain.set_direction(input);
    }

    /// Launch a fireball of the first configured kind at `pose`, aimed at
    /// `aim`, outside the spawner's schedule.
    pub fn launch(&mut self, pose: Pose, aim: Vec3) -> Result<EntityId> {
        let kind = self
            .config
            .fireballs
            .first()
            .map(|fireball| fireball.kind.clone())
            .ok_or_else(|| CoilError::invalid_config("fireballs", "[]", "no fireball kind configured"))?;
        self.launch_kind(&kind, pose, aim)
    }

    /// Launch a fireball of `kind` at `pose`, aimed at `aim`.
    pub fn launch_kind(&mut self, kind: &EntityKind, pose: Pose, aim: Vec3) -> Result<EntityId> {
        let mut config = self
            .config
            .fireball(kind)
            .cloned()
            .ok_or_else(|| CoilError::invalid_config("fireballs.kind", kind.to_string(), "not configured"))?;
        config.cull_distance = config
            .cull_distance
            .or(Some(2.0 * self.config.spawner.spawn_radius));

        let fireball = Fireball::launch(&mut self.pools, pose, aim, config)?;
        let id = fireball.id();
        self.counters.spawned += 1;
        self.fireballs.push(fireball);
        self.pending.push(ArenaEvent::Spawned {
            fireball: id,
            kind: kind.clone(),
            position: pose.position,
            aim,
        });
        debug!(fireball = %id, %kind, "Fireball launched");
        Ok(id)
    }

    pub fn add_segment(&mut self) -> Result<SegmentId> {
        let world: &mut dyn PhysicsWorld = &mut self.world;
        let segment = self.chain.add_segment(Some(world))?;
        self.pending.push(ArenaEvent::SegmentAdded {
            segment,
            len: self.chain.len(),
        });
        Ok(segment)
    }

    pub fn remove_segment(&mut self) -> Result<Option<SegmentId>> {
        let world: &mut dyn PhysicsWorld = &mut self.world;
        let removed = self.chain.remove_segment(Some(world))?;
        if let Some(segment) = removed {
            self.pending.push(ArenaEvent::SegmentRemoved {
                segment,
                len: self.chain.len(),
            });
        }
        Ok(removed)
    }

    /// Advance the simulation by one frame of `frame_dt` seconds.
    pub fn step(&mut self, frame_dt: f32) -> Result<Vec<ArenaEvent>> {
        let fixed_dt = self.config.fixed_dt;
        self.accumulator += frame_dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= fixed_dt && steps < self.config.max_fixed_steps {
            let world: &mut dyn PhysicsWorld = &mut self.world;
            self.chain.fixed_update(fixed_dt, Some(&mut *world))?;
            world.step(fixed_dt);
            self.accumulator -= fixed_dt;
            steps += 1;
        }
        if self.accumulator >= fixed_dt {
            debug!(backlog = self.accumulator, "Dropping fixed-step backlog");
            self.accumulator = 0.0;
        }
        self.counters.fixed_steps += u64::from(steps);

        let world: &mut dyn PhysicsWorld = &mut self.world;
        self.chain.frame_update(frame_dt, Some(world))?;
        self.index
            .sync_chain(self.chain.chain(), self.config.segment_encapsulate_radius);

        self.effects.update(frame_dt);

        if !self.earth.is_destroyed() {
            if let Some(plan) = self.spawner.update(frame_dt, self.earth.position()) {
                self.launch_kind(&plan.kind, plan.pose, plan.aim)?;
            }
        }

        let mut outcomes = Vec::new();
        for fireball in &mut self.fireballs {
            let outcome = fireball.update(
                frame_dt,
                &mut self.earth,
                &self.index,
                &mut self.pools,
                &mut self.effects,
            );
            if let Some(outcome) = outcome {
                outcomes.push((fireball.id(), outcome));
            }
        }
        self.fireballs.retain(|fireball| !fireball.is_finished());

        for (fireball, outcome) in outcomes {
            self.settle(fireball, outcome)?;
        }

        self.tick += 1;
        self.time += frame_dt;
        Ok(std::mem::take(&mut self.pending))
    }

    /// Run `frames` steps of `frame_dt`, collecting every event.
    pub fn run(&mut self, frames: u64, frame_dt: f32) -> Result<Vec<ArenaEvent>> {
        let mut events = Vec::new();
        for _ in 0..frames {
            events.extend(self.step(frame_dt)?);
        }
        Ok(events)
    }

    fn settle(&mut self, fireball: EntityId, outcome: FireballOutcome) -> Result<()> {
        match outcome {
            FireballOutcome::Nullified { score, neighbors } => {
                self.counters.nullified += 1;
                self.counters.score += u64::from(score);
                self.pending.push(ArenaEvent::Nullified {
                    fireball,
                    score,
                    neighbors,
                });
                if self.config.grow_on_nullify {
                    self.add_segment()?;
                }
            }
            FireballOutcome::Impacted {
                damage,
                earth_destroyed,
            } => {
                self.counters.impacted += 1;
                self.pending.push(ArenaEvent::Impacted { fireball, damage });
                if earth_destroyed {
                    self.pending.push(ArenaEvent::EarthDestroyed { tick: self.tick });
                }
            }
            FireballOutcome::Expired { age } => {
                self.counters.expired += 1;
                self.pending.push(ArenaEvent::Expired { fireball, age });
            }
        }
        Ok(())
    }

    /// Counters so far. `pools` covers fireball and effect pools alike.
    pub fn stats(&self) -> ArenaStats {
        let mut pools = self.pools.all_stats();
        pools.extend(self.effects.stats());
        ArenaStats {
            tick: self.tick,
            time: self.time,
            fixed_steps: self.counters.fixed_steps,
            segments: self.chain.len(),
            live_fireballs: self.fireballs.len(),
            spawned: self.counters.spawned,
            nullified: self.counters.nullified,
            impacted: self.counters.impacted,
            expired: self.counters.expired,
            score: self.counters.score,
            earth_health: self.earth.health(),
            earth_destroyed: self.earth.is_destroyed(),
            rigid_bodies: self.world.body_count(),
            effects_playing: self.effects.playing().len(),
            effects_played: self.effects.played(),
            pools,
        }
    }

    pub fn snapshot(&self) -> ArenaSnapshot {
        let segments = self
            .chain
            .chain()
            .segments()
            .iter()
            .map(|segment| SegmentSnapshot {
                id: segment.id(),
                position: segment.position(),
                target: segment.target(),
            })
            .collect();
        let fireballs = self
            .fireballs
            .iter()
            .map(|fireball| FireballSnapshot {
                id: fireball.id(),
                kind: fireball.kind().clone(),
                position: fireball.pose().position,
                detector: fireball.detector().state(),
                last_count: fireball.detector().last_count(),
            })
            .collect();

        ArenaSnapshot {
            tick: self.tick,
            leader: self.chain.leader().pose(),
            segments,
            fireballs,
            earth: self.earth.clone(),
            stats: self.stats(),
        }
    }

    /// Return live fireballs and effects to their pools and release the
    /// chain's bodies. Called automatically on drop.
    pub fn shutdown(&mut self) {
        for mut fireball in self.fireballs.drain(..) {
            if let Err(err) = fireball.recall(&mut self.pools) {
                warn!(fireball = %fireball.id(), error = %err, "Fireball recall failed");
            }
        }
        self.effects.stop_all();
        if self.chain.live_bodies() > 0 {
            self.chain.despawn(&mut self.world);
        }
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        self.shutdown();
    }
}
