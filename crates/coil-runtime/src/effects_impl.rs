//! Effect sinks.
//!
//! - [`EffectLog`] remembers every request, for tests and tooling.
//! - [`PooledEffects`] plays each request as a pooled instance and hands it
//!   back to its pool once playback stops.

use crate::lifecycle::PooledEntity;
use crate::pool::{PoolConfig, PoolRegistry, PoolStats};
use coil_core::collaborators::EffectSink;
use coil_core::error::{CoilError, Result};
use coil_core::types::{EffectKind, EntityKind};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One effect request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectRecord {
    pub kind: EffectKind,
    pub position: Vec3,
    pub rotation: Quat,
}

/// Records every raised effect in order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EffectLog {
    records: Vec<EffectRecord>,
}

impl EffectLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[EffectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// How many effects of `kind` were raised.
    pub fn count(&self, kind: &EffectKind) -> usize {
        self.records.iter().filter(|r| &r.kind == kind).count()
    }

    /// Take every record raised so far.
    pub fn drain(&mut self) -> Vec<EffectRecord> {
        std::mem::take(&mut self.records)
    }
}

impl EffectSink for EffectLog {
    fn raise(&mut self, kind: EffectKind, position: Vec3, rotation: Quat) {
        self.records.push(EffectRecord {
            kind,
            position,
            rotation,
        });
    }
}

/// Pool key of the instances that play `kind`.
pub fn effect_entity_kind(kind: &EffectKind) -> EntityKind {
    match kind {
        EffectKind::Nullified => EntityKind::new("nullified_effect"),
        EffectKind::Impact => EntityKind::new("impact_effect"),
        EffectKind::Custom(name) => EntityKind::new(format!("{name}_effect")),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Seconds an effect plays before its instance is released.
    #[serde(default = "default_lifetime")]
    pub lifetime: f32,
    /// Sizing of every effect pool.
    #[serde(default)]
    pub pool: PoolConfig,
}

fn default_lifetime() -> f32 { 1.0 }

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            lifetime: default_lifetime(),
            pool: PoolConfig::default(),
        }
    }
}

impl EffectConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.lifetime.is_finite() && self.lifetime >= 0.0) {
            return Err(CoilError::invalid_config(
                "effects.lifetime",
                self.lifetime.to_string(),
                "must be non-negative",
            ));
        }
        self.pool.validate()
    }
}

/// An effect instance that is still playing.
#[derive(Debug)]
pub struct PlayingEffect {
    kind: EffectKind,
    entity: PooledEntity,
    position: Vec3,
    rotation: Quat,
    remaining: f32,
}

impl PlayingEffect {
    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Seconds of playback left.
    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

/// Plays effects from per-kind pools.
///
/// Pools for the built-in kinds are registered up front; a custom kind gets
/// its pool the first time it is raised.
#[derive(Debug)]
pub struct PooledEffects {
    config: EffectConfig,
    pools: PoolRegistry,
    playing: Vec<PlayingEffect>,
    played: u64,
}

impl PooledEffects {
    pub fn new(config: EffectConfig) -> Result<Self> {
        config.validate()?;
        let pools = PoolRegistry::new()
            .with_kind(effect_entity_kind(&EffectKind::Nullified), config.pool.clone())?
            .with_kind(effect_entity_kind(&EffectKind::Impact), config.pool.clone())?;
        Ok(Self {
            config,
            pools,
            playing: Vec::new(),
            played: 0,
        })
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn pools(&self) -> &PoolRegistry {
        &self.pools
    }

    pub fn playing(&self) -> &[PlayingEffect] {
        &self.playing
    }

    /// Effects started since creation.
    pub fn played(&self) -> u64 {
        self.played
    }

    /// How many effects of `kind` are playing now.
    pub fn count_playing(&self, kind: &EffectKind) -> usize {
        self.playing.iter().filter(|effect| &effect.kind == kind).count()
    }

    /// Pool stats keyed by effect instance kind.
    pub fn stats(&self) -> BTreeMap<EntityKind, PoolStats> {
        self.pools.all_stats()
    }

    fn play(&mut self, kind: EffectKind, position: Vec3, rotation: Quat) -> Result<()> {
        let entity_kind = effect_entity_kind(&kind);
        if self.pools.stats(&entity_kind).is_none() {
            self.pools.register(entity_kind.clone(), self.config.pool.clone())?;
        }
        let entity = PooledEntity::acquire(&mut self.pools, &entity_kind)?;
        self.playing.push(PlayingEffect {
            kind,
            entity,
            position,
            rotation,
            remaining: self.config.lifetime,
        });
        self.played += 1;
        Ok(())
    }

    /// Advance playback, releasing every effect that has stopped. Returns how
    /// many were released.
    pub fn update(&mut self, dt: f32) -> usize {
        let mut stopped = Vec::new();
        let mut index = 0;
        while index < self.playing.len() {
            self.playing[index].remaining -= dt;
            if self.playing[index].remaining <= 0.0 {
                stopped.push(self.playing.swap_remove(index));
            } else {
                index += 1;
            }
        }
        let count = stopped.len();
        for effect in stopped {
            self.finish(effect);
        }
        count
    }

    /// Stop and release everything still playing.
    pub fn stop_all(&mut self) {
        let playing = std::mem::take(&mut self.playing);
        for effect in playing {
            self.finish(effect);
        }
    }

    fn finish(&mut self, mut effect: PlayingEffect) {
        if let Err(err) = effect.entity.release(&mut self.pools) {
            warn!(kind = ?effect.kind, error = %err, "Effect release failed");
        }
    }
}

impl EffectSink for PooledEffects {
    fn raise(&mut self, kind: EffectKind, position: Vec3, rotation: Quat) {
        debug!(?kind, "Effect raised");
        if let Err(err) = self.play(kind, position, rotation) {
            warn!(error = %err, "Effect dropped");
        }
    }
}

impl Drop for PooledEffects {
    fn drop(&mut self) {
        self.stop_all();
    }
}
