//! PoolRegistry — one object pool per registered entity kind.
//!
//! Instances are identified by `EntityId`. Every acquisition bumps the
//! instance's generation, so a handle from an earlier lifecycle never
//! releases the current one. Releasing a handle that is not live is
//! reported and counted as misuse; the pool's counts are left alone.
//! Instances destroyed on overflow are forgotten, so their stale handles
//! read as never acquired.

use coil_core::collaborators::ObjectPool;
use coil_core::error::{CoilError, PoolError, Result};
use coil_core::types::{EntityId, EntityKind, PoolHandle};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Sizing for one pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Idle slots reserved up front.
    #[serde(default = "default_capacity")]
    pub default_capacity: usize,
    /// Most idle instances kept; releases beyond this destroy the instance.
    #[serde(default = "default_max_size")]
    pub max_size: usize,
}

fn default_capacity() -> usize { 10 }
fn default_max_size() -> usize { 50 }

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            default_capacity: default_capacity(),
            max_size: default_max_size(),
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CoilError::invalid_config(
                "pool.max_size",
                "0",
                "must keep at least one idle instance",
            ));
        }
        if self.default_capacity > self.max_size {
            return Err(CoilError::invalid_config(
                "pool.default_capacity",
                self.default_capacity.to_string(),
                "must not exceed max_size",
            ));
        }
        Ok(())
    }
}

/// Counters for one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PoolStats {
    /// Instances currently acquired.
    pub active: usize,
    /// Instances waiting for reuse.
    pub idle: usize,
    /// Instances ever created.
    pub created: u64,
    /// Instances destroyed because the idle list was full.
    pub destroyed: u64,
    /// Rejected releases.
    pub misuse: u64,
}

#[derive(Debug)]
struct Pool {
    config: PoolConfig,
    idle: Vec<EntityId>,
    /// Acquired instances and the generation they were handed out with.
    live: HashMap<EntityId, u32>,
    /// Last generation of every instance this pool still owns.
    generations: HashMap<EntityId, u32>,
    stats: PoolStats,
}

impl Pool {
    fn new(config: PoolConfig) -> Self {
        Self {
            idle: Vec::with_capacity(config.default_capacity),
            config,
            live: HashMap::new(),
            generations: HashMap::new(),
            stats: PoolStats::default(),
        }
    }

    fn refresh_counts(&mut self) {
        self.stats.active = self.live.len();
        self.stats.idle = self.idle.len();
    }
}

/// All pools of a simulation, keyed by entity kind.
#[derive(Debug, Default)]
pub struct PoolRegistry {
    pools: BTreeMap<EntityKind, Pool>,
    next_instance: u64,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration.
    pub fn with_kind(mut self, kind: EntityKind, config: PoolConfig) -> Result<Self> {
        self.register(kind, config)?;
        Ok(self)
    }

    /// Register a pool for `kind`. Registering the same kind twice keeps the
    /// existing pool and its instances.
    pub fn register(&mut self, kind: EntityKind, config: PoolConfig) -> Result<()> {
        config.validate()?;
        if self.pools.contains_key(&kind) {
            debug!(%kind, "Pool already registered");
            return Ok(());
        }
        debug!(%kind, max_size = config.max_size, "Pool registered");
        self.pools.insert(kind, Pool::new(config));
        Ok(())
    }

    pub fn kinds(&self) -> impl Iterator<Item = &EntityKind> {
        self.pools.keys()
    }

    pub fn stats(&self, kind: &EntityKind) -> Option<PoolStats> {
        self.pools.get(kind).map(|pool| pool.stats)
    }

    /// Stats of every pool, ordered by kind.
    pub fn all_stats(&self) -> BTreeMap<EntityKind, PoolStats> {
        self.pools
            .iter()
            .map(|(kind, pool)| (kind.clone(), pool.stats))
            .collect()
    }

    fn reject(&mut self, handle: &PoolHandle, error: PoolError) -> CoilError {
        if let Some(pool) = self.pools.get_mut(&handle.kind) {
            pool.stats.misuse += 1;
        }
        warn!(
            kind = %handle.kind,
            instance = %handle.instance,
            generation = handle.generation,
            error = %error,
            "Pool release rejected"
        );
        error.into()
    }
}

impl ObjectPool for PoolRegistry {
    fn acquire(&mut self, kind: &EntityKind) -> Result<PoolHandle> {
        let next_instance = &mut self.next_instance;
        let pool = self
            .pools
            .get_mut(kind)
            .ok_or_else(|| PoolError::UnknownKind(kind.clone()))?;

        let instance = match pool.idle.pop() {
            Some(instance) => instance,
            None => {
                let instance = EntityId::from_seed(*next_instance);
                *next_instance += 1;
                pool.stats.created += 1;
                instance
            }
        };
        let generation = pool
            .generations
            .get(&instance)
            .map_or(0, |generation| generation.wrapping_add(1));
        pool.generations.insert(instance, generation);
        pool.live.insert(instance, generation);
        pool.refresh_counts();

        Ok(PoolHandle {
            kind: kind.clone(),
            instance,
            generation,
        })
    }

    fn release(&mut self, handle: &PoolHandle) -> Result<()> {
        let outcome = match self.pools.get(&handle.kind) {
            None => Err(PoolError::UnknownKind(handle.kind.clone())),
            Some(pool) => match pool.live.get(&handle.instance) {
                Some(&generation) if generation == handle.generation => Ok(()),
                _ if pool.generations.contains_key(&handle.instance) => {
                    Err(PoolError::AlreadyReleased(handle.clone()))
                }
                _ => Err(PoolError::NotAcquired(handle.clone())),
            },
        };
        if let Err(error) = outcome {
            return Err(self.reject(handle, error));
        }

        if let Some(pool) = self.pools.get_mut(&handle.kind) {
            pool.live.remove(&handle.instance);
            if pool.idle.len() >= pool.config.max_size {
                pool.generations.remove(&handle.instance);
                pool.stats.destroyed += 1;
            } else {
                pool.idle.push(handle.instance);
            }
            pool.refresh_counts();
        }
        Ok(())
    }

    fn is_live(&self, handle: &PoolHandle) -> bool {
        self.pools
            .get(&handle.kind)
            .and_then(|pool| pool.live.get(&handle.instance))
            .is_some_and(|&generation| generation == handle.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(max_size: usize) -> PoolRegistry {
        PoolRegistry::new()
            .with_kind(
                EntityKind::fireball(),
                PoolConfig {
                    default_capacity: 1,
                    max_size,
                },
            )
            .unwrap()
    }

    #[test]
    fn reuses_released_instances() {
        let mut pools = registry(4);
        let kind = EntityKind::fireball();

        let first = pools.acquire(&kind).unwrap();
        pools.release(&first).unwrap();
        let second = pools.acquire(&kind).unwrap();

        assert_eq!(second.instance, first.instance);
        assert_eq!(second.generation, first.generation + 1);
        assert_eq!(pools.stats(&kind).unwrap().created, 1);
    }

    #[test]
    fn stale_handle_cannot_release_new_lifecycle() {
        let mut pools = registry(4);
        let kind = EntityKind::fireball();
        let first = pools.acquire(&kind).unwrap();
        pools.release(&first).unwrap();
        let second = pools.acquire(&kind).unwrap();

        let err = pools.release(&first).unwrap_err();

        assert!(matches!(err, CoilError::Pool(PoolError::AlreadyReleased(_))));
        assert!(pools.is_live(&second));
    }

    #[test]
    fn overflow_destroys_instead_of_keeping() {
        let mut pools = registry(1);
        let kind = EntityKind::fireball();
        let a = pools.acquire(&kind).unwrap();
        let b = pools.acquire(&kind).unwrap();

        pools.release(&a).unwrap();
        pools.release(&b).unwrap();

        let stats = pools.stats(&kind).unwrap();
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.destroyed, 1);
        assert_eq!(stats.active, 0);
    }

    #[test]
    fn destroyed_instances_are_forgotten() {
        let mut pools = registry(1);
        let kind = EntityKind::fireball();

        for _ in 0..20 {
            let a = pools.acquire(&kind).unwrap();
            let b = pools.acquire(&kind).unwrap();
            pools.release(&a).unwrap();
            pools.release(&b).unwrap();

            let err = pools.release(&b).unwrap_err();
            assert!(matches!(err, CoilError::Pool(PoolError::NotAcquired(_))));
        }

        let pool = &pools.pools[&kind];
        assert_eq!(pool.generations.len(), 1);
        assert_eq!(pool.stats.destroyed, 20);
        assert_eq!(pool.stats.misuse, 20);
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let mut pools = PoolRegistry::new();
        let err = pools.acquire(&EntityKind::new("meteor")).unwrap_err();
        assert!(matches!(err, CoilError::Pool(PoolError::UnknownKind(_))));
    }

    #[test]
    fn foreign_handle_is_not_acquired() {
        let mut pools = registry(4);
        let handle = PoolHandle {
            kind: EntityKind::fireball(),
            instance: EntityId::from_seed(999),
            generation: 0,
        };
        let err = pools.release(&handle).unwrap_err();
        assert!(matches!(err, CoilError::Pool(PoolError::NotAcquired(_))));
        assert_eq!(pools.stats(&EntityKind::fireball()).unwrap().misuse, 1);
    }

    #[test]
    fn config_rejects_capacity_above_max() {
        let config = PoolConfig {
            default_capacity: 8,
            max_size: 4,
        };
        assert!(config.validate().is_err());
    }
}
