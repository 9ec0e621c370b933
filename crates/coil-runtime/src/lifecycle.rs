//! Pooled entity lifecycle — acquire once, release at most once.

use coil_core::collaborators::ObjectPool;
use coil_core::error::{PoolError, Result};
use coil_core::types::{EntityId, EntityKind, PoolHandle};
use tracing::warn;

/// Ownership of one pooled instance.
///
/// The handle is taken out on the first release, so the owning entity can
/// never hand the same instance back twice. A second release is reported
/// as misuse and never reaches the pool.
#[derive(Debug)]
pub struct PooledEntity {
    kind: EntityKind,
    instance: EntityId,
    handle: Option<PoolHandle>,
}

impl PooledEntity {
    /// Acquire an instance of `kind` from `pool`.
    pub fn acquire(pool: &mut dyn ObjectPool, kind: &EntityKind) -> Result<Self> {
        let handle = pool.acquire(kind)?;
        Ok(Self {
            kind: kind.clone(),
            instance: handle.instance,
            handle: Some(handle),
        })
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// The pooled instance this entity was given. Still answers after
    /// release.
    pub fn instance(&self) -> EntityId {
        self.instance
    }

    pub fn handle(&self) -> Option<&PoolHandle> {
        self.handle.as_ref()
    }

    /// Whether this entity still holds its handle.
    pub fn is_held(&self) -> bool {
        self.handle.is_some()
    }

    /// Return the instance to `pool`.
    ///
    /// The handle is given up even if the pool rejects it, so a failed
    /// release is never retried.
    pub fn release(&mut self, pool: &mut dyn ObjectPool) -> Result<()> {
        match self.handle.take() {
            Some(handle) => pool.release(&handle),
            None => {
                warn!(kind = %self.kind, instance = %self.instance, "Entity released twice");
                Err(PoolError::NoHandle.into())
            }
        }
    }
}

impl Drop for PooledEntity {
    fn drop(&mut self) {
        if self.handle.is_some() {
            warn!(kind = %self.kind, instance = %self.instance, "Pooled entity dropped without release");
        }
    }
}
