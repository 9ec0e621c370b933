//! Object pools — reuse for short-lived entities.
//!
//! Projectiles and effects come and go many times a second. A pool hands
//! out instances and takes them back; Coil only ever calls `acquire` and
//! `release`. A pool must hand out at most one live acquisition per handle
//! and must report a release of a handle that is not live.

use crate::error::Result;
use crate::types::{EntityKind, PoolHandle};

/// Acquire/release against pools keyed by entity kind.
pub trait ObjectPool {
    /// Take an instance of `kind`, reusing an idle one when available.
    fn acquire(&mut self, kind: &EntityKind) -> Result<PoolHandle>;

    /// Return an instance. Releasing a handle that is not live fails with
    /// a [`PoolError`](crate::error::PoolError) and changes nothing.
    fn release(&mut self, handle: &PoolHandle) -> Result<()>;

    /// Whether `handle` is currently acquired.
    fn is_live(&self, handle: &PoolHandle) -> bool;
}
