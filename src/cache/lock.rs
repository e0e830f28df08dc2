// Recovering lock.
// An `RwLock` that keeps serving its last state after a writer panicked,
// since every value it guards is replaced whole rather than mutated in steps.

use std::fmt;
use std::sync::{LockResult, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

pub(crate) struct RecoveringLock<T> {
    inner: RwLock<T>,
    owner: &'static str,
}

impl<T> RecoveringLock<T> {
    /// `owner` names the structure holding the lock in recovery warnings.
    pub(crate) fn new(owner: &'static str, value: T) -> Self {
        Self {
            inner: RwLock::new(value),
            owner,
        }
    }

    pub(crate) fn read(&self, op: &'static str) -> RwLockReadGuard<'_, T> {
        self.recover(self.inner.read(), op)
    }

    pub(crate) fn write(&self, op: &'static str) -> RwLockWriteGuard<'_, T> {
        self.recover(self.inner.write(), op)
    }

    fn recover<G>(&self, result: LockResult<G>, op: &'static str) -> G {
        result.unwrap_or_else(|poisoned| {
            warn!(owner = self.owner, op, "Lock poisoned by a panicked holder, reusing its state");
            poisoned.into_inner()
        })
    }
}

impl<T: fmt::Debug> fmt::Debug for RecoveringLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveringLock")
            .field("owner", &self.owner)
            .field("value", &*self.read("debug"))
            .finish()
    }
}
