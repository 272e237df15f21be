use std::fmt;
use std::sync::{Mutex, MutexGuard};

use log::warn;

/// Guard returned by [`Lock::acquire`]; the lock is released when it drops.
pub type LockGuard<'a, T> = MutexGuard<'a, T>;

/// Blocking mutual exclusion bound to the value it protects.
///
/// There is no timeout and no re-entrancy: acquiring twice on the same thread
/// deadlocks. A lock poisoned by a panicking holder is recovered: the values
/// guarded in this crate are byte buffers, valid after every single mutation.
pub struct Lock<T> {
    name: &'static str,
    inner: Mutex<T>,
}

impl<T> Lock<T> {
    pub fn new(name: &'static str, value: T) -> Self {
        Self {
            name,
            inner: Mutex::new(value),
        }
    }

    /// Block until the lock is free and take it.
    pub fn acquire(&self) -> LockGuard<'_, T> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Lock '{}' was poisoned, recovering", self.name);
            poisoned.into_inner()
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> fmt::Debug for Lock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lock").field("name", &self.name).finish_non_exhaustive()
    }
}
