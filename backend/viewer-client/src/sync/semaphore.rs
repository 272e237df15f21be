use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::trace;
use uuid::Uuid;

/// Counting semaphore.
///
/// Each instance gets a random, process-unique name that only shows up in
/// logs; it is never registered with the OS, so the semaphore is private to
/// whoever created it and to the handles (usually an `Arc`) it hands out.
#[derive(Debug)]
pub struct Semaphore {
    name: String,
    count: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    pub fn new() -> Self {
        Self::with_count(0)
    }

    pub fn with_count(initial: usize) -> Self {
        let name = Uuid::new_v4().simple().to_string();
        trace!("Semaphore {name} created with count {initial}");
        Self {
            name,
            count: Mutex::new(initial),
            available: Condvar::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Increment the count, waking one waiter if any.
    pub fn signal(&self) {
        let mut count = self.count();
        *count += 1;
        self.available.notify_one();
    }

    /// Block until the count is positive, then decrement it.
    pub fn wait(&self) {
        let mut count = self.count();
        while *count == 0 {
            count = self
                .available
                .wait(count)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        *count -= 1;
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`.
    ///
    /// Returns `true` when a signal was consumed. A timeout too large to
    /// express as a deadline waits without limit.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            trace!(
                "Semaphore {} timeout {timeout:?} has no deadline, waiting without limit",
                self.name
            );
            self.wait();
            return true;
        };
        let mut count = self.count();
        while *count == 0 {
            let now = Instant::now();
            if now >= deadline {
                trace!("Semaphore {} wait timed out after {timeout:?}", self.name);
                return false;
            }
            count = self
                .available
                .wait_timeout(count, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
        *count -= 1;
        true
    }

    fn count(&self) -> MutexGuard<'_, usize> {
        self.count
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Semaphore {
    fn default() -> Self {
        Self::new()
    }
}
