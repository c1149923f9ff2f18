//! Global stack lock shared by every bridged device of one stack.
//!
//! All mutation of device state happens while a [`StackGuard`] is alive.
//! Handlers the stack invokes (attribute reads and writes, endpoint
//! registration) take `&StackGuard` as a parameter instead of acquiring the
//! lock themselves: the lock is **not reentrant**, and acquiring it twice
//! from the same thread deadlocks. Debug builds turn that deadlock into a
//! panic with a message.

use parking_lot::{Mutex, MutexGuard};
use std::thread::{self, ThreadId};

/// Mutual exclusion between the application context and the stack context.
#[derive(Debug, Default)]
pub struct StackLock {
    inner: Mutex<()>,
    owner: Mutex<Option<ThreadId>>,
}

/// Proof that the stack lock is held. Released on drop.
#[must_use = "the stack lock is released as soon as the guard is dropped"]
pub struct StackGuard<'a> {
    lock: &'a StackLock,
    _guard: MutexGuard<'a, ()>,
}

impl StackLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock, blocking until it is free.
    ///
    /// The lock is expected to be uncontended and held for a handful of
    /// field assignments.
    pub fn acquire(&self) -> StackGuard<'_> {
        debug_assert_ne!(
            *self.owner.lock(),
            Some(thread::current().id()),
            "stack lock acquired twice from the same thread"
        );
        let guard = self.inner.lock();
        *self.owner.lock() = Some(thread::current().id());
        StackGuard {
            lock: self,
            _guard: guard,
        }
    }

    /// Acquire the lock only if it is free right now.
    pub fn try_acquire(&self) -> Option<StackGuard<'_>> {
        let guard = self.inner.try_lock()?;
        *self.owner.lock() = Some(thread::current().id());
        Some(StackGuard {
            lock: self,
            _guard: guard,
        })
    }

    /// Whether any thread currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        // Cleared before `_guard` releases the mutex
        *self.lock.owner.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_guard_releases_on_drop() {
        let lock = StackLock::new();
        {
            let _guard = lock.acquire();
            assert!(lock.is_locked());
            assert!(lock.try_acquire().is_none());
        }
        assert!(!lock.is_locked());
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn test_guard_releases_on_early_return() {
        fn bail(lock: &StackLock) -> Result<(), ()> {
            let _guard = lock.acquire();
            Err(())
        }

        let lock = StackLock::new();
        assert!(bail(&lock).is_err());
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_excludes_other_threads() {
        let lock = Arc::new(StackLock::new());
        let guard = lock.acquire();

        let other = lock.clone();
        let handle = std::thread::spawn(move || other.try_acquire().is_some());
        assert!(!handle.join().unwrap());

        drop(guard);
        let other = lock.clone();
        let handle = std::thread::spawn(move || other.try_acquire().is_some());
        assert!(handle.join().unwrap());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "acquired twice")]
    fn test_reentrant_acquire_panics_in_debug() {
        let lock = StackLock::new();
        let _first = lock.acquire();
        let _second = lock.acquire();
    }
}
