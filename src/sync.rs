//! Poison-tolerant locking for the memo caches.
//!
//! Every shared table in this crate ([`crate::cache::RenderCache`]) maps an
//! immutable key to the output of a pure function. A thread that panics while
//! holding one of those locks can at worst leave an entry missing, never a
//! wrong entry, so a poisoned lock is recovered instead of propagated.
//!
//! | Scenario | Function |
//! |----------|----------|
//! | Cache access in library code | [`lock_recover`] |
//! | Tracking down where a poison came from | [`lock_recover_debug`] |
//! | Test code | `.lock().unwrap()` |
//!
//! ```rust
//! use std::sync::Mutex;
//! use rich_core::sync::lock_recover;
//!
//! let widths = Mutex::new(vec![1, 2, 2]);
//! let guard = lock_recover(&widths);
//! assert_eq!(guard.len(), 3);
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the guard if a previous holder panicked.
///
/// Never panics.
#[inline]
pub fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Same as [`lock_recover`], but reports the recovery through the `log`
/// facade in debug builds.
///
/// `context` names the call site (e.g. `"RenderCache::cell_len"`).
#[inline]
pub fn lock_recover_debug<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|e| {
        #[cfg(debug_assertions)]
        log::warn!(target: "rich_core::sync", "mutex poison recovered at: {context}");
        #[cfg(not(debug_assertions))]
        let _ = context;
        e.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;
    use std::thread;

    fn poison<T>(mutex: &Mutex<T>) {
        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = mutex.lock().unwrap();
            panic!("intentional panic to poison mutex");
        }));
    }

    #[test]
    fn test_lock_recover_healthy() {
        let mutex = Mutex::new(42);
        assert_eq!(*lock_recover(&mutex), 42);
    }

    #[test]
    fn test_lock_recover_after_poison() {
        let mutex = Mutex::new(42);
        poison(&mutex);
        assert!(mutex.lock().is_err(), "mutex should be poisoned");
        assert_eq!(*lock_recover(&mutex), 42);
    }

    #[test]
    fn test_lock_recover_debug_after_poison() {
        let mutex = Mutex::new("widths");
        poison(&mutex);
        let guard = lock_recover_debug(&mutex, "test_lock_recover_debug_after_poison");
        assert_eq!(*guard, "widths");
    }

    #[test]
    fn test_concurrent_recovery() {
        let mutex = Arc::new(Mutex::new(0));
        poison(&mutex);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = Arc::clone(&mutex);
                thread::spawn(move || {
                    *lock_recover(&m) += 1;
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(*lock_recover(&mutex), 4);
    }
}
