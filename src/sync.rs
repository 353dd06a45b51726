//! Poison-tolerant mutex access.
//!
//! The only shared state in doctalk is caches (parsed colors) and the
//! logger's last-printed timestamp. Both are safe to use after a panic on
//! another thread, so a poisoned lock is recovered instead of propagated.
//! Tests should keep using `.lock().unwrap()` so poison fails loudly there.

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering from poison if necessary.
///
/// # Example
///
/// ```rust
/// use std::sync::Mutex;
/// use doctalk::sync::lock_recover;
///
/// let mutex = Mutex::new(42);
/// let guard = lock_recover(&mutex);
/// assert_eq!(*guard, 42);
/// ```
#[inline]
pub fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        #[cfg(debug_assertions)]
        eprintln!("[doctalk::sync] mutex poison recovered");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_lock_recover_normal() {
        let mutex = Mutex::new(vec![1, 2, 3]);
        let guard = lock_recover(&mutex);
        assert_eq!(*guard, vec![1, 2, 3]);
    }

    #[test]
    fn test_lock_recover_after_poison() {
        let mutex = Arc::new(Mutex::new(0));
        let poisoner = Arc::clone(&mutex);

        let _ = thread::spawn(move || {
            let mut guard = poisoner.lock().unwrap();
            *guard = 7;
            panic!("poison the lock");
        })
        .join();

        assert!(mutex.is_poisoned());
        assert_eq!(*lock_recover(&mutex), 7);
    }
}
